use std::time::Duration;

use serde::Deserialize;
use sources_common::SymbolRequest;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MarketWatchConfig {
    /// Pause after a rendered cycle.
    #[serde(default = "default_period", with = "humantime_serde")]
    pub period: Duration,
    /// Pause after a batch failed as a whole.
    #[serde(default = "default_error_backoff", with = "humantime_serde")]
    pub error_backoff: Duration,
    /// Display name identifying the official rate among `forex`.
    #[serde(default = "default_official_rate_marker")]
    pub official_rate_marker: String,
    /// Equities listed on this market get converted into local currency.
    #[serde(default = "default_foreign_market")]
    pub foreign_market: String,
    /// Fetched once at startup, for the operator only.
    #[serde(default = "default_probe_symbols")]
    pub probe_symbols: Vec<String>,
    #[serde(default = "default_forex")]
    pub forex: Vec<SymbolRequest>,
    #[serde(default = "default_equities")]
    pub equities: Vec<SymbolRequest>,
}

impl Default for MarketWatchConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            error_backoff: default_error_backoff(),
            official_rate_marker: default_official_rate_marker(),
            foreign_market: default_foreign_market(),
            probe_symbols: default_probe_symbols(),
            forex: default_forex(),
            equities: default_equities(),
        }
    }
}

fn default_period() -> Duration {
    Duration::from_secs(5)
}

fn default_error_backoff() -> Duration {
    Duration::from_secs(5)
}

fn default_official_rate_marker() -> String {
    "Dólar Oficial".into()
}

fn default_foreign_market() -> String {
    "NYSE".into()
}

fn default_probe_symbols() -> Vec<String> {
    ["AAPL", "ARS=X", "YPF"].map(String::from).to_vec()
}

fn default_forex() -> Vec<SymbolRequest> {
    vec![
        SymbolRequest::currency("ARS=X", "Dólar Oficial"),
        SymbolRequest::currency("EURARS=X", "Euro"),
        SymbolRequest::currency("USDARS=X", "Dólar Oficial (alt)"),
        SymbolRequest::currency("EURUSD=X", "Euro/USD"),
    ]
}

fn default_equities() -> Vec<SymbolRequest> {
    [
        // banks and financials
        ("GGAL", "Grupo Financiero Galicia"),
        ("BMA", "Banco Macro"),
        ("BBAR", "BBVA Argentina"),
        ("SUPV", "Grupo Supervielle"),
        ("BSMX", "Banco Santander Mexico"),
        // energy
        ("YPF", "YPF"),
        ("PAM", "Pampa Energia"),
        ("EDN", "Edenor"),
        // tech and telecom
        ("TEO", "Telecom Argentina"),
        ("GLOB", "Globant"),
        ("MELI", "MercadoLibre"),
        // industry
        ("TS", "Tenaris"),
        ("TX", "Ternium"),
        // real estate
        ("IRS", "IRSA"),
        ("IRCP", "IRSA Propiedades Comerciales"),
        ("CRESY", "Cresud"),
        // infrastructure
        ("TGS", "Transportadora de Gas del Sur"),
        ("VSH", "Vishay"),
    ]
    .iter()
    .map(|(symbol, name)| SymbolRequest::equity(symbol, name, "NYSE"))
    .collect()
}

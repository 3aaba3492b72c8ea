//! Wire shapes of the two quote endpoints and their normalization into [`Quote`].

use serde::Deserialize;
use sources_common::Quote;
use toolset::{deser_null_as_default, deser_raw_value};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Flat chart metadata (`/v8/finance/chart`).
    Chart,
    /// Nested `{raw: value}` price module (`/v10/finance/quoteSummary`).
    QuoteSummary,
}

impl Variant {
    pub fn alternate(self) -> Self {
        match self {
            Variant::Chart => Variant::QuoteSummary,
            Variant::QuoteSummary => Variant::Chart,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: Envelope<ChartResult>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: Envelope<QuoteSummaryResult>,
}

#[derive(Deserialize, Debug)]
struct Envelope<T> {
    result: Option<Vec<T>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(default, deserialize_with = "deser_null_as_default")]
    pub regular_market_price: f64,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub chart_previous_close: Option<f64>,
    #[serde(default, deserialize_with = "deser_null_as_default")]
    pub regular_market_volume: i64,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    #[serde(default, deserialize_with = "deser_raw_value")]
    pub regular_market_price: Option<f64>,
    #[serde(default, deserialize_with = "deser_raw_value")]
    pub regular_market_previous_close: Option<f64>,
    #[serde(default, deserialize_with = "deser_raw_value")]
    pub regular_market_volume: Option<i64>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
}

/// A successfully parsed body, tagged with the shape it came in.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedQuote {
    Chart(ChartMeta),
    QuoteSummary(PriceModule),
}

impl ParsedQuote {
    pub fn parse(body: &str, variant: Variant, symbol: &str) -> Result<Self, Error> {
        let malformed = |e: serde_json::Error| Error::MalformedResponse {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        };

        match variant {
            Variant::Chart => {
                let response = serde_json::from_str::<ChartResponse>(body).map_err(malformed)?;
                let result = first_result(response.chart, symbol)?;
                Ok(ParsedQuote::Chart(result.meta))
            }
            Variant::QuoteSummary => {
                let response =
                    serde_json::from_str::<QuoteSummaryResponse>(body).map_err(malformed)?;
                let result = first_result(response.quote_summary, symbol)?;
                let price = result.price.ok_or_else(|| Error::MalformedResponse {
                    symbol: symbol.to_string(),
                    reason: "missing price module".into(),
                })?;
                Ok(ParsedQuote::QuoteSummary(price))
            }
        }
    }

    pub fn into_quote(self, symbol: &str) -> Quote {
        match self {
            ParsedQuote::Chart(meta) => Quote {
                symbol: symbol.to_string(),
                display_name: resolve_name(meta.short_name, meta.long_name, symbol),
                price: meta.regular_market_price,
                previous_close: meta
                    .previous_close
                    .or(meta.chart_previous_close)
                    .unwrap_or_default(),
                volume: meta.regular_market_volume,
            },
            ParsedQuote::QuoteSummary(price) => Quote {
                symbol: symbol.to_string(),
                display_name: resolve_name(price.short_name, price.long_name, symbol),
                price: price.regular_market_price.unwrap_or_default(),
                previous_close: price.regular_market_previous_close.unwrap_or_default(),
                volume: price.regular_market_volume.unwrap_or_default(),
            },
        }
    }
}

/// Parse a response body of the given variant into a canonical quote.
pub fn normalize(body: &str, variant: Variant, symbol: &str) -> Result<Quote, Error> {
    ParsedQuote::parse(body, variant, symbol).map(|parsed| parsed.into_quote(symbol))
}

fn first_result<T>(envelope: Envelope<T>, symbol: &str) -> Result<T, Error> {
    if let Some(ApiError { code, description }) = envelope.error {
        return Err(Error::Upstream { code, description });
    }
    envelope
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| Error::NoData {
            symbol: symbol.to_string(),
        })
}

fn resolve_name(short_name: Option<String>, long_name: Option<String>, symbol: &str) -> String {
    [short_name, long_name]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| symbol.to_string())
}

use std::{collections::BTreeMap, time::Duration};

use serde::Deserialize;

use crate::protocol::Variant;

pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Wait after a failed attempt, `attempt` counted from zero: 1s, 2s, 4s...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
        }
    }
}

/// Where and how quotes are requested. Url templates carry a `{symbol}` placeholder.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SourceConfig {
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_cookie")]
    pub cookie: Option<String>,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_pool_idle_timeout", with = "humantime_serde")]
    pub pool_idle_timeout: Duration,
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl SourceConfig {
    pub fn url_for(&self, variant: Variant, symbol: &str) -> String {
        let template = match variant {
            Variant::Chart => &self.primary_url,
            Variant::QuoteSummary => &self.fallback_url,
        };
        template.replace(SYMBOL_PLACEHOLDER, symbol)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            fallback_url: default_fallback_url(),
            headers: default_headers(),
            cookie: default_cookie(),
            timeout: default_timeout(),
            pool_idle_timeout: default_pool_idle_timeout(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            retry: RetryPolicy::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_primary_url() -> String {
    "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}".into()
}

fn default_fallback_url() -> String {
    "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{symbol}?modules=price".into()
}

fn default_cookie() -> Option<String> {
    Some("B=59jd1o5g2nojr&b=3&s=ls".into())
}

fn default_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_pool_idle_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_pool_max_idle_per_host() -> usize {
    10
}

fn default_headers() -> BTreeMap<String, String> {
    [
        ("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36"),
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("DNT", "1"),
        ("Connection", "keep-alive"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("Cache-Control", "no-cache"),
        ("Pragma", "no-cache"),
        ("Upgrade-Insecure-Requests", "1"),
        ("Referer", "https://finance.yahoo.com/"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

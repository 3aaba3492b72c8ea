use std::fmt;

use async_trait::async_trait;

use crate::quote::Quote;

/// Anything that can produce a quote for a single symbol.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    type Error: fmt::Display + Send + 'static;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, Self::Error>;
}

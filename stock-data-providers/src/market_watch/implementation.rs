use std::sync::Arc;

use app::{BoxFuture, CancellationToken, FutureExt};
use chrono::Local;
use multi_quote_feed::{aggregate, convert, select_rate, FeedError};
use sources_common::{
    EquityQuote, ForexQuote, MarketSnapshot, Quote, QuoteSource, SymbolRequest,
};
use tracing::{info, warn};

use super::{config::MarketWatchConfig, MarketWatch};

impl<S> MarketWatch<S>
where
    S: QuoteSource + 'static,
{
    pub fn new(source: S, config: MarketWatchConfig) -> Self {
        Self::with_shared_source(Arc::new(source), config)
    }

    pub fn with_shared_source(source: Arc<S>, config: MarketWatchConfig) -> Self {
        Self { source, config }
    }

    /// Fetch every probe symbol one after another and log the outcome.
    /// Returns how many succeeded; failures never stop the watch.
    pub async fn run_connectivity_checks(&self, shutdown: &CancellationToken) -> usize {
        let mut passed = 0;

        for symbol in &self.config.probe_symbols {
            let outcome = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                outcome = self.source.fetch_quote(symbol) => outcome,
            };

            match outcome {
                Ok(quote) => {
                    passed += 1;
                    info!(
                        %symbol,
                        name = %quote.display_name,
                        price = quote.price,
                        previous_close = quote.previous_close,
                        volume = quote.volume,
                        "Connectivity check passed"
                    );
                }
                Err(e) => warn!(%symbol, %e, "Connectivity check failed"),
            }
        }

        info!(
            passed,
            total = self.config.probe_symbols.len(),
            "Connectivity checks done"
        );
        passed
    }

    /// One full cycle: currency batch, rate selection, equity batch, conversion.
    pub async fn refresh(&self, shutdown: &CancellationToken) -> Result<MarketSnapshot, FeedError> {
        info!(count = self.config.forex.len(), "Fetch currency quotes");
        let mut forex: Vec<ForexQuote> =
            aggregate(&self.config.forex, fetch_with(&self.source), shutdown).await?;
        sort_by_request_order(&mut forex, &self.config.forex);

        let rate = select_rate(&forex, &self.config.official_rate_marker);
        match &rate {
            Some(rate) => info!(symbol = %rate.symbol, rate = rate.rate, "Official rate selected"),
            None => warn!(
                marker = %self.config.official_rate_marker,
                "No official rate, equities stay in source currency"
            ),
        }

        info!(count = self.config.equities.len(), "Fetch equity quotes");
        let equities: Vec<EquityQuote> =
            aggregate(&self.config.equities, fetch_with(&self.source), shutdown).await?;
        let mut equities = convert(
            equities,
            rate.as_ref().map_or(0.0, |r| r.rate),
            &self.config.foreign_market,
        );
        equities.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        Ok(MarketSnapshot {
            updated_at: Local::now(),
            forex,
            equities,
            rate,
        })
    }
}

fn fetch_with<S>(
    source: &Arc<S>,
) -> impl Fn(SymbolRequest) -> BoxFuture<'static, Result<Quote, S::Error>>
where
    S: QuoteSource + 'static,
{
    let source = source.clone();
    move |request| {
        let source = source.clone();
        async move { source.fetch_quote(&request.symbol).await }.boxed()
    }
}

fn sort_by_request_order(quotes: &mut [ForexQuote], requests: &[SymbolRequest]) {
    quotes.sort_by_key(|q| {
        requests
            .iter()
            .position(|r| r.symbol == q.symbol)
            .unwrap_or(usize::MAX)
    });
}

use std::{
    collections::{HashMap, HashSet},
    fmt,
    future::Future,
};

use sources_common::{FromQuote, Quote, SymbolRequest};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub mod conversion;

pub use conversion::{convert, select_rate};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Batch unavailable: {0}")]
    BatchUnavailable(String),

    #[error("Batch cancelled")]
    Cancelled,
}

/// Fetch every request concurrently, one task per symbol.
///
/// Failed symbols are logged and left out, the rest are returned in completion
/// order. A fetch that panics counts as a failure of its own symbol. Only a task
/// the batch cannot attribute to a symbol fails the whole batch. Cancelling
/// `shutdown` aborts every task still in flight.
pub async fn aggregate<T, E, F, Fut>(
    requests: &[SymbolRequest],
    fetch: F,
    shutdown: &CancellationToken,
) -> Result<Vec<T>, FeedError>
where
    T: FromQuote + Send + 'static,
    E: fmt::Display + Send + 'static,
    F: Fn(SymbolRequest) -> Fut,
    Fut: Future<Output = Result<Quote, E>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    let mut seen = HashSet::new();
    let mut symbols = HashMap::new();

    for request in requests {
        if !seen.insert(request.symbol.as_str()) {
            warn!(symbol = %request.symbol, "Duplicate symbol in batch, skipped");
            continue;
        }
        let fetched = fetch(request.clone());
        let symbol = request.symbol.clone();
        let request = request.clone();
        let task = tasks.spawn(async move {
            let outcome = fetched
                .await
                .map(|quote| T::from_quote(&request, quote))
                .map_err(|e| e.to_string());
            (request.symbol, outcome)
        });
        symbols.insert(task.id(), symbol);
    }

    let total = tasks.len();
    let mut collected = Vec::with_capacity(total);
    let mut failures = Vec::new();

    loop {
        let joined = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                tasks.abort_all();
                info!(total, "Batch cancelled");
                return Err(FeedError::Cancelled);
            }
            joined = tasks.join_next() => joined,
        };

        match joined {
            Some(Ok((_, Ok(item)))) => {
                debug!(symbol = item.symbol(), "Quote collected");
                collected.push(item);
            }
            Some(Ok((symbol, Err(e)))) => failures.push((symbol, e)),
            Some(Err(e)) => match symbols.get(&e.id()) {
                Some(symbol) => failures.push((symbol.clone(), e.to_string())),
                None => {
                    tasks.abort_all();
                    return Err(FeedError::BatchUnavailable(e.to_string()));
                }
            },
            None => break,
        }
    }

    for (symbol, error) in &failures {
        warn!(%symbol, %error, "Cannot fetch quote");
    }
    info!(
        total,
        fetched = collected.len(),
        failed = failures.len(),
        "Batch complete"
    );

    Ok(collected)
}

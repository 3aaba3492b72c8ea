use std::io;

use app::{worker::ConsumerWorker, BoxFuture, CancellationToken, FutureExt};
use sources_common::MarketSnapshot;
use tokio::sync::watch;
use tracing::{error, info};

pub mod implementation;

pub use implementation::render;

/// Redraws the whole terminal on every new snapshot.
pub struct TerminalReporter {
    foreign_market: String,
}

impl TerminalReporter {
    pub fn new(foreign_market: impl Into<String>) -> Self {
        Self {
            foreign_market: foreign_market.into(),
        }
    }
}

impl<'f> ConsumerWorker<'f, MarketSnapshot> for TerminalReporter {
    fn work(
        self: Box<Self>,
        mut state_rx: watch::Receiver<Option<MarketSnapshot>>,
        shutdown: CancellationToken,
    ) -> BoxFuture<'f, ()> {
        async move {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let snapshot = state_rx.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    if let Err(e) = render(&mut io::stdout().lock(), &snapshot, &self.foreign_market)
                    {
                        error!(%e, "Cannot render snapshot");
                    }
                }
            }
            info!("Terminal reporter finished");
        }
        .boxed()
    }
}

use std::{fmt, sync::Arc};

use app::{mpsc, worker::ProducerWorker, BoxFuture, CancellationToken, FutureExt, SinkExt};
use multi_quote_feed::FeedError;
use sources_common::{MarketSnapshot, QuoteSource};
use tracing::{error, info, warn};

use self::config::MarketWatchConfig;

pub mod config;
mod implementation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// One-off connectivity probes before the first cycle.
    Testing,
    Running { cycle: u64 },
    ErrorBackoff { cycle: u64 },
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    ChecksDone,
    CycleRendered,
    BatchFailed,
    BackoffElapsed,
    ShutdownRequested,
}

impl WatchState {
    /// Events that make no sense in the current state leave it unchanged.
    pub fn next(self, event: WatchEvent) -> Self {
        use WatchEvent::*;
        use WatchState::*;

        match (self, event) {
            (_, ShutdownRequested) | (Stopped, _) => Stopped,
            (Testing, ChecksDone) => Running { cycle: 1 },
            (Running { cycle }, CycleRendered) => Running { cycle: cycle + 1 },
            (Running { cycle }, BatchFailed) => ErrorBackoff { cycle },
            (ErrorBackoff { cycle }, BackoffElapsed) => Running { cycle: cycle + 1 },
            (state, _) => state,
        }
    }
}

/// Periodic refresh of currency and equity quotes, one [`MarketSnapshot`] per cycle.
pub struct MarketWatch<S> {
    source: Arc<S>,
    config: MarketWatchConfig,
}

impl<S> fmt::Debug for MarketWatch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketWatch")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn advance(state: WatchState, event: WatchEvent) -> WatchState {
    let next = state.next(event);
    if next != state {
        info!(?state, ?event, ?next, "Watch state changed");
    }
    next
}

impl<'f, S> ProducerWorker<'f, MarketSnapshot> for MarketWatch<S>
where
    S: QuoteSource + 'static,
{
    fn work(
        self: Box<Self>,
        mut state_tx: mpsc::Sender<MarketSnapshot>,
        shutdown: CancellationToken,
    ) -> BoxFuture<'f, ()> {
        async move {
            let mut state = WatchState::Testing;
            self.run_connectivity_checks(&shutdown).await;
            state = advance(
                state,
                if shutdown.is_cancelled() {
                    WatchEvent::ShutdownRequested
                } else {
                    WatchEvent::ChecksDone
                },
            );

            while let WatchState::Running { cycle } = state {
                info!(cycle, "Start refresh cycle");
                let (event, delay) = match self.refresh(&shutdown).await {
                    Ok(snapshot) => {
                        info!(
                            cycle,
                            forex = snapshot.forex.len(),
                            equities = snapshot.equities.len(),
                            "Cycle complete"
                        );
                        if state_tx.send(snapshot).await.is_err() {
                            warn!("Snapshot receiver is gone, stop watching");
                            state = advance(state, WatchEvent::ShutdownRequested);
                            break;
                        }
                        (WatchEvent::CycleRendered, self.config.period)
                    }
                    Err(FeedError::Cancelled) => {
                        state = advance(state, WatchEvent::ShutdownRequested);
                        break;
                    }
                    Err(e) => {
                        error!(cycle, %e, delay = ?self.config.error_backoff, "Cycle failed, back off");
                        state = advance(state, WatchEvent::BatchFailed);
                        (WatchEvent::BackoffElapsed, self.config.error_backoff)
                    }
                };

                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        state = advance(state, WatchEvent::ShutdownRequested);
                    }
                    _ = tokio::time::sleep(delay) => {
                        state = advance(state, event);
                    }
                }
            }

            info!(?state, "Market watch finished");
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    };

    use app::StreamExt;
    use async_trait::async_trait;
    use sources_common::{Quote, SymbolRequest};
    use tokio::time::Instant;

    use super::*;

    /// Serves fixed quotes. Fetching `BOOM` panics while `panics_left` lasts.
    #[derive(Default)]
    struct FakeSource {
        quotes: HashMap<String, Quote>,
        panics_left: AtomicUsize,
        requested: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with_quotes(quotes: &[(&str, f64, f64)]) -> Self {
            let quotes = quotes
                .iter()
                .map(|&(symbol, price, previous_close)| {
                    let quote = Quote {
                        symbol: symbol.into(),
                        display_name: format!("{symbol} Inc"),
                        price,
                        previous_close,
                        volume: 100,
                    };
                    (symbol.to_string(), quote)
                })
                .collect();
            Self {
                quotes,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        type Error = String;

        async fn fetch_quote(&self, symbol: &str) -> Result<Quote, String> {
            self.requested.lock().unwrap().push(symbol.to_string());
            if symbol == "BOOM" && self.panics_left.load(Ordering::SeqCst) > 0 {
                self.panics_left.fetch_sub(1, Ordering::SeqCst);
                panic!("source blew up");
            }
            self.quotes
                .get(symbol)
                .cloned()
                .ok_or_else(|| format!("no data for {symbol}"))
        }
    }

    fn config() -> MarketWatchConfig {
        MarketWatchConfig {
            probe_symbols: vec![],
            forex: vec![
                SymbolRequest::currency("ARS=X", "Dólar Oficial"),
                SymbolRequest::currency("EURARS=X", "Euro"),
                SymbolRequest::currency("USDARS=X", "Dólar Oficial (alt)"),
            ],
            equities: vec![
                SymbolRequest::equity("YPF", "YPF", "NYSE"),
                SymbolRequest::equity("ALUA", "Aluar", "BCBA"),
                SymbolRequest::equity("GGAL", "Galicia", "NYSE"),
                SymbolRequest::equity("IRCP", "IRSA", "NYSE"),
            ],
            ..MarketWatchConfig::default()
        }
    }

    fn market() -> FakeSource {
        FakeSource::with_quotes(&[
            ("EURARS=X", 1100.0, 1090.0),
            ("ARS=X", 1000.0, 950.0),
            ("GGAL", 100.0, 90.0),
            ("YPF", 20.0, 25.0),
            ("ALUA", 700.0, 700.0),
        ])
    }

    #[test]
    fn state_transitions() {
        use WatchEvent::*;

        let state = WatchState::Testing.next(ChecksDone);
        assert_eq!(state, WatchState::Running { cycle: 1 });

        let state = state.next(CycleRendered);
        assert_eq!(state, WatchState::Running { cycle: 2 });

        let state = state.next(BatchFailed);
        assert_eq!(state, WatchState::ErrorBackoff { cycle: 2 });
        assert_eq!(state.next(CycleRendered), state);

        let state = state.next(BackoffElapsed);
        assert_eq!(state, WatchState::Running { cycle: 3 });

        assert_eq!(state.next(ShutdownRequested), WatchState::Stopped);
        assert_eq!(WatchState::Testing.next(ShutdownRequested), WatchState::Stopped);
        assert_eq!(WatchState::Stopped.next(ChecksDone), WatchState::Stopped);
    }

    #[tokio::test]
    async fn refresh_converts_foreign_equities() {
        let watch = MarketWatch::new(market(), config());

        let snapshot = watch.refresh(&CancellationToken::new()).await.unwrap();

        let forex: Vec<_> = snapshot.forex.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(forex, vec!["ARS=X", "EURARS=X"]);
        assert_eq!(snapshot.rate.as_ref().map(|r| r.rate), Some(1000.0));

        let equities: Vec<_> = snapshot.equities.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(equities, vec!["ALUA", "GGAL", "YPF"]);

        let ggal = &snapshot.equities[1];
        assert_eq!(ggal.price, 100_000.0);
        assert_eq!(ggal.change, 10_000.0);
        assert!((ggal.change_percent - 11.11).abs() < 0.01);
        assert!(ggal.converted);

        let alua = &snapshot.equities[0];
        assert_eq!(alua.price, 700.0);
        assert!(!alua.converted);
    }

    #[tokio::test]
    async fn refresh_without_official_rate() {
        let source = FakeSource::with_quotes(&[("EURARS=X", 1100.0, 1090.0), ("GGAL", 100.0, 90.0)]);
        let watch = MarketWatch::new(source, config());

        let snapshot = watch.refresh(&CancellationToken::new()).await.unwrap();

        assert_eq!(snapshot.rate, None);
        assert_eq!(snapshot.equities.len(), 1);
        assert_eq!(snapshot.equities[0].price, 100.0);
        assert_eq!(snapshot.equities[0].change, 10.0);
        assert!(!snapshot.equities[0].converted);
    }

    #[tokio::test]
    async fn connectivity_checks_never_fail() {
        let config = MarketWatchConfig {
            probe_symbols: ["AAPL", "ARS=X", "YPF"].map(String::from).to_vec(),
            ..config()
        };
        let watch = MarketWatch::new(market(), config);

        let passed = watch
            .run_connectivity_checks(&CancellationToken::new())
            .await;

        assert_eq!(passed, 2);
        assert_eq!(
            *watch.source.requested.lock().unwrap(),
            vec!["AAPL", "ARS=X", "YPF"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_until_shutdown() {
        let watch = Box::new(MarketWatch::new(market(), config()));
        let shutdown = CancellationToken::new();
        let (state_tx, mut state_rx) = mpsc::channel(10);
        let worker = tokio::spawn(watch.work(state_tx, shutdown.clone()));

        let first = state_rx.next().await.unwrap();
        let started = Instant::now();
        let second = state_rx.next().await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
        assert_eq!(first.equities, second.equities);

        shutdown.cancel();
        worker.await.unwrap();
        while state_rx.next().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_symbol_is_left_out_of_the_cycle() {
        let mut config = config();
        config.forex.push(SymbolRequest::currency("BOOM", "Broken"));
        let source = market();
        source.panics_left.store(1, Ordering::SeqCst);

        let watch = Box::new(MarketWatch::new(source, config));
        let shutdown = CancellationToken::new();
        let (state_tx, mut state_rx) = mpsc::channel(10);
        let started = Instant::now();
        let worker = tokio::spawn(watch.work(state_tx, shutdown.clone()));

        let snapshot = state_rx.next().await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        let forex: Vec<_> = snapshot.forex.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(forex, vec!["ARS=X", "EURARS=X"]);
        assert_eq!(snapshot.rate.map(|r| r.rate), Some(1000.0));
        assert_eq!(snapshot.equities.len(), 3);

        shutdown.cancel();
        worker.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_checks_skips_cycles() {
        let config = MarketWatchConfig {
            probe_symbols: vec!["AAPL".into()],
            ..config()
        };
        let watch = Box::new(MarketWatch::new(market(), config));
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let (state_tx, mut state_rx) = mpsc::channel(10);

        watch.work(state_tx, shutdown).await;

        assert!(state_rx.next().await.is_none());
    }
}

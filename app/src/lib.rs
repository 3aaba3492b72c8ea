use core::fmt;
use std::sync::Arc;

pub use futures::{
    channel::mpsc, future::BoxFuture, stream::FuturesUnordered, FutureExt, SinkExt, StreamExt,
};
pub use futures::{Sink, Stream};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
pub use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub mod worker;

/// The part of the application state a consumer is interested in, `None` while
/// there is nothing to hand over yet.
pub trait Reduced<T> {
    fn reduce(&self) -> Option<T>;
}

pub trait InjectedTo<S> {
    fn inject_to(self, state: S) -> S;
}

type Runner<'f, S> =
    Box<dyn FnOnce(Arc<watch::Sender<S>>, CancellationToken) -> BoxFuture<'f, ()> + Send + 'f>;

pub struct App<'f, S> {
    state: Arc<watch::Sender<S>>,
    runners: Vec<Runner<'f, S>>,
    shutdown: CancellationToken,
}

pub struct AppBuilder<'f, S> {
    state: Arc<watch::Sender<S>>,
    runners: Vec<Runner<'f, S>>,
    shutdown: CancellationToken,
}

impl<'f, S> App<'f, S>
where
    S: Send + Sync + 'f,
{
    pub fn build(initial_state: S) -> AppBuilder<'f, S> {
        let (state_tx, _) = watch::channel(initial_state);

        AppBuilder {
            state: Arc::new(state_tx),
            runners: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Runs every worker until they all return or the shutdown token fires.
    /// Workers still running at shutdown are dropped.
    pub async fn run(self) {
        let App {
            state,
            runners,
            shutdown,
        } = self;

        let mut futures = runners
            .into_iter()
            .map(|runner| runner(state.clone(), shutdown.clone()))
            .collect::<FuturesUnordered<_>>();
        // producers own the state from here, it closes once they are all done
        drop(state);

        let total_len = futures.len();
        info!(total_len, "Run futures");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, stop workers");
                    break;
                }
                finished = futures.next() => {
                    if finished.is_none() {
                        info!("All futures returned");
                        break;
                    }
                }
            }
        }
    }
}

impl<'f, AppState> AppBuilder<'f, AppState>
where
    AppState: Clone + Send + Sync + 'static,
{
    /// Share an externally owned token, e.g. one cancelled by a signal handler.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn add_producer<WorkerState>(
        mut self,
        worker: impl worker::ProducerWorker<'f, WorkerState> + Send + 'f,
    ) -> Self
    where
        WorkerState: InjectedTo<AppState> + fmt::Debug + Send + 'f,
    {
        let worker = Box::new(worker);
        let runner = move |state: Arc<watch::Sender<AppState>>, shutdown: CancellationToken| {
            let (worker_tx, worker_rx) = mpsc::channel::<WorkerState>(100);
            let data_futures = vec![
                state_injector(worker_rx, state).boxed(),
                worker.work(worker_tx, shutdown),
            ];

            async move {
                futures::future::join_all(data_futures).await;
            }
            .boxed()
        };

        self.runners.push(Box::new(runner));
        self
    }

    pub fn add_consumer<WorkerState>(
        mut self,
        worker: impl worker::ConsumerWorker<'f, WorkerState> + Send + 'f,
    ) -> Self
    where
        WorkerState: fmt::Debug + Send + Sync + 'f,
        AppState: Reduced<WorkerState>,
    {
        let worker = Box::new(worker);
        let runner = move |state: Arc<watch::Sender<AppState>>, shutdown: CancellationToken| {
            let (reduced_tx, reduced_rx) = watch::channel(None);
            let data_futures = vec![
                state_reducer(state.subscribe(), reduced_tx).boxed(),
                worker.work(reduced_rx, shutdown),
            ];

            async move {
                futures::future::join_all(data_futures).await;
            }
            .boxed()
        };

        self.runners.push(Box::new(runner));
        self
    }

    pub fn build(self) -> App<'f, AppState> {
        App {
            state: self.state,
            runners: self.runners,
            shutdown: self.shutdown,
        }
    }
}

async fn state_injector<AppState, WorkerState>(
    mut worker_rx: mpsc::Receiver<WorkerState>,
    state: Arc<watch::Sender<AppState>>,
) where
    AppState: Clone,
    WorkerState: InjectedTo<AppState> + fmt::Debug,
{
    while let Some(data) = worker_rx.next().await {
        debug!(?data, "Inject worker data");
        state.send_modify(move |current| {
            *current = data.inject_to(current.clone());
        });
    }
    debug!("Producer finished");
}

async fn state_reducer<AppState, WorkerState>(
    state_rx: watch::Receiver<AppState>,
    reduced_tx: watch::Sender<Option<WorkerState>>,
) where
    AppState: Reduced<WorkerState> + Clone + Send + Sync + 'static,
{
    let mut states = WatchStream::new(state_rx);
    while let Some(state) = states.next().await {
        if reduced_tx.is_closed() {
            debug!("Consumer finished");
            break;
        }
        if let Some(data) = state.reduce() {
            reduced_tx.send_replace(Some(data));
        }
    }
}

use futures::{channel::mpsc, future::BoxFuture};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Pushes values into the application state until `shutdown` fires or it runs dry.
pub trait ProducerWorker<'f, T> {
    fn work(
        self: Box<Self>,
        state_tx: mpsc::Sender<T>,
        shutdown: CancellationToken,
    ) -> BoxFuture<'f, ()>;
}

/// Observes its reduced view of the application state. `None` until the state
/// holds something for it.
pub trait ConsumerWorker<'f, T> {
    fn work(
        self: Box<Self>,
        state_rx: watch::Receiver<Option<T>>,
        shutdown: CancellationToken,
    ) -> BoxFuture<'f, ()>;
}

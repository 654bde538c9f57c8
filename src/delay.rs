use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

type DelayFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Sleep function used between retry attempts.
///
/// Defaults to `tokio::time::sleep`. Tests swap it for one that returns
/// immediately (and possibly records the requested durations).
#[derive(Clone)]
pub struct Delay(Arc<dyn Fn(Duration) -> DelayFuture + Send + Sync>);

impl Delay {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Duration) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self(Arc::new(move |duration| Box::pin(f(duration))))
    }

    /// Real wall-clock sleep.
    pub fn tokio() -> Self {
        Self::new(tokio::time::sleep)
    }

    /// Never waits.
    pub fn none() -> Self {
        Self::new(|_| std::future::ready(()))
    }

    pub(crate) async fn wait(&self, duration: Duration) {
        (self.0)(duration).await;
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::tokio()
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Delay(<fn>)")
    }
}

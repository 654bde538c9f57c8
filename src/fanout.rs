//! Bounded, order-preserving fan-out of cross-reference lookups.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::task::JoinSet;

use crate::{Result, SwapiClient, SwapiError};

/// Runs `f` over `inputs` with at most `worker_limit` calls in flight.
///
/// `output[i]` always belongs to `inputs[i]`, whatever the completion order.
/// The first error is returned immediately; dropping the join set aborts
/// every worker still running.
pub(crate) async fn bounded_fan_out<I, T, F, Fut>(
    inputs: Vec<I>,
    worker_limit: usize,
    f: F,
) -> Result<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    let total = inputs.len();
    let workers = worker_limit.max(1).min(total);
    let f = Arc::new(f);
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    let mut pending = inputs.into_iter().enumerate();
    let mut join_set = JoinSet::new();

    #[cfg(feature = "tracing")]
    tracing::debug!(tasks = total, workers, "fan-out started");

    loop {
        while join_set.len() < workers {
            let Some((index, input)) = pending.next() else {
                break;
            };
            let f = Arc::clone(&f);
            join_set.spawn(async move { (index, f(input).await) });
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let (index, result) = match joined {
            Ok(done) => done,
            // workers are only aborted when the set is dropped, so a join error is a panic
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        };
        slots[index] = Some(result?);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(tasks = total, "fan-out finished");

    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| SwapiError::BadResponse("fan-out finished with missing results".to_owned()))
}

impl SwapiClient {
    /// Resolves absolute URLs concurrently through the response cache.
    ///
    /// Results keep the order of `urls`. Any failure fails the whole call and
    /// aborts the lookups still in flight.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        urls: &[S],
        worker_limit: usize,
    ) -> Result<Vec<JsonValue>> {
        let urls: Vec<String> = urls.iter().map(|url| url.as_ref().to_owned()).collect();
        let client = self.clone();
        bounded_fan_out(urls, worker_limit, move |url| {
            let client = client.clone();
            async move { client.get_by_url(&url, ()).await }
        })
        .await
    }

    /// [`SwapiClient::resolve`] bounded by a deadline for the whole fan-out.
    ///
    /// Past the deadline the call fails with [`SwapiError::Timeout`] and all
    /// unfinished lookups are aborted rather than left running. The error
    /// names the fan-out (`fan-out of N url(s)`) instead of a single URL and
    /// reports one attempt, since the deadline is never retried.
    pub async fn resolve_within<S: AsRef<str>>(
        &self,
        urls: &[S],
        worker_limit: usize,
        deadline: Duration,
    ) -> Result<Vec<JsonValue>> {
        match tokio::time::timeout(deadline, self.resolve(urls, worker_limit)).await {
            Ok(result) => result,
            Err(_) => Err(SwapiError::Timeout {
                url: format!("fan-out of {} url(s)", urls.len()),
                attempts: 1,
            }),
        }
    }
}

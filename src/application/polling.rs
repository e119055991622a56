//! Bounded polling of external status.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Result of a bounded poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    /// The bound elapsed before the probe reported a terminal value.
    TimedOut,
}

/// Call `probe` every `interval` until it yields `Some`, for at most `timeout`.
///
/// The first probe happens after one interval. A zero timeout returns
/// [`PollOutcome::TimedOut`] without probing.
pub async fn poll_until<T, F, Fut>(
    label: &str,
    interval: Duration,
    timeout: Duration,
    mut probe: F,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let now = Instant::now();
        if now >= deadline {
            debug!(poll = label, waited_secs = timeout.as_secs(), "Poll timed out");
            return PollOutcome::TimedOut;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
        if let Some(value) = probe().await {
            return PollOutcome::Ready(value);
        }
    }
}

//! Bounded polling with optional backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::{HubError, Result};

/// Default number of status checks before giving up.
pub const DEFAULT_ATTEMPTS: u32 = 30;

/// Default pause between status checks.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// How many times to poll and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub attempts: u32,
    /// Pause after the first unsuccessful attempt.
    pub delay: Duration,
    /// Factor applied to the pause after each attempt. `1.0` keeps it fixed.
    pub backoff: f64,
    /// Upper bound on any single pause.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl RetryPolicy {
    /// Constant delay between attempts.
    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay,
            backoff: 1.0,
            max_delay: delay,
        }
    }

    /// Delay multiplied by `factor` after each attempt, capped at `max_delay`.
    #[must_use]
    pub fn with_backoff(mut self, factor: f64, max_delay: Duration) -> Self {
        self.backoff = factor.max(1.0);
        self.max_delay = max_delay.max(self.delay);
        self
    }

    /// Pause to take after attempt number `attempt` (0-based) failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scaled = self.delay.as_secs_f64() * self.backoff.powi(exponent);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}

/// Result of one polling attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Poll<T> {
    /// The operation finished.
    Ready(T),
    /// Not finished yet; try again after a pause.
    Pending,
}

/// Run `attempt` until it reports [`Poll::Ready`] or the policy runs out.
///
/// Errors returned by `attempt` stop the loop immediately.
///
/// # Errors
///
/// Returns [`HubError::Timeout`] when every attempt came back pending.
pub async fn poll<T, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Poll<T>>>,
{
    for n in 0..policy.attempts {
        match attempt(n).await? {
            Poll::Ready(value) => return Ok(value),
            Poll::Pending => {
                let remaining = policy.attempts - n - 1;
                tracing::debug!(attempt = n + 1, remaining, "Not ready yet");
                if remaining > 0 {
                    tokio::time::sleep(policy.delay_for(n)).await;
                }
            }
        }
    }

    Err(HubError::Timeout {
        attempts: policy.attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_fixed_delay() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(2));
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::fixed(10, Duration::from_secs(1))
            .with_backoff(2.0, Duration::from_secs(5));
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_ready_after_pending() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::fixed(5, Duration::from_secs(1));

        let value = poll(&policy, |_| async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Ok(Poll::Pending)
            } else {
                Ok(Poll::Ready("done"))
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_times_out() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::fixed(4, Duration::from_secs(1));

        let err = poll(&policy, |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Poll::<()>::Pending)
        })
        .await
        .unwrap_err();

        assert!(matches!(err, HubError::Timeout { attempts: 4 }));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_stops_on_error() {
        let policy = RetryPolicy::fixed(4, Duration::from_secs(1));
        let err = poll(&policy, |_| async {
            Err::<Poll<()>, _>(HubError::MissingLocation)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, HubError::MissingLocation));
    }
}

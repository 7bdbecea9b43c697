//! Retrying step execution
//!
//! Side-effecting workflow steps run under a bounded exponential-backoff
//! policy with a per-attempt timeout. All retry logic in the system lives
//! here; callers outside a workflow never retry.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::error::FlowError;

/// Retry policy for a workflow step.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt.
    pub initial_backoff: Duration,
    /// Multiplier applied to the backoff after each failed attempt.
    pub backoff_multiplier: f64,
    /// Upper bound on the backoff between attempts.
    pub max_backoff: Duration,
    /// Timeout applied to each individual attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    fn next_backoff(&self, current: Duration) -> Duration {
        let scaled = current.mul_f64(self.backoff_multiplier);
        scaled.min(self.max_backoff)
    }
}

/// Runs `op` until it succeeds or the attempt budget is exhausted.
///
/// Each attempt is bounded by `policy.attempt_timeout`; timeouts count as
/// failed attempts. Exhaustion returns [`FlowError::StepFailed`], which is
/// terminal for the calling instance.
pub async fn run_with_retry<T, E, F, Fut>(
    step: &'static str,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, FlowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut backoff = policy.initial_backoff;
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts.max(1) {
        match tokio::time::timeout(policy.attempt_timeout, op()).await {
            Ok(Ok(value)) => {
                if attempt > 1 {
                    tracing::info!(step, attempt, "step succeeded after retry");
                }
                return Ok(value);
            }
            Ok(Err(err)) => {
                last_error = err.to_string();
                tracing::warn!(step, attempt, error = %last_error, "step attempt failed");
            }
            Err(_) => {
                last_error = format!("attempt timed out after {:?}", policy.attempt_timeout);
                tracing::warn!(step, attempt, "step attempt timed out");
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(backoff).await;
            backoff = policy.next_backoff(backoff);
        }
    }

    Err(FlowError::StepFailed {
        step,
        attempts: policy.max_attempts.max(1),
        message: last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_first_attempt_without_sleeping() {
        let policy = RetryPolicy::default();
        let result: Result<i32, FlowError> =
            run_with_retry("noop", &policy, || async { Ok::<_, FlowError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let result = run_with_retry("flaky", &policy, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("transient")
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_the_budget_is_terminal() {
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let result: Result<(), FlowError> = run_with_retry("doomed", &policy, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err("still broken") }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result {
            Err(FlowError::StepFailed { step, attempts, .. }) => {
                assert_eq!(step, "doomed");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected StepFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 6,
            initial_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(30),
        };
        assert_eq!(
            policy.next_backoff(Duration::from_secs(10)),
            Duration::from_secs(20)
        );
        assert_eq!(
            policy.next_backoff(Duration::from_secs(20)),
            Duration::from_secs(30)
        );
        assert_eq!(
            policy.next_backoff(Duration::from_secs(30)),
            Duration::from_secs(30)
        );
    }
}

//! Bounded retry with a fixed delay between attempts.

use std::{fmt::Display, future::Future, time::Duration};

pub const DEFAULT_LOCATION_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Zero is treated as one.
    pub attempts: u32,
    /// Pause between two consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// A single attempt, no retry.
    pub fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_LOCATION_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Every attempt failed; `last` is the error of the final one.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Run `operation` until it succeeds or the policy runs out of attempts.
pub async fn with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut operation: F,
) -> Result<T, Exhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{what} succeeded on attempt {attempt} of {attempts}");
                }
                return Ok(value);
            }
            Err(err) => {
                tracing::warn!(attempt, attempts, error = %err, "{what} attempt failed");

                if attempt >= attempts {
                    return Err(Exhausted { attempts, last: err });
                }

                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn default_policy_is_three_attempts_one_second_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test]
    async fn stops_after_first_success() {
        let calls = Cell::new(0);
        let result: Result<u32, Exhausted<String>> =
            with_retry(RetryPolicy::new(5, Duration::ZERO), "test", || {
                calls.set(calls.get() + 1);
                async { Ok(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = Cell::new(0);
        let result = with_retry(RetryPolicy::new(3, Duration::ZERO), "test", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(format!("boom {n}"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn gives_up_with_last_error() {
        let calls = Cell::new(0);
        let result: Result<(), _> = with_retry(RetryPolicy::new(4, Duration::ZERO), "test", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Err(format!("boom {n}")) }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 4);
        assert_eq!(exhausted.last, "boom 4");
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test]
    async fn waits_between_attempts() {
        let started = std::time::Instant::now();
        let result: Result<(), _> =
            with_retry(RetryPolicy::new(3, Duration::from_millis(20)), "test", || async {
                Err("nope")
            })
            .await;

        assert!(result.is_err());
        // two pauses, none after the final attempt
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}

//! Bounded retry with fixed delays.

use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{error, warn};

/// Delay before the first bucket policy attempt.
pub const POLICY_INITIAL_DELAY: Duration = Duration::from_secs(3);

/// Attempts made after the first failed bucket policy attempt.
pub const POLICY_RETRIES: u32 = 5;

/// Delay before each bucket policy retry.
pub const POLICY_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Fixed-delay retry schedule.
///
/// New identities take a few seconds to become visible to the storage control
/// plane, so attaching a policy that names one fails for a short, bounded
/// window. The schedule is a flat count and delay, not a backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: POLICY_INITIAL_DELAY,
            retries: POLICY_RETRIES,
            delay: POLICY_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Total number of attempts this policy allows.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Run `attempt` until it succeeds or the retries are spent.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt once every retry has failed.
    pub async fn run<F, Fut, T, E>(&self, operation: &str, mut attempt: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        sleep(self.initial_delay).await;

        let mut retries = 0;

        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(source) if retries < self.retries => {
                    retries += 1;

                    warn!(
                        operation,
                        retry = retries,
                        max_retries = self.retries,
                        "{source}; retrying after {:?}",
                        self.delay
                    );

                    sleep(self.delay).await;
                }
                Err(source) => {
                    error!(
                        operation,
                        retries, "giving up after {} attempts: {source}",
                        self.max_attempts()
                    );

                    return Err(source);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    async fn fail_times(calls: &AtomicU32, failures: u32) -> Result<u32, String> {
        let call = calls.fetch_add(1, Ordering::SeqCst) + 1;

        if call <= failures {
            Err(format!("attempt {call} failed"))
        } else {
            Ok(call)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_the_last_allowed_attempt() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run("test", || fail_times(&calls, 5))
            .await;

        assert_eq!(result, Ok(6));
        assert_eq!(calls.load(Ordering::SeqCst), 6, "expected six attempts");
        assert_eq!(
            started.elapsed(),
            Duration::from_secs(18),
            "expected the initial delay plus five retry delays"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_six_failures() {
        let calls = AtomicU32::new(0);

        let result = RetryPolicy::default()
            .run("test", || fail_times(&calls, u32::MAX))
            .await;

        assert_eq!(result, Err("attempt 6 failed".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 6, "expected six attempts");
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_waits_only_the_initial_delay() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run("test", || fail_times(&calls, 0))
            .await;

        assert_eq!(result, Ok(1));
        assert_eq!(started.elapsed(), POLICY_INITIAL_DELAY);
    }
}

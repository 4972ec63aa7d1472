//! Bounded retry execution for remote operations.
//!
//! Every mutation against the hosted platform (sign-in, sign-out, goal
//! submit, transaction submit) goes through one [`RetryingExecutor`]. The
//! executor owns the attempt loop, the fixed inter-attempt delay, and the
//! transient-failure classification; callers own error-to-message mapping.
//!
//! Classification is deliberately string based: the platform reports
//! failures as message-carrying descriptors, and the only signal available
//! at this layer is whether the rendered message smells like a transport
//! problem. A permanent error whose message happens to contain a matched
//! keyword will be retried; that is accepted behaviour, bounded by
//! [`RetryPolicy::max_attempts`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

/// Message fragments that mark a failure as worth retrying.
///
/// Matched case-insensitively against the rendered error message. The list
/// mixes human transport phrasing with the raw OS-level error codes that
/// transport stacks embed verbatim in their messages.
const TRANSIENT_MESSAGE_KEYWORDS: [&str; 8] = [
    "load failed",
    "network",
    "timeout",
    "connection",
    "fetch",
    "econnreset",
    "etimedout",
    "enotfound",
];

/// Return whether a failure message looks transient.
///
/// # Examples
/// ```
/// use client::domain::retry::is_transient_message;
///
/// assert!(is_transient_message("Network request failed"));
/// assert!(is_transient_message("error sending request: ETIMEDOUT"));
/// assert!(!is_transient_message("invalid login credentials"));
/// ```
pub fn is_transient_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    TRANSIENT_MESSAGE_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Attempt bound and inter-attempt delay for one logical remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum invocations per logical call, including the first.
    pub max_attempts: u32,
    /// Fixed pause between consecutive attempts.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Async sleeping abstraction so tests never wait on wall-clock time.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Observable attempt counter shared with UI code.
///
/// The gauge reads 0 while no call is in flight; attempt N sets it to N at
/// the start of the attempt, and any terminal outcome (success or final
/// failure) clears it back to 0. UI shells read it to render "attempt N"
/// feedback and to disable resubmission mid-retry.
///
/// # Examples
/// ```
/// use client::domain::AttemptGauge;
///
/// let gauge = AttemptGauge::default();
/// assert_eq!(gauge.current(), 0);
/// assert!(!gauge.in_flight());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttemptGauge(Arc<AtomicU32>);

impl AttemptGauge {
    /// Current attempt number; 0 when idle.
    pub fn current(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    /// Whether a retry sequence is currently running.
    pub fn in_flight(&self) -> bool {
        self.current() > 0
    }

    fn begin(&self, attempt: u32) {
        self.0.store(attempt, Ordering::SeqCst);
    }

    fn clear(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

/// Executes one async remote operation with bounded retry on transient
/// failure.
///
/// Attempts are strictly serial: the next attempt starts only after the
/// previous one finished and the delay elapsed. Independent executors (and
/// independent calls on one executor) do not coordinate. Dropping the
/// returned future cancels the sequence at its current await point; no
/// timer keeps running behind the caller's back.
pub struct RetryingExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn RetrySleeper>,
    gauge: AttemptGauge,
}

impl RetryingExecutor {
    /// Build an executor with the given policy and the tokio sleeper.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    /// Build an executor with an injected sleeper.
    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn RetrySleeper>) -> Self {
        Self {
            policy,
            sleeper,
            gauge: AttemptGauge::default(),
        }
    }

    /// Handle to the observable attempt counter.
    pub fn gauge(&self) -> AttemptGauge {
        self.gauge.clone()
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// bound is exhausted. The final result is returned unchanged either
    /// way; callers decide how to present it.
    ///
    /// # Examples
    /// ```
    /// # async fn demo() {
    /// use client::domain::{RetryPolicy, RetryingExecutor};
    ///
    /// let executor = RetryingExecutor::new(RetryPolicy::default());
    /// let result: Result<u32, String> = executor.execute(|| async { Ok(7) }).await;
    /// assert_eq!(result, Ok(7));
    /// # }
    /// ```
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            self.gauge.begin(attempt);
            match operation().await {
                Ok(value) => {
                    tracing::debug!(attempt, "remote operation succeeded");
                    self.gauge.clear();
                    return Ok(value);
                }
                Err(error) => {
                    let transient = is_transient_message(&error.to_string());
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        transient,
                        %error,
                        "remote operation attempt failed"
                    );
                    if !transient || attempt >= max_attempts {
                        self.gauge.clear();
                        return Err(error);
                    }
                }
            }
            self.sleeper.sleep(self.policy.retry_delay).await;
            attempt += 1;
        }
    }
}

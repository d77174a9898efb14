//! Retry policies for transient failures.
//!
//! Used by `ThinkNode` (through `llm::invoke_with_retry`) around each model call.
//! Only errors for which `AgentError::is_retryable` holds are retried.

use std::time::Duration;

/// How many times and with what delay to retry a failed operation.
///
/// `max_attempts` counts retries, not the first try: `fixed(2, ..)` runs at most 3 times.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RetryPolicy {
    /// Fail immediately.
    #[default]
    None,
    /// Constant delay between retries.
    Fixed {
        max_attempts: usize,
        interval: Duration,
    },
    /// Exponentially growing delay, capped at `max_interval`.
    Exponential {
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    },
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy::None
    }

    pub fn fixed(max_attempts: usize, interval: Duration) -> Self {
        RetryPolicy::Fixed {
            max_attempts,
            interval,
        }
    }

    pub fn exponential(
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    ) -> Self {
        RetryPolicy::Exponential {
            max_attempts,
            initial_interval,
            max_interval,
            multiplier,
        }
    }

    /// Default policy for model calls: `max_retries` retries, 500ms doubling up to 8s.
    /// Zero retries yields `RetryPolicy::None`.
    pub fn for_model_calls(max_retries: usize) -> Self {
        if max_retries == 0 {
            return RetryPolicy::None;
        }
        RetryPolicy::exponential(
            max_retries,
            Duration::from_millis(500),
            Duration::from_secs(8),
            2.0,
        )
    }

    /// True when retry number `attempt` (0-based) is still allowed.
    pub fn should_retry(&self, attempt: usize) -> bool {
        attempt < self.max_attempts()
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { interval, .. } => *interval,
            RetryPolicy::Exponential {
                initial_interval,
                max_interval,
                multiplier,
                ..
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = initial_interval.as_secs_f64() * multiplier.powi(exponent);
                Duration::try_from_secs_f64(secs).map_or(*max_interval, |d| d.min(*max_interval))
            }
        }
    }

    pub fn max_attempts(&self) -> usize {
        match self {
            RetryPolicy::None => 0,
            RetryPolicy::Fixed { max_attempts, .. } => *max_attempts,
            RetryPolicy::Exponential { max_attempts, .. } => *max_attempts,
        }
    }
}

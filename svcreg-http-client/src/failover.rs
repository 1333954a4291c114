//! Failover configuration.

use std::time::Duration;

/// Bounds on how a call moves between cluster members.
#[derive(Debug, Clone, Default)]
pub struct FailoverConfig {
    /// Maximum attempts per call. `None` allows one attempt per member.
    pub max_attempts: Option<u32>,
    /// Delay before trying the next member.
    pub backoff: BackoffStrategy,
}

impl FailoverConfig {
    /// Allow at most `max_attempts` attempts per call.
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            ..Default::default()
        }
    }

    /// Set the backoff between attempts.
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// The attempt budget for a cluster of `members` members.
    ///
    /// Always at least one.
    pub fn attempt_limit(&self, members: usize) -> u32 {
        let limit = self
            .max_attempts
            .unwrap_or_else(|| u32::try_from(members).unwrap_or(u32::MAX));
        limit.max(1)
    }

    /// Calculate delay before a given failover (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay_for_attempt(attempt)
    }
}

/// Backoff strategy between failover attempts.
#[derive(Debug, Clone, Default)]
pub enum BackoffStrategy {
    /// Move to the next member immediately.
    #[default]
    None,
    /// Constant delay between attempts.
    Constant(Duration),
    /// Linear backoff: delay increases by a fixed amount.
    Linear {
        /// Delay increment per attempt.
        delay: Duration,
        /// Maximum delay.
        max: Duration,
    },
    /// Exponential backoff: delay doubles each attempt.
    Exponential {
        /// Initial delay.
        initial: Duration,
        /// Maximum delay.
        max: Duration,
        /// Multiplier (typically 2.0).
        multiplier: f64,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Constant(d) => *d,
            Self::Linear { delay, max } => {
                let total = delay.saturating_mul(attempt + 1);
                total.min(*max)
            }
            Self::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let factor = multiplier.powi(attempt as i32);
                let millis = (initial.as_millis() as f64 * factor) as u64;
                Duration::from_millis(millis).min(*max)
            }
        }
    }
}

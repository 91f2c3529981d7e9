use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry policy for one ingestion cycle
///
/// A multiplier of 1.0 gives a fixed delay between attempts; anything larger
/// backs off exponentially up to `max_delay_ms`. Unlike a reconnect loop this
/// never retries forever: `max_attempts` of 0 is treated as a single attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per cycle, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt, in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Growth factor applied to the delay after each further failure
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Upper bound for a single delay, in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Same delay between every attempt
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        let delay_ms = delay.as_millis() as u64;
        Self {
            max_attempts,
            initial_delay_ms: delay_ms,
            backoff_multiplier: 1.0,
            max_delay_ms: delay_ms,
        }
    }

    /// Delay doubling (or `multiplier`-ing) after every failure, capped at `max_delay`
    pub fn exponential(
        max_attempts: u32,
        initial_delay: Duration,
        multiplier: f64,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: initial_delay.as_millis() as u64,
            backoff_multiplier: multiplier.max(1.0),
            max_delay_ms: max_delay.as_millis() as u64,
        }
    }

    /// Effective attempt count (at least one)
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether another attempt follows the failed `attempt` (1-based)
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.attempts()
    }

    /// Sleep before the attempt following failed `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let millis = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms.max(self.initial_delay_ms) as f64);
        Duration::from_millis(millis as u64)
    }

    /// Worst-case total sleep across one cycle
    pub fn max_total_delay(&self) -> Duration {
        (1..self.attempts()).map(|attempt| self.delay_for(attempt)).sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

fn default_max_delay() -> u64 {
    2000
}

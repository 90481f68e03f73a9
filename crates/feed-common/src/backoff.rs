//! Exponential backoff with jitter
//!
//! Transient failures are retried by the *caller*, never inside the
//! engagement coordinator: a rejected optimistic mutation rolls back on the
//! first rejection, and any retry policy layers above it using this type.

use rand::Rng;
use std::time::Duration;

/// Backoff policy parameters
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Attempts before giving up
    pub max_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            max_retries: 5,
        }
    }
}

/// Stateful backoff sequence
#[derive(Debug)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Attempts consumed so far
    #[inline]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Next delay, or `None` once retries are exhausted
    ///
    /// Doubles the base each attempt, capped at `max_delay`, with up to 25%
    /// random jitter to spread retry storms.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.config.max_retries {
            return None;
        }

        let exp = self
            .config
            .base_delay
            .saturating_mul(1u32 << self.attempt.min(16));
        let capped = exp.min(self.config.max_delay);

        let jitter_range = capped.as_millis() as u64 / 4;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..=jitter_range)
        } else {
            0
        };

        self.attempt += 1;
        Some(capped + Duration::from_millis(jitter))
    }

    /// Reset after a success
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

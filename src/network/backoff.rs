use std::time::Duration;

use rand::Rng;

use crate::config::ReconnectConfig;

/// Reconnect schedule: exponential growth from `initial`, capped at `max`,
/// plus 0-50% random jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    max_attempts: Option<u32>,
    enabled: bool,
}

impl Backoff {
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self {
            initial: config.initial_delay(),
            max: config.max_delay(),
            max_attempts: config.max_attempts,
            enabled: config.enabled,
        }
    }

    /// `attempt` counts failed connections since the last successful open,
    /// starting at 1.
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.enabled && self.max_attempts.is_none_or(|max| attempt <= max)
    }

    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.initial
            .saturating_mul(2u32.saturating_pow(exp))
            .min(self.max)
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt).as_millis() as u64;
        let jitter = rand::rng().random_range(0..=base / 2);
        Duration::from_millis(base + jitter)
    }
}

//! Poll back-off policy
//!
//! Exponential, capped delay between polls after consecutive failures.

use std::time::Duration;

use convo_common::PollConfig;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    base_delay_ms: u64,
    max_delay_ms: u64,
    /// Fraction of the delay randomly shaved off, in `0.0..=1.0`
    jitter: f64,
}

impl BackoffPolicy {
    pub fn new(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            base_delay_ms: base_delay_ms.max(1),
            max_delay_ms: max_delay_ms.max(base_delay_ms),
            jitter: 0.0,
        }
    }

    /// Policy for a poll config, or `None` when back-off is disabled and a
    /// failed poll simply retries on the next tick.
    pub fn from_config(config: &PollConfig) -> Option<Self> {
        config
            .backoff_enabled
            .then(|| Self::new(config.interval_ms, config.backoff_max_ms).with_jitter(0.2))
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    /// Delay before the next poll after `failures` consecutive failures.
    ///
    /// The first failure waits one base period, so a policy whose base is
    /// the poll interval behaves like plain ticking until failures repeat.
    pub fn delay_for_failures(&self, failures: u32) -> Duration {
        let shift = failures.saturating_sub(1).min(20);
        let multiplier = 1_u64 << shift;
        let bounded = self
            .base_delay_ms
            .saturating_mul(multiplier)
            .min(self.max_delay_ms);

        if self.jitter <= 0.0 {
            return Duration::from_millis(bounded);
        }
        let shaved = rand::thread_rng().gen_range(0.0..=self.jitter);
        let jittered = (bounded as f64 * (1.0 - shaved)) as u64;
        Duration::from_millis(jittered.max(1))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(5_000, 60_000)
    }
}

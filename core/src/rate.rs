//! Politeness delays between tasks.
//!
//! Only active when a base interval is configured, in which case the
//! pipelines also run a single worker so the delays serialize.

use std::time::Duration;

use hostmap_common::config::Config;
use rand::Rng;

const MIN_DELAY_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateController {
    base: Duration,
    jitter_percent: u8,
}

impl RateController {
    pub fn new(base: Duration, jitter_percent: u8) -> Self {
        Self {
            base,
            jitter_percent: jitter_percent.min(100),
        }
    }

    /// `None` unless rate limiting is configured.
    pub fn from_config(cfg: &Config) -> Option<Self> {
        cfg.sleep.map(|base| Self::new(base, cfg.jitter_percent))
    }

    /// With even odds subtracts or adds a uniform random amount of up to
    /// `jitter_percent` of the base interval. Never less than one second.
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let base = self.base.as_secs_f64();
        let max_jitter = base * f64::from(self.jitter_percent) / 100.0;
        let amount = if max_jitter > 0.0 {
            rng.random_range(0.0..=max_jitter)
        } else {
            0.0
        };
        let secs = if rng.random_bool(0.5) {
            base - amount
        } else {
            base + amount
        };
        Duration::from_secs_f64(secs.max(MIN_DELAY_SECS))
    }

    pub async fn delay(&self) {
        let pause = self.next_delay(&mut rand::rng());
        tokio::time::sleep(pause).await;
    }
}

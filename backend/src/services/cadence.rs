//! Adaptive polling cadence for the refresh worker.
//!
//! While the displayed item count keeps changing the worker polls with the
//! short boost interval so a freshly opened guide fills quickly. After the
//! count stayed the same for `threshold` consecutive cycles it relaxes to the
//! steady interval. Any change drops it back into boost mode.

use std::time::Duration;

use crate::config::WorkerSettings;

#[derive(Debug, Clone)]
pub struct RefreshCadence {
    boost_interval: Duration,
    steady_interval: Duration,
    threshold: u32,
    last_count: usize,
    stable_count: u32,
}

impl RefreshCadence {
    pub fn new(boost_interval: Duration, steady_interval: Duration, threshold: u32) -> Self {
        Self {
            boost_interval,
            steady_interval,
            threshold,
            last_count: 0,
            stable_count: 0,
        }
    }

    pub fn from_settings(settings: &WorkerSettings) -> Self {
        Self::new(
            settings.boost_interval(),
            settings.steady_interval(),
            settings.boost_threshold,
        )
    }

    /// Record the item count seen this cycle and return how long to sleep.
    pub fn next_interval(&mut self, item_count: usize) -> Duration {
        if item_count == self.last_count {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.stable_count = 0;
        }
        self.last_count = item_count;
        self.current_interval()
    }

    pub fn current_interval(&self) -> Duration {
        if self.is_boosted() {
            self.boost_interval
        } else {
            self.steady_interval
        }
    }

    pub fn is_boosted(&self) -> bool {
        self.stable_count < self.threshold
    }

    pub fn stable_count(&self) -> u32 {
        self.stable_count
    }
}

impl Default for RefreshCadence {
    fn default() -> Self {
        Self::from_settings(&WorkerSettings::default())
    }
}

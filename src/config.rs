//! Sensor daemon configuration

use devctl_shared::defaults;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the record producer
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Record log to append to
    pub store_path: PathBuf,
    /// Time between records
    pub interval: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(defaults::STORE_PATH),
            interval: Duration::from_secs(defaults::LOG_INTERVAL_SECS),
        }
    }
}

impl ProducerConfig {
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Tick period actually used, never shorter than one second
    pub fn period(&self) -> Duration {
        self.interval.max(Duration::from_secs(1))
    }
}

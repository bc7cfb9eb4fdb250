//! Configuration for the derived-artifact cache

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTL and sweep period of the artifact cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Run the periodic expiry sweep
    #[serde(default = "default_true")]
    pub sweep_enabled: bool,

    /// Entries not read for this long are evicted
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Period of the expiry sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_enabled: default_true(),
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    1800 // 30 minutes
}

fn default_sweep_interval_secs() -> u64 {
    60
}

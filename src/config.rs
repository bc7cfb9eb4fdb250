use crate::cache::CacheConfig;
use crate::error::AppError;
use crate::projection::ProjectionConfig;
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Field registry, datasets and lookback
    #[serde(default)]
    pub search: SearchConfig,

    /// Key aliasing and PII masking of results
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Derived-artifact cache TTL and sweep
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, an optional file and
    /// the environment.
    ///
    /// `path` falls back to `CONFIG_PATH`; a missing file is not an error.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let config_path = path
            .map(str::to_string)
            .or_else(|| std::env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/local.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: APM_QC__)
            .add_source(
                config::Environment::with_prefix("APM_QC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject settings the components cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.search.datasets.is_empty() {
            return Err(AppError::Configuration(
                "at least one dataset must be configured".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for dataset in &self.search.datasets {
            if dataset.index_prefix.trim().is_empty() {
                return Err(AppError::Configuration(format!(
                    "dataset '{}' has an empty index prefix",
                    dataset.name
                )));
            }
            if !names.insert(dataset.name.as_str()) {
                return Err(AppError::Configuration(format!(
                    "dataset '{}' is configured twice",
                    dataset.name
                )));
            }
        }

        if self.search.lookback_days == 0 {
            return Err(AppError::Configuration(
                "search.lookback_days must be positive".to_string(),
            ));
        }
        if self.search.max_partitions == 0 {
            return Err(AppError::Configuration(
                "search.max_partitions must be positive".to_string(),
            ));
        }
        if self.search.lookback_days as usize >= self.search.max_partitions {
            return Err(AppError::Configuration(format!(
                "search.lookback_days ({}) must stay below search.max_partitions ({})",
                self.search.lookback_days, self.search.max_partitions
            )));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::Configuration(
                "cache.ttl_secs must be positive".to_string(),
            ));
        }
        if self.cache.sweep_enabled && self.cache.sweep_interval_secs == 0 {
            return Err(AppError::Configuration(
                "cache.sweep_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

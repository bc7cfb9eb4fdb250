//! Search configuration

use super::fields::FieldSpec;
use super::index::{PartitionGranularity, DEFAULT_MAX_PARTITIONS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Names of the fields every telemetry document carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellKnownFields {
    pub package_name: String,
    pub server_type: String,
    pub timestamp: String,
    /// Numeric field the Y-range filter applies to
    pub value: String,
    pub location: String,
    pub message: String,
    pub document_id: String,
}

impl Default for WellKnownFields {
    fn default() -> Self {
        Self {
            package_name: "package_name".to_string(),
            server_type: "server_type".to_string(),
            timestamp: "timestamp".to_string(),
            value: "duration".to_string(),
            location: "region_code".to_string(),
            message: "message".to_string(),
            document_id: "_id".to_string(),
        }
    }
}

/// One time-partitioned dataset in the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Logical dataset name used by callers
    pub name: String,

    /// Physical index prefix, partitions are `{prefix}-{date}`
    pub index_prefix: String,

    #[serde(default)]
    pub granularity: PartitionGranularity,

    /// First partition that exists; lookbacks never reach past it
    #[serde(default)]
    pub earliest_partition: Option<NaiveDate>,
}

impl DatasetConfig {
    pub fn new(
        name: impl Into<String>,
        index_prefix: impl Into<String>,
        granularity: PartitionGranularity,
    ) -> Self {
        Self {
            name: name.into(),
            index_prefix: index_prefix.into(),
            granularity,
            earliest_partition: None,
        }
    }

    pub fn with_earliest_partition(mut self, date: NaiveDate) -> Self {
        self.earliest_partition = Some(date);
        self
    }
}

/// Search layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Suffix of the non-analyzed sibling of fields marked `raw`
    #[serde(default = "default_raw_suffix")]
    pub raw_suffix: String,

    /// Fields clients may name in a free-form field/value filter
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldSpec>,

    #[serde(default)]
    pub well_known: WellKnownFields,

    #[serde(default = "default_datasets")]
    pub datasets: Vec<DatasetConfig>,

    /// Window searched when a request has no lower time bound
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Most partitions one query may span
    #[serde(default = "default_max_partitions")]
    pub max_partitions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            raw_suffix: default_raw_suffix(),
            fields: default_fields(),
            well_known: WellKnownFields::default(),
            datasets: default_datasets(),
            lookback_days: default_lookback_days(),
            max_partitions: default_max_partitions(),
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn raw_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.raw_suffix = suffix.into();
        self
    }

    pub fn fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.config.fields = fields;
        self
    }

    pub fn well_known(mut self, well_known: WellKnownFields) -> Self {
        self.config.well_known = well_known;
        self
    }

    pub fn datasets(mut self, datasets: Vec<DatasetConfig>) -> Self {
        self.config.datasets = datasets;
        self
    }

    pub fn dataset(mut self, dataset: DatasetConfig) -> Self {
        self.config.datasets.push(dataset);
        self
    }

    pub fn lookback_days(mut self, days: u32) -> Self {
        self.config.lookback_days = days;
        self
    }

    pub fn max_partitions(mut self, max: usize) -> Self {
        self.config.max_partitions = max;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_raw_suffix() -> String {
    ".raw".to_string()
}

fn default_lookback_days() -> u32 {
    30
}

fn default_max_partitions() -> usize {
    DEFAULT_MAX_PARTITIONS
}

fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::raw("url"),
        FieldSpec::raw("page_name"),
        FieldSpec::raw("message"),
        FieldSpec::new("error_type"),
        FieldSpec::new("http_status"),
        FieldSpec::new("method"),
        FieldSpec::new("os"),
        FieldSpec::new("os_version"),
        FieldSpec::new("device_model"),
        FieldSpec::new("app_version"),
        FieldSpec::new("browser"),
        FieldSpec::new("network_type"),
        FieldSpec::new("carrier"),
        FieldSpec::new("user_id"),
        FieldSpec::new("session_id"),
        FieldSpec::new("trace_id"),
        FieldSpec::new("region_code"),
        FieldSpec::new("metric_name"),
    ]
}

fn default_datasets() -> Vec<DatasetConfig> {
    vec![
        DatasetConfig::new("page_load", "apm-page-load", PartitionGranularity::Daily),
        DatasetConfig::new("network", "apm-network", PartitionGranularity::Daily),
        DatasetConfig::new("error", "apm-error", PartitionGranularity::Daily),
        DatasetConfig::new("web_vitals", "apm-web-vitals", PartitionGranularity::Daily),
        DatasetConfig::new("session", "apm-session", PartitionGranularity::Monthly),
    ]
}

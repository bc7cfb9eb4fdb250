//! Resolution of a logical dataset and time window to physical indices

use super::config::{DatasetConfig, SearchConfig};
use super::error::{SearchError, SearchResult};
use crate::clock::Clock;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Width of one physical partition
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PartitionGranularity {
    #[default]
    Daily,
    Monthly,
}

impl PartitionGranularity {
    /// First day of the partition containing `date`
    fn floor(&self, date: NaiveDate) -> NaiveDate {
        match self {
            PartitionGranularity::Daily => date,
            PartitionGranularity::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    fn next(&self, partition: NaiveDate) -> Option<NaiveDate> {
        match self {
            PartitionGranularity::Daily => partition.succ_opt(),
            PartitionGranularity::Monthly => partition.checked_add_months(chrono::Months::new(1)),
        }
    }

    /// Number of partitions from `first` to `last` inclusive
    fn span(&self, first: NaiveDate, last: NaiveDate) -> i64 {
        match self {
            PartitionGranularity::Daily => last.signed_duration_since(first).num_days() + 1,
            PartitionGranularity::Monthly => {
                let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
                months(last) - months(first) + 1
            }
        }
    }

    fn suffix(&self, partition: NaiveDate) -> String {
        match self {
            PartitionGranularity::Daily => partition.format("%Y.%m.%d").to_string(),
            PartitionGranularity::Monthly => partition.format("%Y.%m").to_string(),
        }
    }
}

/// Partition cap used when none is configured
pub const DEFAULT_MAX_PARTITIONS: usize = 400;

/// Maps `(dataset, from, to)` to the ordered list of partitions covering it
#[derive(Debug, Clone)]
pub struct IndexResolver {
    datasets: HashMap<String, DatasetConfig>,
    lookback: Duration,
    max_partitions: usize,
    clock: Arc<dyn Clock>,
}

impl IndexResolver {
    pub fn new(datasets: Vec<DatasetConfig>, lookback_days: u32, clock: Arc<dyn Clock>) -> Self {
        let datasets = datasets
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self {
            datasets,
            lookback: Duration::days(i64::from(lookback_days)),
            max_partitions: DEFAULT_MAX_PARTITIONS,
            clock,
        }
    }

    pub fn from_config(config: &SearchConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.datasets.clone(), config.lookback_days, clock)
            .with_max_partitions(config.max_partitions)
    }

    /// Largest number of partitions a single window may span
    pub fn with_max_partitions(mut self, max_partitions: usize) -> Self {
        self.max_partitions = max_partitions;
        self
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.get(name)
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    /// Physical indices covering `[from, to]`, oldest first. Never empty.
    ///
    /// A missing `to` means now. A missing `from` means `to` minus the
    /// configured lookback, but no earlier than the dataset's first partition.
    /// Reversed bounds are swapped. Windows spanning more than the configured
    /// partition cap are rejected.
    pub fn resolve(
        &self,
        dataset: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> SearchResult<Vec<String>> {
        let config = self
            .datasets
            .get(dataset)
            .ok_or_else(|| SearchError::UnknownDataset(dataset.to_string()))?;
        let granularity = config.granularity;

        let end = to.unwrap_or_else(|| self.clock.now());
        let (start, end) = match from {
            Some(from) if from > end => (end, from),
            Some(from) => (from, end),
            None => {
                let start = end.checked_sub_signed(self.lookback).ok_or_else(|| {
                    SearchError::InvalidTimeRange(format!(
                        "lookback from {} is out of range",
                        end.timestamp_millis()
                    ))
                })?;
                (start, end)
            }
        };

        let end_partition = granularity.floor(end.date_naive());
        let mut start_partition = granularity.floor(start.date_naive());
        if let Some(earliest) = config.earliest_partition {
            start_partition = start_partition.max(granularity.floor(earliest));
        }
        // Whole window predates the dataset: fall back to the partition of `to`.
        if start_partition > end_partition {
            start_partition = end_partition;
        }

        let span = granularity.span(start_partition, end_partition);
        if span > self.max_partitions as i64 {
            return Err(SearchError::WindowTooLarge {
                dataset: dataset.to_string(),
                partitions: span,
                max: self.max_partitions,
            });
        }

        let mut indices = Vec::with_capacity(span.max(0) as usize);
        let mut cursor = Some(start_partition);
        while let Some(partition) = cursor {
            if partition > end_partition {
                break;
            }
            indices.push(format!("{}-{}", config.index_prefix, granularity.suffix(partition)));
            cursor = granularity.next(partition);
        }

        debug!(
            dataset = dataset,
            granularity = %granularity,
            partitions = indices.len(),
            "Resolved target indices"
        );
        Ok(indices)
    }
}

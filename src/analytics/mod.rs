//! Summaries over raw bucketed counts
//!
//! - **Peak series**: unordered `bucket -> count` map to a sorted series plus
//!   its maximum
//! - **Percentile pair**: nearest-rank 5th/95th percentile bounds and the share
//!   of samples inside them
//! - **Rate**: percentage with a zero-denominator guard

mod aggregation;
mod error;
mod statistics;

pub use aggregation::{peak_series, peak_series_from_map, rate, PeakSeries, SeriesPoint};
pub use error::{AnalyticsError, AnalyticsResult};
pub use statistics::{nearest_rank, PercentilePair};

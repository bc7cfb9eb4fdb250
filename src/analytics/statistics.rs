//! Percentile bounds over numeric samples

use super::aggregation::round2;
use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use serde::{Deserialize, Serialize};

/// 5th/95th percentile bounds of a sample and the share of samples inside them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentilePair {
    pub p5: i64,
    pub p95: i64,
    /// Percentage of samples in `[p5, p95]`, two decimals
    pub percent: f64,
}

impl PercentilePair {
    /// Compute from samples already sorted ascending
    pub fn from_sorted(sorted: &[i64]) -> AnalyticsResult<Self> {
        if sorted.is_empty() {
            return Err(AnalyticsError::InsufficientData(
                "Cannot calculate percentiles from empty dataset".to_string(),
            ));
        }
        if !sorted.is_sorted() {
            return Err(AnalyticsError::UnsortedInput);
        }

        let p5 = nearest_rank(sorted, 5);
        let p95 = nearest_rank(sorted, 95);
        let within = sorted.iter().filter(|&&v| v >= p5 && v <= p95).count();

        Ok(Self {
            p5,
            p95,
            percent: round2(within as f64 * 100.0 / sorted.len() as f64),
        })
    }

    /// Sort a copy of `samples` and compute
    pub fn from_samples(samples: &[i64]) -> AnalyticsResult<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        Self::from_sorted(&sorted)
    }
}

/// Nearest-rank percentile: the value at 1-based rank `ceil(p * n / 100)`,
/// clamped to `[1, n]`. `sorted` must be non-empty and ascending.
pub fn nearest_rank(sorted: &[i64], percentile: u32) -> i64 {
    let n = sorted.len();
    let rank = (percentile.min(100) as usize * n).div_ceil(100);
    sorted[rank.clamp(1, n) - 1]
}

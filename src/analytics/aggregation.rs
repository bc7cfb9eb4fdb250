//! Time-bucket series and rate helpers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// One chart point: bucket key (epoch millis or ordinal) and its count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub key: i64,
    pub count: i64,
}

impl From<(i64, i64)> for SeriesPoint {
    fn from((key, count): (i64, i64)) -> Self {
        Self { key, count }
    }
}

/// Chronologically ordered series with its maximum count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakSeries {
    pub points: Vec<SeriesPoint>,
    pub peak: i64,
}

impl PeakSeries {
    pub fn total(&self) -> i64 {
        self.points.iter().map(|p| p.count).sum()
    }

    pub fn counts(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.count).collect()
    }

    pub fn as_pairs(&self) -> Vec<(i64, i64)> {
        self.points.iter().map(|p| (p.key, p.count)).collect()
    }
}

/// Sort raw `bucket key -> count` pairs by numeric key and find the peak.
///
/// Keys that are not integers are skipped with a warning.
pub fn peak_series<K, I>(buckets: I) -> PeakSeries
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, i64)>,
{
    let mut points: Vec<SeriesPoint> = buckets
        .into_iter()
        .filter_map(|(key, count)| match key.as_ref().trim().parse::<i64>() {
            Ok(key) => Some(SeriesPoint { key, count }),
            Err(_) => {
                warn!(bucket = key.as_ref(), "Skipping non-numeric bucket key");
                None
            }
        })
        .collect();
    points.sort_by_key(|p| p.key);

    let peak = points.iter().map(|p| p.count).max().unwrap_or(0);
    PeakSeries { points, peak }
}

/// `peak_series` over a map as returned by a histogram aggregation
pub fn peak_series_from_map(buckets: &HashMap<String, i64>) -> PeakSeries {
    peak_series(buckets.iter().map(|(k, v)| (k.as_str(), *v)))
}

/// `numerator / denominator` as a percentage with two decimals; 0 when the
/// denominator is 0
pub fn rate(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 * 100.0 / denominator as f64)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_series_sorts_numerically() {
        let mut buckets = HashMap::new();
        buckets.insert("10".to_string(), 3);
        buckets.insert("5".to_string(), 7);
        buckets.insert("20".to_string(), 1);

        let series = peak_series_from_map(&buckets);
        assert_eq!(series.as_pairs(), vec![(5, 7), (10, 3), (20, 1)]);
        assert_eq!(series.peak, 7);
        assert_eq!(series.total(), 11);
    }

    #[test]
    fn test_peak_series_skips_bad_keys() {
        let series = peak_series(vec![("1700000000000", 2), ("n/a", 99)]);
        assert_eq!(series.as_pairs(), vec![(1_700_000_000_000, 2)]);
        assert_eq!(series.peak, 2);
    }

    #[test]
    fn test_empty_series() {
        let series = peak_series(Vec::<(String, i64)>::new());
        assert!(series.points.is_empty());
        assert_eq!(series.peak, 0);
    }

    #[test]
    fn test_rate() {
        assert_eq!(rate(1, 3), 33.33);
        assert_eq!(rate(5, 0), 0.0);
        assert_eq!(rate(2, 2), 100.0);
    }
}

//! Prometheus metrics for the query core.
//!
//! # Example
//! ```no_run
//! use apm_query_core::metrics::{init_metrics, gather_text};
//!
//! init_metrics().expect("metrics registered once");
//! println!("{}", gather_text());
//! ```

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

lazy_static! {
    /// Registry for all query-core metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Filter queries composed
    ///
    /// Labels: use_case
    pub static ref QUERIES_COMPOSED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("queries_composed_total", "Total number of composed filter queries")
            .namespace("apm_query_core"),
        &["use_case"]
    ).expect("Failed to create QUERIES_COMPOSED_TOTAL metric");

    /// Typed conversions that fell back to a partial object
    ///
    /// Labels: target
    pub static ref PROJECTION_FALLBACKS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("projection_fallbacks_total", "Typed projections that dropped fields")
            .namespace("apm_query_core"),
        &["target"]
    ).expect("Failed to create PROJECTION_FALLBACKS_TOTAL metric");

    /// Artifact cache lookups
    ///
    /// Labels: cache, outcome (hit, miss)
    pub static ref ARTIFACT_CACHE_LOOKUPS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("artifact_cache_lookups_total", "Artifact cache lookups by outcome")
            .namespace("apm_query_core"),
        &["cache", "outcome"]
    ).expect("Failed to create ARTIFACT_CACHE_LOOKUPS_TOTAL metric");

    /// Failed artifact computations
    ///
    /// Labels: cache
    pub static ref ARTIFACT_COMPUTE_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("artifact_compute_failures_total", "Artifact computations that returned an error")
            .namespace("apm_query_core"),
        &["cache"]
    ).expect("Failed to create ARTIFACT_COMPUTE_FAILURES_TOTAL metric");

    /// Entries removed by the expiry sweep
    ///
    /// Labels: cache
    pub static ref ARTIFACT_EVICTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("artifact_evictions_total", "Artifact cache entries evicted after TTL")
            .namespace("apm_query_core"),
        &["cache"]
    ).expect("Failed to create ARTIFACT_EVICTIONS_TOTAL metric");

    /// Current artifact cache size
    ///
    /// Labels: cache
    pub static ref ARTIFACT_CACHE_ENTRIES: IntGaugeVec = IntGaugeVec::new(
        Opts::new("artifact_cache_entries", "Entries held by the artifact cache")
            .namespace("apm_query_core"),
        &["cache"]
    ).expect("Failed to create ARTIFACT_CACHE_ENTRIES metric");
}

/// Register all metrics with [`PROMETHEUS_REGISTRY`]
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(QUERIES_COMPOSED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PROJECTION_FALLBACKS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ARTIFACT_CACHE_LOOKUPS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ARTIFACT_COMPUTE_FAILURES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ARTIFACT_EVICTIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ARTIFACT_CACHE_ENTRIES.clone()))?;
    Ok(())
}

/// Render the registry in the Prometheus text format
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&PROMETHEUS_REGISTRY.gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

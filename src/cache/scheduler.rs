//! Periodic expiry sweep over registered artifact caches

use super::artifact::{Evictable, SweepReport};
use super::config::CacheConfig;
use super::error::{CacheError, CacheResult};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Background task that calls `evict_expired` on every registered cache at a
/// fixed period. Started and stopped explicitly by the owning process.
pub struct EvictionScheduler {
    interval: Duration,
    targets: Vec<Arc<dyn Evictable>>,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl EvictionScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            targets: Vec::new(),
            shutdown: None,
            handle: None,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.sweep_interval())
    }

    /// Add a cache to sweep. Takes effect on the next `start`.
    pub fn register(&mut self, target: Arc<dyn Evictable>) {
        debug!(cache = target.cache_name(), "Registered cache for eviction");
        self.targets.push(target);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Spawn the sweep task on the current Tokio runtime
    pub fn start(&mut self) -> CacheResult<()> {
        if self.interval.is_zero() {
            return Err(CacheError::InvalidInterval);
        }
        if self.is_running() {
            warn!("Eviction scheduler is already running");
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CacheError::NoRuntime(e.to_string()))?;

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let targets = self.targets.clone();
        let period = self.interval;

        let handle = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sweep_all(&targets);
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Eviction scheduler loop stopped");
        });

        self.shutdown = Some(shutdown_tx);
        self.handle = Some(handle);

        info!(
            interval_secs = period.as_secs_f64(),
            caches = self.targets.len(),
            "Eviction scheduler started"
        );
        Ok(())
    }

    /// Signal the sweep task and wait for it to finish
    pub async fn stop(&mut self) -> CacheResult<()> {
        let Some(handle) = self.handle.take() else {
            warn!("Eviction scheduler is not running");
            return Ok(());
        };

        if let Some(shutdown) = self.shutdown.take() {
            // The receiver is gone if the task already ended.
            let _ = shutdown.send(true);
        }

        handle
            .await
            .map_err(|e| CacheError::ShutdownFailed(e.to_string()))?;

        info!("Eviction scheduler stopped");
        Ok(())
    }
}

impl Drop for EvictionScheduler {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
    }
}

/// Sweep every target once. A panicking sweep is logged and skipped.
pub fn sweep_all(targets: &[Arc<dyn Evictable>]) -> Vec<SweepReport> {
    let mut reports = Vec::with_capacity(targets.len());

    for target in targets {
        match catch_unwind(AssertUnwindSafe(|| target.evict_expired())) {
            Ok(report) => {
                debug!(
                    cache = %report.cache,
                    scanned = report.scanned,
                    evicted = report.evicted,
                    abandoned = report.abandoned,
                    in_flight = report.in_flight,
                    "Eviction sweep completed"
                );
                reports.push(report);
            }
            Err(_) => {
                error!(cache = target.cache_name(), "Eviction sweep panicked, skipping cache");
            }
        }
    }

    reports
}

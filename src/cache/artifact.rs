//! Expiry-based cache for expensive derived artifacts

use crate::clock::Clock;
use crate::metrics::{
    ARTIFACT_CACHE_ENTRIES, ARTIFACT_CACHE_LOOKUPS_TOTAL, ARTIFACT_COMPUTE_FAILURES_TOTAL,
    ARTIFACT_EVICTIONS_TOTAL,
};
use dashmap::DashMap;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// One cache entry. The value cell is filled at most once.
#[derive(Debug)]
struct Slot<V> {
    value: OnceCell<V>,
    last_accessed_ms: AtomicI64,
}

impl<V> Slot<V> {
    fn new(now_ms: i64) -> Self {
        Self {
            value: OnceCell::new(),
            last_accessed_ms: AtomicI64::new(now_ms),
        }
    }

    fn touch(&self, now_ms: i64) {
        self.last_accessed_ms.fetch_max(now_ms, Ordering::Relaxed);
    }

    fn last_accessed(&self) -> i64 {
        self.last_accessed_ms.load(Ordering::Relaxed)
    }

    fn is_computed(&self) -> bool {
        self.value.initialized()
    }

    fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        self.is_computed() && now_ms.saturating_sub(self.last_accessed()) > ttl_ms
    }
}

/// Uncomputed slot that no caller holds. Its computation was cancelled, so
/// nothing will ever fill it. Only meaningful for the map's own handle.
fn is_abandoned<V>(slot: &Arc<Slot<V>>) -> bool {
    !slot.is_computed() && Arc::strong_count(slot) == 1
}

/// Outcome of one expiry sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub cache: String,
    pub scanned: usize,
    pub evicted: usize,
    /// Uncomputed entries removed because their computation was cancelled
    pub abandoned: usize,
    /// Entries skipped because their computation had not finished
    pub in_flight: usize,
    pub remaining: usize,
}

/// Something the eviction scheduler can sweep
pub trait Evictable: Send + Sync {
    fn cache_name(&self) -> &str;

    fn evict_expired(&self) -> SweepReport;
}

/// Concurrent `key -> artifact` cache with last-access expiry.
///
/// Computation is single-flight per key: concurrent callers for the same
/// missing key wait for the first computation instead of repeating it.
/// Failed computations are not cached.
#[derive(Debug)]
pub struct ArtifactCache<V> {
    name: String,
    entries: DashMap<String, Arc<Slot<V>>>,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
}

impl<V> ArtifactCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms.max(0) as u64)
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    fn slot(&self, key: &str) -> Arc<Slot<V>> {
        let now = self.now_ms();
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Slot::new(now)))
            .value()
            .clone()
    }

    /// Cached value for `key`, computing and storing it on a miss.
    ///
    /// A hit refreshes the entry's last-access time. Errors from `compute`
    /// are returned to the caller and leave the key uncached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key);

        if let Some(value) = slot.value.get() {
            slot.touch(self.now_ms());
            ARTIFACT_CACHE_LOOKUPS_TOTAL
                .with_label_values(&[&self.name, "hit"])
                .inc();
            return Ok(value.clone());
        }

        ARTIFACT_CACHE_LOOKUPS_TOTAL
            .with_label_values(&[&self.name, "miss"])
            .inc();

        match slot.value.get_or_try_init(compute).await {
            Ok(value) => {
                slot.touch(self.now_ms());
                self.rehome(key, &slot);
                ARTIFACT_CACHE_ENTRIES
                    .with_label_values(&[&self.name])
                    .set(self.entries.len() as i64);
                Ok(value.clone())
            }
            Err(err) => {
                ARTIFACT_COMPUTE_FAILURES_TOTAL
                    .with_label_values(&[&self.name])
                    .inc();
                // Waiters still queued on this slot retry into it, so it stays.
                self.entries.remove_if(key, |_, s| {
                    Arc::ptr_eq(s, &slot) && !s.is_computed() && Arc::strong_count(s) <= 2
                });
                debug!(cache = %self.name, key = key, "Artifact computation failed, not cached");
                Err(err)
            }
        }
    }

    /// Put a freshly computed slot back under `key` if the map lost it while
    /// the computation ran. An already computed entry is left alone.
    fn rehome(&self, key: &str, slot: &Arc<Slot<V>>) {
        self.entries
            .entry(key.to_string())
            .and_modify(|current| {
                if !current.is_computed() {
                    *current = slot.clone();
                }
            })
            .or_insert_with(|| slot.clone());
    }

    /// Cached value without computing. Refreshes the entry on a hit.
    pub fn get(&self, key: &str) -> Option<V> {
        let slot = self.entries.get(key)?.value().clone();
        let value = slot.value.get()?.clone();
        slot.touch(self.now_ms());
        Some(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|slot| slot.is_computed())
            .unwrap_or(false)
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every computed entry not accessed within the TTL, and every
    /// uncomputed entry whose computation was cancelled.
    ///
    /// Candidates are collected shard by shard, then each is re-checked and
    /// removed individually, so no lock is held across the whole map.
    pub fn evict_expired(&self) -> SweepReport {
        let now = self.now_ms();
        let mut scanned = 0;
        let mut in_flight = 0;
        let mut expired = Vec::new();
        let mut orphans = Vec::new();

        for entry in self.entries.iter() {
            scanned += 1;
            let slot = entry.value();
            if is_abandoned(slot) {
                orphans.push(entry.key().clone());
            } else if !slot.is_computed() {
                in_flight += 1;
            } else if slot.is_expired(now, self.ttl_ms) {
                expired.push(entry.key().clone());
            }
        }

        let mut evicted = 0;
        for key in expired {
            if self
                .entries
                .remove_if(&key, |_, slot| slot.is_expired(now, self.ttl_ms))
                .is_some()
            {
                evicted += 1;
            }
        }

        let mut abandoned = 0;
        for key in orphans {
            if self.entries.remove_if(&key, |_, slot| is_abandoned(slot)).is_some() {
                abandoned += 1;
            }
        }
        if abandoned > 0 {
            debug!(cache = %self.name, abandoned, "Dropped slots of cancelled computations");
        }

        let remaining = self.entries.len();
        ARTIFACT_EVICTIONS_TOTAL
            .with_label_values(&[&self.name])
            .inc_by(evicted as u64);
        ARTIFACT_CACHE_ENTRIES
            .with_label_values(&[&self.name])
            .set(remaining as i64);

        if evicted > 0 {
            info!(cache = %self.name, evicted, remaining, "Evicted expired artifacts");
        }

        SweepReport {
            cache: self.name.clone(),
            scanned,
            evicted,
            abandoned,
            in_flight,
            remaining,
        }
    }
}

impl<V> Evictable for ArtifactCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn cache_name(&self) -> &str {
        self.name()
    }

    fn evict_expired(&self) -> SweepReport {
        ArtifactCache::evict_expired(self)
    }
}

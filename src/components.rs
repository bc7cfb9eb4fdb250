//! Shared component graph built once from [`Config`]
//!
//! The document store and the source-map resolver live outside this crate;
//! embedding services pass them in to get a ready [`TelemetrySearchService`]
//! or [`StackTranslator`] over the shared registries and caches.

use crate::cache::{ArtifactCache, EvictionScheduler};
use crate::clock::Clock;
use crate::config::Config;
use crate::projection::{KeyAliasTable, PiiMasker, ResultProjector};
use crate::search::{FieldRegistry, IndexResolver, QueryComposer};
use crate::service::{DocumentStore, TelemetrySearchService};
use crate::symbolize::{SourceMapResolver, StackTranslator, TranslatedStack};
use std::sync::Arc;
use tracing::info;

/// Name of the cache holding translated stacks
pub const STACKS_CACHE: &str = "stacks";

#[derive(Clone)]
pub struct Components {
    pub registry: Arc<FieldRegistry>,
    pub composer: QueryComposer,
    pub resolver: Arc<IndexResolver>,
    pub projector: Arc<ResultProjector>,
    pub stacks: Arc<ArtifactCache<TranslatedStack>>,
}

impl Components {
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let registry = Arc::new(FieldRegistry::from_config(&config.search));
        let composer = QueryComposer::new(registry.clone());
        let resolver = Arc::new(IndexResolver::from_config(&config.search, clock.clone()));

        let masker = PiiMasker::from_config(&config.projection);
        let projector = Arc::new(ResultProjector::new(
            Arc::new(KeyAliasTable::telemetry_schema()),
            masker,
        ));

        let stacks = Arc::new(ArtifactCache::new(STACKS_CACHE, config.cache.ttl(), clock));

        info!(
            fields = registry.len(),
            datasets = config.search.datasets.len(),
            lookback_days = config.search.lookback_days,
            max_partitions = config.search.max_partitions,
            masking_enabled = projector.masker().is_enabled(),
            aliases = projector.aliases().len(),
            cache_ttl_secs = config.cache.ttl_secs,
            "Components configured"
        );

        Self {
            registry,
            composer,
            resolver,
            projector,
            stacks,
        }
    }

    /// Scheduler sweeping every cache owned by these components. Not started.
    pub fn scheduler(&self, config: &Config) -> EvictionScheduler {
        let mut scheduler = EvictionScheduler::from_config(&config.cache);
        scheduler.register(self.stacks.clone());
        scheduler
    }

    pub fn search_service(&self, store: Arc<dyn DocumentStore>) -> TelemetrySearchService {
        TelemetrySearchService::new(
            store,
            self.composer.clone(),
            self.resolver.clone(),
            self.projector.clone(),
        )
    }

    /// Translator writing into the shared stacks cache
    pub fn translator(&self, resolver: Arc<dyn SourceMapResolver>) -> StackTranslator {
        StackTranslator::new(resolver, self.stacks.clone())
    }
}

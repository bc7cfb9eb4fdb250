//! List, detail and chart operations over the document store

use super::request::{ChartRequest, DetailRequest, ListRequest};
use super::store::{DocumentStore, Page};
use crate::analytics::{peak_series_from_map, PeakSeries, PercentilePair};
use crate::error::{AppError, Result};
use crate::projection::{ProjectedDoc, ResultProjector};
use crate::search::{IndexResolver, QueryComposer, TimeRange, UseCase};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Pagination information for responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageInfo {
    pub fn new(page: u32, page_size: u32, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(page_size.max(1)));
        Self {
            page,
            page_size,
            total_count,
            total_pages,
            has_next_page: u64::from(page) + 1 < total_pages,
            has_previous_page: page > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub indices: Vec<String>,
    pub documents: Vec<ProjectedDoc>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResponse {
    pub series: PeakSeries,
    /// 5th/95th percentile of bucket counts; `None` with no buckets
    pub bounds: Option<PercentilePair>,
}

/// Request-level facade over composition, index resolution, the store and
/// result projection
pub struct TelemetrySearchService {
    store: Arc<dyn DocumentStore>,
    composer: QueryComposer,
    resolver: Arc<IndexResolver>,
    projector: Arc<ResultProjector>,
}

impl TelemetrySearchService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        composer: QueryComposer,
        resolver: Arc<IndexResolver>,
        projector: Arc<ResultProjector>,
    ) -> Self {
        Self {
            store,
            composer,
            resolver,
            projector,
        }
    }

    fn indices(&self, dataset: &str, time: &TimeRange) -> Result<Vec<String>> {
        Ok(self
            .resolver
            .resolve(dataset, time.from_utc(), time.to_utc())?)
    }

    #[instrument(skip(self, request), fields(dataset = %request.dataset))]
    pub async fn list(&self, request: &ListRequest) -> Result<ListResponse> {
        request.validate()?;

        let query = self.composer.compose(UseCase::List, &request.conditions())?;
        let indices = self.indices(&request.dataset, &request.filters.time)?;
        let page = Page::from(request.pagination);

        let result = self.store.search(&indices, &query, &page).await?;
        let documents: Vec<ProjectedDoc> = result
            .hits
            .iter()
            .map(|hit| self.projector.project_hit(&hit.id, &hit.source))
            .collect();

        debug!(
            partitions = indices.len(),
            hits = documents.len(),
            total = result.total,
            "Listed documents"
        );

        Ok(ListResponse {
            indices,
            documents,
            page_info: PageInfo::new(page.page, page.page_size, result.total),
        })
    }

    #[instrument(skip(self, request), fields(dataset = %request.dataset, id = %request.id))]
    pub async fn detail(&self, request: &DetailRequest) -> Result<ProjectedDoc> {
        request.validate()?;

        let query = self.composer.compose(UseCase::Detail, &request.conditions())?;
        let indices = self.indices(&request.dataset, &request.time)?;

        let result = self.store.search(&indices, &query, &Page::first()).await?;
        let hit = result.hits.first().ok_or_else(|| {
            AppError::NotFound(format!("{} document {}", request.dataset, request.id))
        })?;

        Ok(self.projector.project_hit(&hit.id, &hit.source))
    }

    #[instrument(skip(self, request), fields(dataset = %request.dataset))]
    pub async fn chart(&self, request: &ChartRequest) -> Result<ChartResponse> {
        request.validate()?;

        let query = self.composer.compose(UseCase::Chart, &request.conditions())?;
        let indices = self.indices(&request.dataset, &request.filters.time)?;

        let buckets = self
            .store
            .histogram(&indices, &query, request.interval())
            .await?;
        let series = peak_series_from_map(&buckets);
        let bounds = if series.points.is_empty() {
            None
        } else {
            Some(PercentilePair::from_samples(&series.counts())?)
        };

        info!(
            buckets = series.points.len(),
            peak = series.peak,
            total = series.total(),
            "Built chart series"
        );

        Ok(ChartResponse { series, bounds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info() {
        let info = PageInfo::new(0, 20, 41);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);

        let last = PageInfo::new(2, 20, 41);
        assert!(!last.has_next_page);
        assert!(last.has_previous_page);

        assert_eq!(PageInfo::new(0, 20, 0).total_pages, 0);
    }
}

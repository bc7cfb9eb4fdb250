//! Document store seam

use crate::error::Result;
use crate::projection::RawDocument;
use crate::search::{BoolQuery, SortOrder};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Offset window and sort for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 0-indexed
    pub page: u32,
    pub page_size: u32,
    pub sort: SortOrder,
}

impl Page {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            sort: SortOrder::default(),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Single-hit window used by detail lookups
    pub fn first() -> Self {
        Self::new(0, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreHit {
    pub id: String,
    pub source: RawDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total matches across all pages
    pub total: u64,
    pub hits: Vec<StoreHit>,
}

/// Time-partitioned document store.
///
/// Implementations report transport and backend failures as
/// [`AppError::Store`](crate::AppError::Store). Indices that do not exist are
/// not an error and contribute no hits.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn search(&self, indices: &[String], query: &BoolQuery, page: &Page) -> Result<SearchPage>;

    /// Date histogram over the timestamp field. Keys are the bucket start in
    /// epoch milliseconds, as strings.
    async fn histogram(
        &self,
        indices: &[String],
        query: &BoolQuery,
        interval: Duration,
    ) -> Result<HashMap<String, i64>>;
}

//! Inbound request models

use crate::search::{
    AppIdentity, DocumentId, FieldValueFilter, FreeTextFilter, GeoFilter, SearchCondition,
    SortOrder, TimeRange, ValueRange,
};
use crate::service::store::Page;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

fn default_page_size() -> u32 {
    20
}

fn default_interval_ms() -> u64 {
    60_000
}

/// Optional filter dimensions shared by list and chart requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub time: TimeRange,
    #[serde(default)]
    pub value: ValueRange,
    #[serde(default)]
    pub location_code: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub field_value: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Filters {
    fn conditions(&self, app: &AppIdentity) -> Vec<SearchCondition> {
        vec![
            app.clone().into(),
            self.time.into(),
            self.value.into(),
            GeoFilter {
                location_code: self.location_code.clone(),
            }
            .into(),
            FieldValueFilter {
                field_name: self.field_name.clone(),
                field_value: self.field_value.clone(),
            }
            .into(),
            FreeTextFilter {
                text: self.text.clone(),
            }
            .into(),
        ]
    }
}

/// Pagination input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Pagination {
    /// 0-indexed
    #[serde(default)]
    pub page: u32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,

    #[serde(default)]
    pub sort: SortOrder,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: default_page_size(),
            sort: SortOrder::default(),
        }
    }
}

impl From<Pagination> for Page {
    fn from(p: Pagination) -> Self {
        Page {
            page: p.page,
            page_size: p.page_size,
            sort: p.sort,
        }
    }
}

/// Paged document listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ListRequest {
    #[validate(length(min = 1))]
    pub dataset: String,

    #[validate(nested)]
    pub app: AppIdentity,

    #[serde(flatten)]
    pub filters: Filters,

    #[serde(default)]
    #[validate(nested)]
    pub pagination: Pagination,
}

impl ListRequest {
    pub fn new(dataset: impl Into<String>, app: AppIdentity) -> Self {
        Self {
            dataset: dataset.into(),
            app,
            filters: Filters::default(),
            pagination: Pagination::default(),
        }
    }

    pub fn conditions(&self) -> Vec<SearchCondition> {
        self.filters.conditions(&self.app)
    }
}

/// Single document by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DetailRequest {
    #[validate(length(min = 1))]
    pub dataset: String,

    #[validate(nested)]
    pub app: AppIdentity,

    #[validate(length(min = 1))]
    pub id: String,

    /// Narrows the partitions searched; the default lookback applies otherwise
    #[serde(default)]
    pub time: TimeRange,
}

impl DetailRequest {
    pub fn new(dataset: impl Into<String>, app: AppIdentity, id: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            app,
            id: id.into(),
            time: TimeRange::default(),
        }
    }

    pub fn conditions(&self) -> Vec<SearchCondition> {
        vec![self.app.clone().into(), DocumentId::new(self.id.as_str()).into()]
    }
}

/// Time-bucketed counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChartRequest {
    #[validate(length(min = 1))]
    pub dataset: String,

    #[validate(nested)]
    pub app: AppIdentity,

    #[serde(flatten)]
    pub filters: Filters,

    /// Bucket width
    #[serde(default = "default_interval_ms")]
    #[validate(range(min = 1000))]
    pub interval_ms: u64,
}

impl ChartRequest {
    pub fn new(dataset: impl Into<String>, app: AppIdentity) -> Self {
        Self {
            dataset: dataset.into(),
            app,
            filters: Filters::default(),
            interval_ms: default_interval_ms(),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn conditions(&self) -> Vec<SearchCondition> {
        self.filters.conditions(&self.app)
    }
}

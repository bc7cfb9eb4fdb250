//! Shared fixtures for integration tests

#![allow(dead_code)]

use apm_query_core::clock::ManualClock;
use apm_query_core::projection::RawDocument;
use apm_query_core::search::BoolQuery;
use apm_query_core::service::{DocumentStore, Page, SearchPage, StoreHit};
use apm_query_core::{AppError, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Manual clock fixed at 2024-05-15T12:00:00Z
pub fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap(),
    ))
}

pub fn raw(value: Value) -> RawDocument {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// A store call as seen by [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub indices: Vec<String>,
    pub query: BoolQuery,
    pub page: Option<Page>,
    pub interval: Option<Duration>,
}

/// Canned-response store that records every call
#[derive(Default)]
pub struct MemoryStore {
    pub hits: Vec<StoreHit>,
    pub total: Option<u64>,
    pub buckets: HashMap<String, i64>,
    pub fail_with: Option<String>,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl MemoryStore {
    pub fn with_hits(hits: Vec<StoreHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    pub fn with_buckets(buckets: &[(&str, i64)]) -> Self {
        Self {
            buckets: buckets.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Default::default()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls.lock().last().cloned().expect("store was not called")
    }

    fn check(&self) -> Result<()> {
        match &self.fail_with {
            Some(reason) => Err(AppError::Store(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn search(&self, indices: &[String], query: &BoolQuery, page: &Page) -> Result<SearchPage> {
        self.calls.lock().push(RecordedCall {
            indices: indices.to_vec(),
            query: query.clone(),
            page: Some(*page),
            interval: None,
        });
        self.check()?;

        let hits: Vec<StoreHit> = self
            .hits
            .iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect();
        Ok(SearchPage {
            total: self.total.unwrap_or(self.hits.len() as u64),
            hits,
        })
    }

    async fn histogram(
        &self,
        indices: &[String],
        query: &BoolQuery,
        interval: Duration,
    ) -> Result<HashMap<String, i64>> {
        self.calls.lock().push(RecordedCall {
            indices: indices.to_vec(),
            query: query.clone(),
            page: None,
            interval: Some(interval),
        });
        self.check()?;
        Ok(self.buckets.clone())
    }
}

//! Combines search conditions into one filter query per use case

use super::condition::{Dimension, SearchCondition};
use super::error::{SearchError, SearchResult};
use super::fields::FieldRegistry;
use super::query::{BoolQuery, QueryBuilder};
use crate::metrics::QUERIES_COMPOSED_TOTAL;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Console views that issue searches
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UseCase {
    /// Paged document listing
    List,
    /// Single document by id
    Detail,
    /// Time-bucketed counts
    Chart,
}

impl UseCase {
    /// Whether conditions of `dimension` take part in this use case
    pub fn accepts(&self, dimension: Dimension) -> bool {
        match self {
            UseCase::List => !matches!(dimension, Dimension::Document),
            UseCase::Detail => matches!(dimension, Dimension::App | Dimension::Document),
            UseCase::Chart => !matches!(dimension, Dimension::Document | Dimension::FreeText),
        }
    }
}

/// Stateless query composer over a shared field registry
#[derive(Debug, Clone)]
pub struct QueryComposer {
    registry: Arc<FieldRegistry>,
}

impl QueryComposer {
    pub fn new(registry: Arc<FieldRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Build the filter query for `use_case` from `conditions`.
    ///
    /// Every use case needs an application identity. Conditions the use case
    /// does not take are skipped. The same set of conditions always yields
    /// the same query, whatever order it is passed in.
    pub fn compose(&self, use_case: UseCase, conditions: &[SearchCondition]) -> SearchResult<BoolQuery> {
        if !conditions
            .iter()
            .any(|c| matches!(c, SearchCondition::App(_)))
        {
            return Err(SearchError::MissingAppIdentity(use_case.to_string()));
        }

        let mut builder = QueryBuilder::new();
        for condition in conditions {
            let dimension = condition.dimension();
            if !use_case.accepts(dimension) {
                debug!(use_case = %use_case, dimension = %dimension, "Skipping condition");
                continue;
            }
            condition.contribute(&mut builder, &self.registry)?;
        }

        let query = builder.build();
        QUERIES_COMPOSED_TOTAL
            .with_label_values(&[&use_case.to_string()])
            .inc();
        debug!(
            use_case = %use_case,
            clauses = query.filter().len(),
            "Composed filter query"
        );
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::condition::*;
    use crate::search::query::Clause;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn composer() -> QueryComposer {
        QueryComposer::new(Arc::new(FieldRegistry::default()))
    }

    fn app() -> SearchCondition {
        AppIdentity::new("com.shop", "ios").into()
    }

    #[test]
    fn test_missing_app_identity() {
        let err = composer()
            .compose(UseCase::List, &[GeoFilter::new("US").into()])
            .unwrap_err();
        assert!(matches!(err, SearchError::MissingAppIdentity(ref u) if u == "list"));
    }

    #[test]
    fn test_detail_ignores_list_filters() {
        let query = composer()
            .compose(
                UseCase::Detail,
                &[
                    app(),
                    DocumentId::new("evt-1").into(),
                    GeoFilter::new("US").into(),
                ],
            )
            .unwrap();

        assert_eq!(query.filter().len(), 3);
        assert!(query.filter().contains(&Clause::term("_id", "evt-1")));
        assert!(!query.filter().iter().any(|c| c.field() == "region_code"));
    }

    #[test]
    fn test_list_combines_all_dimensions() {
        let query = composer()
            .compose(
                UseCase::List,
                &[
                    app(),
                    TimeRange::new(Some(0), Some(10)).into(),
                    ValueRange::new(Some(1), Some(2)).into(),
                    GeoFilter::new("US").into(),
                    FieldValueFilter::new("os", "ios").into(),
                    FreeTextFilter::new("boom").into(),
                ],
            )
            .unwrap();
        assert_eq!(query.filter().len(), 7);
    }

    #[test]
    fn test_every_use_case_accepts_app() {
        for use_case in [UseCase::List, UseCase::Detail, UseCase::Chart] {
            assert!(use_case.accepts(Dimension::App));
        }
        assert!(Dimension::iter().filter(|d| UseCase::Detail.accepts(*d)).count() == 2);
    }

    #[test]
    fn test_use_case_from_str() {
        assert_eq!(UseCase::from_str("chart").unwrap(), UseCase::Chart);
        assert!(UseCase::from_str("export").is_err());
    }
}

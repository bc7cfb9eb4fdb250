//! Filter composition over a time-partitioned document store
//!
//! This module turns the optional filter dimensions of a console request into
//! one injection-safe, conjunctive filter query, and picks the physical
//! partitions the query should run against:
//!
//! - **Field Registry**: whitelist of filterable fields and their raw variants
//! - **Conditions**: one primitive per filter dimension, absent means no clause
//! - **Composer**: per use case combination into a [`BoolQuery`]
//! - **Index Resolver**: dataset + time window to partition names
//!
//! # Example
//!
//! ```
//! use apm_query_core::search::{
//!     AppIdentity, FieldRegistry, FieldValueFilter, QueryComposer, TimeRange, UseCase,
//! };
//! use std::sync::Arc;
//!
//! let composer = QueryComposer::new(Arc::new(FieldRegistry::default()));
//! let query = composer
//!     .compose(
//!         UseCase::List,
//!         &[
//!             AppIdentity::new("com.shop", "android").into(),
//!             TimeRange::new(Some(1_700_000_000_000), None).into(),
//!             FieldValueFilter::new("url", "https://shop.example/").into(),
//!         ],
//!     )
//!     .unwrap();
//!
//! assert_eq!(query.filter().len(), 4);
//! ```

mod composer;
mod condition;
mod config;
mod error;
mod fields;
mod index;
mod query;

pub use composer::{QueryComposer, UseCase};
pub use condition::{
    AppIdentity, Dimension, DocumentId, FieldValueFilter, FreeTextFilter, GeoFilter,
    SearchCondition, TimeRange, ValueRange,
};
pub use config::{DatasetConfig, SearchConfig, SearchConfigBuilder, WellKnownFields};
pub use error::{SearchError, SearchResult};
pub use fields::{FieldRegistry, FieldSpec};
pub use index::{IndexResolver, PartitionGranularity};
pub use query::{BoolQuery, Clause, QueryBuilder, SortOrder};

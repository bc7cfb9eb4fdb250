//! Console search operations
//!
//! [`TelemetrySearchService`] validates a request, composes its filter query,
//! resolves the partitions to search, calls the [`DocumentStore`] and projects
//! the hits.

mod request;
mod store;
mod telemetry;

pub use request::{ChartRequest, DetailRequest, Filters, ListRequest, Pagination};
pub use store::{DocumentStore, Page, SearchPage, StoreHit};
pub use telemetry::{ChartResponse, ListResponse, PageInfo, TelemetrySearchService};

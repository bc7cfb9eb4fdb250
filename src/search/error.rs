//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while composing a search
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A free-form filter named a field outside the registry
    #[error("Field '{0}' is not a queryable field")]
    InvalidField(String),

    /// Dataset name with no partition layout configured
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// Time bound the partition calendar cannot represent
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    /// Window spanning more partitions than a single query may fan out to
    #[error("Time window for {dataset} spans {partitions} partitions, at most {max} allowed")]
    WindowTooLarge {
        dataset: String,
        partitions: i64,
        max: usize,
    },

    /// Query without the tenant/application scope
    #[error("Application identity is required for {0} queries")]
    MissingAppIdentity(String),

    /// Malformed condition input
    #[error("Invalid condition: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl SearchError {
    /// Stable kind label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::InvalidField(_) => "invalid-field",
            SearchError::UnknownDataset(_) => "unknown-dataset",
            SearchError::InvalidTimeRange(_) => "invalid-time-range",
            SearchError::WindowTooLarge { .. } => "window-too-large",
            SearchError::MissingAppIdentity(_) => "missing-app-identity",
            SearchError::Validation(_) => "invalid-condition",
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidField(field) => AppError::InvalidField(field),
            SearchError::UnknownDataset(_) => AppError::Configuration(err.to_string()),
            SearchError::InvalidTimeRange(_)
            | SearchError::WindowTooLarge { .. }
            | SearchError::MissingAppIdentity(_)
            | SearchError::Validation(_) => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

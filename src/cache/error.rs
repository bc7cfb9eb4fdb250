//! Error types for the artifact cache scheduler

use crate::error::AppError;

/// Result type for cache scheduler operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors starting or stopping the eviction scheduler
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Sweep period of zero
    #[error("Sweep interval must be greater than zero")]
    InvalidInterval,

    /// `start` called outside a Tokio runtime
    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    /// The sweep task did not finish cleanly
    #[error("Failed to stop eviction scheduler: {0}")]
    ShutdownFailed(String),
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::InvalidInterval => AppError::Configuration(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

//! Error types for analytics operations

use crate::error::AppError;

/// Result type for analytics operations
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur in analytics operations
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Insufficient data for analysis
    #[error("Insufficient data for analysis: {0}")]
    InsufficientData(String),

    /// Samples passed as sorted were not
    #[error("Samples must be sorted ascending")]
    UnsortedInput,
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        AppError::Internal(err.to_string())
    }
}

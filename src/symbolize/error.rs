//! Error types for stack symbolication

use crate::error::AppError;

pub type SymbolizeResult<T> = std::result::Result<T, SymbolizeError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SymbolizeError {
    /// The source map for a release could not be fetched or parsed
    #[error("Source map unavailable for {package}@{release}: {reason}")]
    SourceMapUnavailable {
        package: String,
        release: String,
        reason: String,
    },

    #[error("Invalid symbolication request: {0}")]
    InvalidRequest(String),
}

impl From<SymbolizeError> for AppError {
    fn from(err: SymbolizeError) -> Self {
        match err {
            SymbolizeError::InvalidRequest(msg) => AppError::Validation(msg),
            other => AppError::Artifact(other.to_string()),
        }
    }
}

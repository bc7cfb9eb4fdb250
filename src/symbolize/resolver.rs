//! Source map lookup seam

use super::error::SymbolizeResult;
use super::frame::StackFrame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Original source location for a minified position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalPosition {
    pub source: String,
    pub line: u32,
    pub column: u32,
    pub name: Option<String>,
}

/// Maps minified frames back to original sources for one release.
///
/// `Ok(None)` means the frame is not covered by the release's maps and is
/// left as-is. `Err` means the maps themselves could not be loaded.
#[async_trait]
pub trait SourceMapResolver: Send + Sync {
    async fn resolve(
        &self,
        package: &str,
        release: &str,
        frame: &StackFrame,
    ) -> SymbolizeResult<Option<OriginalPosition>>;
}

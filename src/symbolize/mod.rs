//! Minified JavaScript stack symbolication
//!
//! Error documents carry minified stacks. [`StackTranslator`] parses each
//! line, maps frames through a [`SourceMapResolver`] and keeps the result in
//! an [`ArtifactCache`](crate::cache::ArtifactCache) keyed by a digest of
//! `(package, release, stack)`.

mod error;
mod frame;
mod resolver;
mod translator;

pub use error::{SymbolizeError, SymbolizeResult};
pub use frame::{parse_stack, StackFrame, StackLine};
pub use resolver::{OriginalPosition, SourceMapResolver};
pub use translator::{artifact_key, StackTranslator, TranslatedFrame, TranslatedStack};

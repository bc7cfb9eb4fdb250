//! Cached stack translation

use super::error::{SymbolizeError, SymbolizeResult};
use super::frame::{parse_stack, StackFrame, StackLine};
use super::resolver::{OriginalPosition, SourceMapResolver};
use crate::cache::ArtifactCache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A stack line after translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranslatedFrame {
    Resolved {
        minified: StackFrame,
        original: OriginalPosition,
    },
    /// Frame the source maps do not cover
    Unresolved { minified: StackFrame },
    Text { line: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedStack {
    pub frames: Vec<TranslatedFrame>,
}

impl TranslatedStack {
    pub fn resolved_count(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| matches!(f, TranslatedFrame::Resolved { .. }))
            .count()
    }
}

impl fmt::Display for TranslatedStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match frame {
                TranslatedFrame::Resolved { original, .. } => write!(
                    f,
                    "    at {} ({}:{}:{})",
                    original.name.as_deref().unwrap_or("<anonymous>"),
                    original.source,
                    original.line,
                    original.column
                )?,
                TranslatedFrame::Unresolved { minified } => write!(
                    f,
                    "    at {} ({}:{}:{})",
                    minified.function.as_deref().unwrap_or("<anonymous>"),
                    minified.file,
                    minified.line,
                    minified.column
                )?,
                TranslatedFrame::Text { line } => write!(f, "{}", line)?,
            }
        }
        Ok(())
    }
}

/// Cache key for a translation: hex SHA-256 over the NUL-joined inputs
pub fn artifact_key(package: &str, release: &str, stack: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(package.as_bytes());
    hasher.update([0u8]);
    hasher.update(release.as_bytes());
    hasher.update([0u8]);
    hasher.update(stack.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Translates minified stacks, computing each distinct stack once
pub struct StackTranslator {
    resolver: Arc<dyn SourceMapResolver>,
    cache: Arc<ArtifactCache<TranslatedStack>>,
}

impl StackTranslator {
    pub fn new(
        resolver: Arc<dyn SourceMapResolver>,
        cache: Arc<ArtifactCache<TranslatedStack>>,
    ) -> Self {
        Self { resolver, cache }
    }

    pub fn cache(&self) -> &Arc<ArtifactCache<TranslatedStack>> {
        &self.cache
    }

    #[instrument(skip(self, stack), fields(stack_len = stack.len()))]
    pub async fn translate(
        &self,
        package: &str,
        release: &str,
        stack: &str,
    ) -> SymbolizeResult<TranslatedStack> {
        if package.trim().is_empty() || release.trim().is_empty() {
            return Err(SymbolizeError::InvalidRequest(
                "package and release are required".to_string(),
            ));
        }

        let key = artifact_key(package, release, stack);
        self.cache
            .get_or_compute(&key, || self.compute(package, release, stack))
            .await
    }

    async fn compute(
        &self,
        package: &str,
        release: &str,
        stack: &str,
    ) -> SymbolizeResult<TranslatedStack> {
        let mut frames = Vec::new();
        for line in parse_stack(stack) {
            let translated = match line {
                StackLine::Text(line) => TranslatedFrame::Text { line },
                StackLine::Frame(minified) => {
                    match self.resolver.resolve(package, release, &minified).await? {
                        Some(original) => TranslatedFrame::Resolved { minified, original },
                        None => TranslatedFrame::Unresolved { minified },
                    }
                }
            };
            frames.push(translated);
        }

        let stack = TranslatedStack { frames };
        debug!(
            package = package,
            release = release,
            frames = stack.frames.len(),
            resolved = stack.resolved_count(),
            "Translated stack"
        );
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use async_trait::async_trait;
    use std::time::Duration;

    struct PrefixResolver;

    #[async_trait]
    impl SourceMapResolver for PrefixResolver {
        async fn resolve(
            &self,
            _package: &str,
            release: &str,
            frame: &StackFrame,
        ) -> SymbolizeResult<Option<OriginalPosition>> {
            if release == "broken" {
                return Err(SymbolizeError::SourceMapUnavailable {
                    package: "shop".to_string(),
                    release: release.to_string(),
                    reason: "404".to_string(),
                });
            }
            if !frame.file.ends_with(".min.js") {
                return Ok(None);
            }
            Ok(Some(OriginalPosition {
                source: "src/cart.ts".to_string(),
                line: frame.column / 100,
                column: 4,
                name: Some("addToCart".to_string()),
            }))
        }
    }

    fn translator() -> StackTranslator {
        StackTranslator::new(
            Arc::new(PrefixResolver),
            Arc::new(ArtifactCache::new(
                "stacks",
                Duration::from_secs(60),
                Arc::new(SystemClock),
            )),
        )
    }

    const STACK: &str = "TypeError: boom\n    at a (https://cdn/app.min.js:1:1200)\n    at https://cdn/vendor.js:9:9";

    #[test]
    fn test_artifact_key_separates_inputs() {
        assert_ne!(artifact_key("ab", "c", "s"), artifact_key("a", "bc", "s"));
        assert_eq!(artifact_key("a", "b", "s").len(), 64);
    }

    #[tokio::test]
    async fn test_translate_mixes_resolved_and_passthrough() {
        let translated = translator().translate("shop", "1.2.0", STACK).await.unwrap();
        assert_eq!(translated.frames.len(), 3);
        assert_eq!(translated.resolved_count(), 1);
        assert!(matches!(&translated.frames[2], TranslatedFrame::Unresolved { .. }));

        let rendered = translated.to_string();
        assert!(rendered.contains("addToCart (src/cart.ts:12:4)"));
        assert!(rendered.starts_with("TypeError: boom"));
    }

    #[tokio::test]
    async fn test_resolver_failure_propagates_and_is_not_cached() {
        let translator = translator();
        let err = translator.translate("shop", "broken", STACK).await.unwrap_err();
        assert!(matches!(err, SymbolizeError::SourceMapUnavailable { .. }));
        assert!(translator.cache().is_empty());
    }

    #[test]
    fn test_blank_release_rejected() {
        let err = tokio_test::block_on(translator().translate("shop", " ", STACK)).unwrap_err();
        assert!(matches!(err, SymbolizeError::InvalidRequest(_)));
    }
}

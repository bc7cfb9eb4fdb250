//! Derived-artifact cache and its eviction scheduler
//!
//! Some results are expensive to derive and immutable once derived, such as a
//! stack trace translated through source maps. [`ArtifactCache`] keeps them
//! keyed by input, refreshes an entry on every read, and drops entries that
//! have not been read for a TTL when [`EvictionScheduler`] sweeps.
//!
//! # Example
//!
//! ```no_run
//! use apm_query_core::cache::{ArtifactCache, EvictionScheduler};
//! use apm_query_core::clock::SystemClock;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = Arc::new(ArtifactCache::<String>::new(
//!         "stacks",
//!         Duration::from_secs(1800),
//!         Arc::new(SystemClock),
//!     ));
//!
//!     let mut scheduler = EvictionScheduler::new(Duration::from_secs(60));
//!     scheduler.register(cache.clone());
//!     scheduler.start()?;
//!
//!     let value = cache
//!         .get_or_compute("key", || async { Ok::<_, std::io::Error>("derived".to_string()) })
//!         .await?;
//!     println!("{value}");
//!
//!     scheduler.stop().await?;
//!     Ok(())
//! }
//! ```

mod artifact;
mod config;
mod error;
mod scheduler;

pub use artifact::{ArtifactCache, Evictable, SweepReport};
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use scheduler::{sweep_all, EvictionScheduler};

//! Result projection: schema key translation and PII masking
//!
//! Raw documents come back from the store with keys from whichever agent
//! schema wrote them. The projector rewrites every key to its canonical name
//! through a [`KeyAliasTable`] and then masks configured identity fields with a
//! [`PiiMasker`]. Typed conversion is lenient: a field that fails to convert is
//! dropped instead of failing the whole result set.

mod alias;
mod config;
mod mask;
mod projector;

pub use alias::KeyAliasTable;
pub use config::ProjectionConfig;
pub use mask::{mask_user_id, PiiMasker};
pub use projector::{lenient_convert, ProjectedDoc, RawDocument, ResultProjector};

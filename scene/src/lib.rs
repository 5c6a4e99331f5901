//! Scene Store
//!
//! Holds the parsed entity graph (hierarchy + component data) for one
//! scene file and provides typed, schema-checked access. Loading builds a
//! fresh, fully-validated store or fails atomically; reload is
//! load-into-a-new-instance, never in-place patching. The serializer
//! round-trips store contents to the on-disk TOML format with
//! byte-stable idempotent saves.

mod doc;
mod entity;
mod error;
mod save;
mod store;

pub use doc::*;
pub use entity::*;
pub use error::*;
pub use save::*;
pub use store::*;

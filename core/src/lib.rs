//! Diorama Core Types
//!
//! Foundational types shared across the diorama workspace:
//! - `EntityId`, the stable per-scene entity identifier
//! - `FieldValue`, the tagged union over the schema-declared value kinds
//! - `Vec3`, the 3-component float vector
//! - Ordered map aliases for component data

mod id;
mod value;

pub use id::*;
pub use value::*;

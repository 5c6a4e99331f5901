//! Schema Registry
//!
//! Loads component and archetype definitions from TOML documents and is
//! the authoritative source of field names, types, and defaults. The
//! registry is immutable after load and shared read-only by the scene
//! store, query engine, and constraint engine.

mod convert;
mod error;
mod registry;
mod types;

pub use convert::*;
pub use error::*;
pub use registry::*;
pub use types::*;

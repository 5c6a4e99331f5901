//! Command implementations.

pub mod entity;
pub mod query;
pub mod scene;
pub mod schema;
pub mod validate;

use crate::CliResult;
use diorama_schema::SchemaRegistry;

/// Load the schema registry backing every command. The registry is
/// required to interpret any scene, so a missing or malformed directory
/// is a hard error.
pub fn load_registry(schemas: &str) -> CliResult<SchemaRegistry> {
    Ok(SchemaRegistry::load(schemas)?)
}

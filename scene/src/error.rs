//! Scene error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scene load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for single mutations against a loaded scene.
pub type MutationResult<T> = Result<T, MutationError>;

/// Errors raised while loading a scene file. All of these are fatal to
/// that load; no partially-loaded scene is ever exposed, and a
/// previously loaded scene stays usable.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document text is not parseable.
    #[error("{path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    /// An entity names an archetype the registry does not know.
    #[error("entity '{entity}': unknown archetype '{archetype}'")]
    UnknownArchetype { entity: String, archetype: String },

    /// An entity attaches a component the registry does not know.
    #[error("entity '{entity}': unknown component '{component}'")]
    UnknownComponent { entity: String, component: String },

    /// A field's shape disagrees with its schema-declared type (also
    /// covers bad enum values, out-of-range numerics, unknown fields,
    /// and missing required fields).
    #[error("entity '{entity}': type mismatch for '{field}': {detail}")]
    TypeMismatch {
        entity: String,
        field: String,
        detail: String,
    },

    /// An entity's parent names an entity that does not exist.
    #[error("entity '{entity}': parent '{parent}' does not exist")]
    DanglingParent { entity: String, parent: String },

    /// The parent relation forms a cycle.
    #[error("entity '{entity}': parent chain forms a cycle")]
    CyclicParent { entity: String },

    /// Two entities share a name.
    #[error("duplicate entity name '{name}'")]
    DuplicateName { name: String },

    /// Filesystem failure while reading the document.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors raised by a rejected single mutation. The rest of the store is
/// unaffected; every mutation is all-or-nothing.
#[derive(Debug, Error)]
pub enum MutationError {
    /// An entity with this name already exists.
    #[error("entity '{0}' already exists")]
    DuplicateName(String),

    /// No entity with this name exists.
    #[error("entity '{0}' not found")]
    UnknownEntity(String),

    /// The archetype is not in the registry.
    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),

    /// The component is not in the registry.
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// The component schema declares no such field.
    #[error("component '{component}' has no field '{field}'")]
    UnknownField { component: String, field: String },

    /// The value's shape disagrees with the declared field type.
    #[error("type mismatch for '{field}': {detail}")]
    TypeMismatch { field: String, detail: String },

    /// The value is not a member of the enum's declared value set.
    #[error("invalid value for '{field}': '{value}' is not one of {allowed:?}")]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// A numeric value lies outside the field's declared bounds.
    #[error("value for '{field}' out of range: {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The requested parent does not exist.
    #[error("parent '{0}' does not exist")]
    MissingParent(String),

    /// The requested parent assignment would make the entity its own
    /// ancestor.
    #[error("setting parent of '{entity}' would create a cycle")]
    CyclicParent { entity: String },
}

impl MutationError {
    /// Wrap a value-level rejection with the field it was aimed at.
    pub(crate) fn from_value_error(field: &str, err: diorama_schema::ValueError) -> Self {
        match err {
            diorama_schema::ValueError::Mismatch { expected, actual } => Self::TypeMismatch {
                field: field.to_string(),
                detail: format!("expected {}, got {}", expected, actual),
            },
            diorama_schema::ValueError::InvalidEnum { value, allowed } => Self::InvalidEnumValue {
                field: field.to_string(),
                value,
                allowed,
            },
            diorama_schema::ValueError::OutOfRange { value, min, max } => Self::OutOfRange {
                field: field.to_string(),
                value,
                min,
                max,
            },
        }
    }
}

/// Errors raised while writing a scene file.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize scene: {0}")]
    Serialize(String),
}

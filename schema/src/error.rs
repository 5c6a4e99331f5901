//! Schema error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while loading schema or constraint definition files.
/// All of these are fatal to the load that triggered them.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// An archetype references a component that was never defined.
    #[error("{file}: archetype '{archetype}' references unknown component '{component}'")]
    UnknownComponent {
        file: PathBuf,
        archetype: String,
        component: String,
    },

    /// A declared default does not match its field's declared type.
    #[error("{file}: type mismatch for '{field}': {detail}")]
    TypeMismatch {
        file: PathBuf,
        field: String,
        detail: String,
    },

    /// The same component or archetype name was defined twice.
    #[error("{file}: duplicate definition of '{name}'")]
    DuplicateDefinition { file: PathBuf, name: String },

    /// The file is not parseable or is structurally invalid.
    #[error("{file}: {detail}")]
    MalformedFile { file: PathBuf, detail: String },

    /// Filesystem failure while reading definitions.
    #[error("failed to read {file}: {source}")]
    Io {
        file: PathBuf,
        source: std::io::Error,
    },
}

impl SchemaError {
    pub fn malformed(file: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::MalformedFile {
            file: file.into(),
            detail: detail.into(),
        }
    }

    pub fn type_mismatch(
        file: impl Into<PathBuf>,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            file: file.into(),
            field: field.into(),
            detail: detail.into(),
        }
    }
}

//! CLI error wrapper - maps the core error taxonomy to exit codes.

use thiserror::Error;

/// Any failure a command can surface. Each taxonomy member keeps its own
/// distinguishing exit code; messages are printed verbatim, never
/// downgraded.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("schema error: {0}")]
    Schema(#[from] diorama_schema::SchemaError),

    #[error("load error: {0}")]
    Load(#[from] diorama_scene::LoadError),

    #[error("query error: {0}")]
    Query(#[from] diorama_query::ParseError),

    #[error("mutation error: {0}")]
    Mutation(#[from] diorama_scene::MutationError),

    #[error("save error: {0}")]
    Save(#[from] diorama_scene::SaveError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Nonzero exit code for this error kind. Exit 1 is reserved for
    /// validation runs that produced error-severity diagnostics.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Schema(_) | CliError::NotFound(_) | CliError::Usage(_) => 2,
            CliError::Load(_) => 3,
            CliError::Query(_) => 4,
            CliError::Mutation(_) => 5,
            CliError::Save(_) => 6,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

//! Diorama CLI - command-line interface for the scene toolchain.

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{entity, query, scene, schema, validate};
pub use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "diorama")]
#[command(about = "Schema-driven scene store with query and validation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format for entity-shaped results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Toml,
}

/// Output format for validation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Query entities (e.g. "entities where archetype == 'door'")
    Query {
        /// Query string
        query: String,

        /// Path to the scene file
        #[arg(long)]
        scene: String,

        /// Path to the schemas directory
        #[arg(long, default_value = "schemas")]
        schemas: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate a scene against constraints
    Validate {
        /// Path to the scene file
        scene: String,

        /// Path to the schemas directory
        #[arg(long, default_value = "schemas")]
        schemas: String,

        /// Path to the constraints directory
        #[arg(long, default_value = "constraints")]
        constraints: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Entity operations
    #[command(subcommand)]
    Entity(entity::EntityCommands),

    /// Scene operations
    #[command(subcommand)]
    Scene(scene::SceneCommands),

    /// Show a schema registry entry (component or archetype)
    Schema {
        /// Component or archetype name
        name: String,

        /// Path to the schemas directory
        #[arg(long, default_value = "schemas")]
        schemas: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query {
            query,
            scene,
            schemas,
            format,
        } => query::run(&query, &scene, &schemas, format).map(|_| 0),
        Commands::Validate {
            scene,
            schemas,
            constraints,
            format,
        } => validate::run(&scene, &schemas, &constraints, format),
        Commands::Entity(cmd) => entity::run(cmd).map(|_| 0),
        Commands::Scene(cmd) => scene::run(cmd).map(|_| 0),
        Commands::Schema { name, schemas } => schema::run(&name, &schemas).map(|_| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(err.exit_code());
        }
    }
}

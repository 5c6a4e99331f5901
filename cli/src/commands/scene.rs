//! Scene management commands.

use crate::{CliError, CliResult};
use clap::Subcommand;
use diorama_scene::Scene;
use std::path::Path;

#[derive(Subcommand)]
pub enum SceneCommands {
    /// Create a new empty scene file
    New {
        /// Scene name
        name: String,

        /// Path to write the scene file to
        #[arg(long)]
        path: String,
    },
}

pub fn run(cmd: SceneCommands) -> CliResult<()> {
    match cmd {
        SceneCommands::New { name, path } => new_scene(&name, &path),
    }
}

fn new_scene(name: &str, path: &str) -> CliResult<()> {
    if Path::new(path).exists() {
        return Err(CliError::Usage(format!(
            "refusing to overwrite existing file {}",
            path
        )));
    }

    let scene = Scene::new(name);
    scene.save(path)?;

    println!("created scene '{}' at {}", name, path);
    Ok(())
}

//! Query command.

use crate::commands::load_registry;
use crate::output::{EntityList, EntitySummary};
use crate::{CliResult, OutputFormat};
use diorama_query::{evaluate, parse, QueryOutcome};
use diorama_scene::Scene;

pub fn run(query_text: &str, scene_path: &str, schemas: &str, format: OutputFormat) -> CliResult<()> {
    let query = parse(query_text)?;
    let registry = load_registry(schemas)?;
    let scene = Scene::load(scene_path, &registry)?;

    match evaluate(&query, &scene) {
        QueryOutcome::Entities(ids) => {
            let entities: Vec<EntitySummary> = ids
                .iter()
                .filter_map(|id| scene.entity(*id))
                .map(|entity| EntitySummary::from_entity(&scene, entity))
                .collect();
            print_entities(entities, format)?;
        }
        QueryOutcome::Components(names) => print_components(names, format)?,
    }

    Ok(())
}

fn print_entities(entities: Vec<EntitySummary>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => {
            if entities.is_empty() {
                println!("no matches");
            }
            for entity in &entities {
                println!("{}", entity.to_text());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entities).unwrap_or_else(|_| "[]".into()));
        }
        OutputFormat::Toml => {
            let wrapper = EntityList { entities };
            println!("{}", toml::to_string_pretty(&wrapper).unwrap_or_default());
        }
    }
    Ok(())
}

fn print_components(names: Vec<String>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => {
            for name in &names {
                println!("{}", name);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&names).unwrap_or_else(|_| "[]".into()));
        }
        OutputFormat::Toml => {
            #[derive(serde::Serialize)]
            struct Wrapper {
                components: Vec<String>,
            }
            let wrapper = Wrapper { components: names };
            println!("{}", toml::to_string_pretty(&wrapper).unwrap_or_default());
        }
    }
    Ok(())
}

//! Entity management commands.

use crate::commands::load_registry;
use crate::output::{EntityDetails, EntityList, EntitySummary};
use crate::{CliError, CliResult, OutputFormat};
use clap::Subcommand;
use diorama_core::ComponentData;
use diorama_scene::{MutationError, Scene};
use diorama_schema::SchemaRegistry;

#[derive(Subcommand)]
pub enum EntityCommands {
    /// Create a new entity and save the scene
    Create {
        /// Entity name
        name: String,

        /// Path to the scene file
        #[arg(long)]
        scene: String,

        /// Archetype name
        #[arg(long)]
        archetype: Option<String>,

        /// Parent entity name
        #[arg(long)]
        parent: Option<String>,

        /// Field overrides as component.field=value (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,

        /// Path to the schemas directory
        #[arg(long, default_value = "schemas")]
        schemas: String,
    },

    /// Delete an entity (and its subtree) and save the scene
    Delete {
        /// Entity name
        name: String,

        /// Path to the scene file
        #[arg(long)]
        scene: String,

        /// Path to the schemas directory
        #[arg(long, default_value = "schemas")]
        schemas: String,
    },

    /// Show entity details
    Show {
        /// Entity name
        name: String,

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

    /// List all entities
    List {
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

    /// Set a single component field and save the scene
    Set {
        /// Entity name
        name: String,

        /// Field path as component.field
        field: String,

        /// New value (TOML literal; bare words are taken as strings)
        value: String,

        /// Path to the scene file
        #[arg(long)]
        scene: String,

        /// Path to the schemas directory
        #[arg(long, default_value = "schemas")]
        schemas: String,
    },
}

pub fn run(cmd: EntityCommands) -> CliResult<()> {
    match cmd {
        EntityCommands::Create {
            name,
            scene,
            archetype,
            parent,
            sets,
            schemas,
        } => create(&name, &scene, archetype.as_deref(), parent.as_deref(), &sets, &schemas),
        EntityCommands::Delete { name, scene, schemas } => delete(&name, &scene, &schemas),
        EntityCommands::Show {
            name,
            scene,
            schemas,
            format,
        } => show(&name, &scene, &schemas, format),
        EntityCommands::List { scene, schemas, format } => list(&scene, &schemas, format),
        EntityCommands::Set {
            name,
            field,
            value,
            scene,
            schemas,
        } => set(&name, &field, &value, &scene, &schemas),
    }
}

fn create(
    name: &str,
    scene_path: &str,
    archetype: Option<&str>,
    parent: Option<&str>,
    sets: &[String],
    schemas: &str,
) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let mut scene = Scene::load(scene_path, &registry)?;

    let overrides = parse_set_args(&registry, sets)?;
    scene.create(name, archetype, parent, overrides, &registry)?;
    scene.save(scene_path)?;

    match archetype {
        Some(archetype) => println!("created entity '{}' with archetype '{}'", name, archetype),
        None => println!("created entity '{}'", name),
    }
    Ok(())
}

fn delete(name: &str, scene_path: &str, schemas: &str) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let mut scene = Scene::load(scene_path, &registry)?;

    if !scene.delete(name) {
        return Err(CliError::Mutation(MutationError::UnknownEntity(
            name.to_string(),
        )));
    }
    scene.save(scene_path)?;

    println!("deleted entity '{}' and its subtree", name);
    Ok(())
}

fn show(name: &str, scene_path: &str, schemas: &str, format: OutputFormat) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let scene = Scene::load(scene_path, &registry)?;

    let entity = scene
        .get(name)
        .ok_or_else(|| CliError::Mutation(MutationError::UnknownEntity(name.to_string())))?;
    let details = EntityDetails::from_entity(&scene, entity);

    match format {
        OutputFormat::Text => {
            println!("{}", details.summary.to_text());
            for (component, table) in &details.data {
                println!("  [{}]", component);
                if let Some(table) = table.as_table() {
                    for (field, value) in table {
                        println!("    {} = {}", field, value);
                    }
                }
            }
        }
        OutputFormat::Json => {
            let mut json = serde_json::json!({
                "name": details.summary.name,
                "archetype": details.summary.archetype,
                "parent": details.summary.parent,
            });
            let data: serde_json::Map<String, serde_json::Value> = entity
                .components
                .iter()
                .map(|(component, fields)| {
                    let table: serde_json::Map<String, serde_json::Value> = fields
                        .iter()
                        .map(|(field, value)| {
                            (field.clone(), crate::output::field_value_json(value))
                        })
                        .collect();
                    (component.clone(), serde_json::Value::Object(table))
                })
                .collect();
            json["data"] = serde_json::Value::Object(data);
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".into()));
        }
        OutputFormat::Toml => {
            println!("{}", toml::to_string_pretty(&details).unwrap_or_default());
        }
    }
    Ok(())
}

fn list(scene_path: &str, schemas: &str, format: OutputFormat) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let scene = Scene::load(scene_path, &registry)?;

    let entities: Vec<EntitySummary> = scene
        .entities()
        .map(|entity| EntitySummary::from_entity(&scene, entity))
        .collect();

    match format {
        OutputFormat::Text => {
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

fn set(name: &str, field_path: &str, raw: &str, scene_path: &str, schemas: &str) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let mut scene = Scene::load(scene_path, &registry)?;

    let (component, field) = split_field_path(field_path)?;
    let value = decode_value_arg(&registry, component, field, raw)?;
    scene.set_field(name, component, field, value, &registry)?;
    scene.save(scene_path)?;

    println!("set {}.{} on '{}'", component, field, name);
    Ok(())
}

/// Parse repeated `--set component.field=value` arguments into typed
/// component overrides.
fn parse_set_args(registry: &SchemaRegistry, sets: &[String]) -> CliResult<ComponentData> {
    let mut overrides = ComponentData::new();
    for entry in sets {
        let (path, raw) = entry.split_once('=').ok_or_else(|| {
            CliError::Usage(format!(
                "--set '{}' is not of the form component.field=value",
                entry
            ))
        })?;
        let (component, field) = split_field_path(path.trim())?;
        let value = decode_value_arg(registry, component, field, raw.trim())?;
        overrides
            .entry(component.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }
    Ok(overrides)
}

fn split_field_path(path: &str) -> CliResult<(&str, &str)> {
    path.split_once('.')
        .ok_or_else(|| CliError::Usage(format!("field path '{}' must be component.field", path)))
}

/// Decode a command-line value against the declared field type. The raw
/// text is read as a TOML literal; bare words fall back to strings so
/// enum and string fields do not need shell quoting.
fn decode_value_arg(
    registry: &SchemaRegistry,
    component: &str,
    field: &str,
    raw: &str,
) -> CliResult<diorama_core::FieldValue> {
    let component_def = registry
        .component(component)
        .ok_or_else(|| CliError::Mutation(MutationError::UnknownComponent(component.to_string())))?;
    let field_def = component_def.field(field).ok_or_else(|| {
        CliError::Mutation(MutationError::UnknownField {
            component: component.to_string(),
            field: field.to_string(),
        })
    })?;

    let parsed: toml::Value = toml::from_str::<toml::value::Table>(&format!("v = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("v"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()));

    field_def.decode(&parsed).map_err(|e| {
        CliError::Mutation(MutationError::TypeMismatch {
            field: format!("{}.{}", component, field),
            detail: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_core::FieldValue;

    fn test_registry() -> SchemaRegistry {
        SchemaRegistry::load_str(
            r#"
[component.door.fields]
locked = { type = "bool", default = false }
style = { type = "enum", values = ["hinged", "sliding"], default = "hinged" }
open_angle = { type = "f32", default = 0.0 }
"#,
            "test.toml",
        )
        .unwrap()
    }

    #[test]
    fn test_parse_set_args() {
        let registry = test_registry();
        let overrides = parse_set_args(
            &registry,
            &[
                "door.locked=true".to_string(),
                "door.open_angle=45.0".to_string(),
                "door.style=sliding".to_string(),
            ],
        )
        .unwrap();

        let door = &overrides["door"];
        assert_eq!(door.get("locked"), Some(&FieldValue::Bool(true)));
        assert_eq!(door.get("open_angle"), Some(&FieldValue::Float(45.0)));
        // Bare word falls back to a string, then decodes as the enum.
        assert_eq!(door.get("style"), Some(&FieldValue::Enum("sliding".into())));
    }

    #[test]
    fn test_parse_set_args_rejects_bad_shapes() {
        let registry = test_registry();
        assert!(parse_set_args(&registry, &["door.locked".to_string()]).is_err());
        assert!(parse_set_args(&registry, &["locked=true".to_string()]).is_err());
        assert!(parse_set_args(&registry, &["window.tint=1".to_string()]).is_err());
        assert!(parse_set_args(&registry, &["door.locked=5".to_string()]).is_err());
    }
}

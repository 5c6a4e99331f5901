//! Schema inspection command.

use crate::commands::load_registry;
use crate::{CliError, CliResult};
use diorama_schema::{ArchetypeDef, ComponentDef};

pub fn run(name: &str, schemas: &str) -> CliResult<()> {
    let registry = load_registry(schemas)?;

    if let Some(component) = registry.component(name) {
        print_component(component);
        return Ok(());
    }
    if let Some(archetype) = registry.archetype(name) {
        print_archetype(archetype);
        return Ok(());
    }

    Err(CliError::NotFound(format!(
        "no component or archetype named '{}' (components: {}; archetypes: {})",
        name,
        registry.component_names().collect::<Vec<_>>().join(", "),
        registry.archetype_names().collect::<Vec<_>>().join(", "),
    )))
}

fn print_component(component: &ComponentDef) {
    println!("component {}", component.name);
    if let Some(description) = &component.description {
        println!("  {}", description);
    }
    println!("  fields:");
    for (name, field) in &component.fields {
        let mut line = format!("    {}: {}", name, field.field_type.type_name());
        if let Some(default) = &field.default {
            line.push_str(&format!(" = {}", default));
        }
        if field.required {
            line.push_str(" (required)");
        }
        if let (Some(min), Some(max)) = (field.min, field.max) {
            line.push_str(&format!(" [{}, {}]", min, max));
        }
        println!("{}", line);
        if let Some(description) = &field.description {
            println!("      {}", description);
        }
    }
}

fn print_archetype(archetype: &ArchetypeDef) {
    println!("archetype {}", archetype.name);
    if let Some(description) = &archetype.description {
        println!("  {}", description);
    }
    println!("  components: {}", archetype.components.join(", "));
    for (component, fields) in &archetype.defaults {
        println!("  defaults for {}:", component);
        for (field, value) in fields {
            println!("    {} = {}", field, value);
        }
    }
}

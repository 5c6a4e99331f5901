//! The schema registry - immutable component and archetype lookup.

use crate::{ArchetypeDef, ComponentDef, FieldDef, FieldType, SchemaError, SchemaResult};
use diorama_core::{ComponentData, Fields};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Registry holding all loaded component and archetype definitions.
/// Immutable after load; shared read-only by the scene store, query
/// engine, and constraint engine.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    components: IndexMap<String, ComponentDef>,
    archetypes: IndexMap<String, ArchetypeDef>,
}

// ==================== File format ====================

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    component: IndexMap<String, ComponentEntry>,
    #[serde(default)]
    archetype: IndexMap<String, ArchetypeEntry>,
}

#[derive(Debug, Deserialize)]
struct ComponentEntry {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    fields: IndexMap<String, FieldEntry>,
}

/// A field declares either a bare type name (`locked = "bool"`, implicitly
/// required) or a detailed table with type, default, and bounds.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldEntry {
    Simple(String),
    Detailed(DetailedFieldEntry),
}

#[derive(Debug, Deserialize)]
struct DetailedFieldEntry {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    values: Option<Vec<String>>,
    #[serde(default)]
    element: Option<String>,
    #[serde(default)]
    default: Option<toml::Value>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ArchetypeEntry {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    components: Vec<String>,
    #[serde(default)]
    defaults: IndexMap<String, toml::Value>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.toml` file in a directory.
    ///
    /// Files are read in name order so load results are deterministic.
    /// Each file may define any mix of `[component.<name>]` and
    /// `[archetype.<name>]` tables.
    pub fn load<P: AsRef<Path>>(dir: P) -> SchemaResult<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|source| SchemaError::Io {
                file: dir.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        let mut files = Vec::new();
        for path in paths {
            let content = fs::read_to_string(&path).map_err(|source| SchemaError::Io {
                file: path.clone(),
                source,
            })?;
            let file = parse_schema_file(&path, &content)?;
            files.push((path, file));
        }

        let registry = Self::build(files)?;
        log::info!(
            "loaded schema registry: {} components, {} archetypes",
            registry.components.len(),
            registry.archetypes.len()
        );
        Ok(registry)
    }

    /// Load a registry from a single TOML string. `origin` labels the
    /// source in error messages.
    pub fn load_str(content: &str, origin: &str) -> SchemaResult<Self> {
        let origin = PathBuf::from(origin);
        let file = parse_schema_file(&origin, content)?;
        Self::build(vec![(origin, file)])
    }

    fn build(files: Vec<(PathBuf, SchemaFile)>) -> SchemaResult<Self> {
        let mut registry = Self::new();

        // First pass: components, so archetypes in any file can reference
        // components from any other.
        for (path, file) in &files {
            for (name, entry) in &file.component {
                if registry.components.contains_key(name) {
                    return Err(SchemaError::DuplicateDefinition {
                        file: path.clone(),
                        name: name.clone(),
                    });
                }
                let def = build_component(path, name, entry)?;
                registry.components.insert(name.clone(), def);
            }
        }

        // Second pass: archetypes, cross-validated against the components.
        for (path, file) in &files {
            for (name, entry) in &file.archetype {
                if registry.archetypes.contains_key(name) {
                    return Err(SchemaError::DuplicateDefinition {
                        file: path.clone(),
                        name: name.clone(),
                    });
                }
                let def = build_archetype(path, name, entry, &registry.components)?;
                registry.archetypes.insert(name.clone(), def);
            }
        }

        Ok(registry)
    }

    /// Register a component definition directly (programmatic use).
    pub fn register_component(&mut self, def: ComponentDef) {
        self.components.insert(def.name.clone(), def);
    }

    /// Register an archetype definition directly (programmatic use).
    pub fn register_archetype(&mut self, def: ArchetypeDef) {
        self.archetypes.insert(def.name.clone(), def);
    }

    // ==================== Lookups ====================

    /// Get a component definition by name.
    pub fn component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.get(name)
    }

    /// Get an archetype definition by name.
    pub fn archetype(&self, name: &str) -> Option<&ArchetypeDef> {
        self.archetypes.get(name)
    }

    /// Iterate component names in load order.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(|s| s.as_str())
    }

    /// Iterate archetype names in load order.
    pub fn archetype_names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.keys().map(|s| s.as_str())
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Resolve the full component map an archetype seeds onto a new
    /// entity: schema field defaults first, archetype overrides applied
    /// on top (replacing in place so field order follows the schema).
    /// Returns `None` for an unknown archetype.
    pub fn resolve_defaults(&self, archetype: &str) -> Option<ComponentData> {
        let arch = self.archetypes.get(archetype)?;
        let mut data = ComponentData::new();

        for comp_name in &arch.components {
            let Some(component) = self.components.get(comp_name) else {
                continue;
            };
            let mut fields = component.default_fields();
            if let Some(overrides) = arch.defaults.get(comp_name) {
                for (field, value) in overrides {
                    fields.insert(field.clone(), value.clone());
                }
            }
            data.insert(comp_name.clone(), fields);
        }

        Some(data)
    }
}

fn parse_schema_file(file: &Path, content: &str) -> SchemaResult<SchemaFile> {
    toml::from_str(content).map_err(|e| SchemaError::malformed(file, e.to_string()))
}

fn parse_field_type(
    file: &Path,
    field: &str,
    type_name: &str,
    values: Option<&Vec<String>>,
    element: Option<&str>,
) -> SchemaResult<FieldType> {
    match type_name {
        "bool" => Ok(FieldType::Bool),
        "i32" => Ok(FieldType::I32),
        "f32" => Ok(FieldType::F32),
        "string" => Ok(FieldType::String),
        "vec3" => Ok(FieldType::Vec3),
        "entity_ref" => Ok(FieldType::EntityRef),
        "enum" => {
            let values = values.filter(|v| !v.is_empty()).ok_or_else(|| {
                SchemaError::malformed(
                    file,
                    format!("enum field '{}' declares no values", field),
                )
            })?;
            Ok(FieldType::Enum {
                values: values.clone(),
            })
        }
        "array" => {
            let element = element.ok_or_else(|| {
                SchemaError::malformed(
                    file,
                    format!("array field '{}' declares no element type", field),
                )
            })?;
            let element = parse_field_type(file, field, element, None, None)?;
            Ok(FieldType::Array {
                element: Box::new(element),
            })
        }
        other => Err(SchemaError::malformed(
            file,
            format!("unknown field type '{}' for '{}'", other, field),
        )),
    }
}

fn build_component(file: &Path, name: &str, entry: &ComponentEntry) -> SchemaResult<ComponentDef> {
    let mut fields = IndexMap::new();

    for (field_name, field_entry) in &entry.fields {
        let qualified = format!("{}.{}", name, field_name);
        let def = match field_entry {
            // Bare type shorthand: no default, so the field is required.
            FieldEntry::Simple(type_name) => {
                let field_type = parse_field_type(file, &qualified, type_name, None, None)?;
                FieldDef {
                    field_type,
                    default: None,
                    required: true,
                    description: None,
                    min: None,
                    max: None,
                }
            }
            FieldEntry::Detailed(detailed) => {
                let field_type = parse_field_type(
                    file,
                    &qualified,
                    &detailed.type_name,
                    detailed.values.as_ref(),
                    detailed.element.as_deref(),
                )?;
                let mut def = FieldDef {
                    field_type,
                    default: None,
                    required: detailed.required.unwrap_or(false),
                    description: detailed.description.clone(),
                    min: detailed.min,
                    max: detailed.max,
                };
                if let Some(raw) = &detailed.default {
                    let value = def.decode(raw).map_err(|e| {
                        SchemaError::type_mismatch(file, &qualified, e.to_string())
                    })?;
                    def.default = Some(value);
                } else if !def.required {
                    return Err(SchemaError::malformed(
                        file,
                        format!("field '{}' needs a default or required = true", qualified),
                    ));
                }
                def
            }
        };
        fields.insert(field_name.clone(), def);
    }

    Ok(ComponentDef {
        name: name.to_string(),
        description: entry.description.clone(),
        fields,
    })
}

fn build_archetype(
    file: &Path,
    name: &str,
    entry: &ArchetypeEntry,
    components: &IndexMap<String, ComponentDef>,
) -> SchemaResult<ArchetypeDef> {
    for comp_name in &entry.components {
        if !components.contains_key(comp_name) {
            return Err(SchemaError::UnknownComponent {
                file: file.to_path_buf(),
                archetype: name.to_string(),
                component: comp_name.clone(),
            });
        }
    }

    let mut defaults = IndexMap::new();
    for (comp_name, raw) in &entry.defaults {
        let component = components.get(comp_name).ok_or_else(|| {
            SchemaError::UnknownComponent {
                file: file.to_path_buf(),
                archetype: name.to_string(),
                component: comp_name.clone(),
            }
        })?;
        if !entry.components.contains(comp_name) {
            return Err(SchemaError::malformed(
                file,
                format!(
                    "archetype '{}' declares defaults for '{}' which it does not bundle",
                    name, comp_name
                ),
            ));
        }
        let table = raw.as_table().ok_or_else(|| {
            SchemaError::malformed(
                file,
                format!("defaults for '{}.{}' must be a table", name, comp_name),
            )
        })?;

        let mut fields = Fields::new();
        for (field_name, raw_value) in table {
            let qualified = format!("{}.{}", comp_name, field_name);
            let field_def = component.field(field_name).ok_or_else(|| {
                SchemaError::malformed(
                    file,
                    format!("archetype '{}' overrides unknown field '{}'", name, qualified),
                )
            })?;
            let value = field_def.decode(raw_value).map_err(|e| {
                SchemaError::type_mismatch(file, &qualified, e.to_string())
            })?;
            fields.insert(field_name.clone(), value);
        }
        defaults.insert(comp_name.clone(), fields);
    }

    Ok(ArchetypeDef {
        name: name.to_string(),
        description: entry.description.clone(),
        components: entry.components.clone(),
        defaults,
    })
}

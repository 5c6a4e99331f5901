//! Constraint definitions and loading.

use diorama_schema::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Severity of a constraint violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// The kind of check a constraint performs on its matched entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Every matched entity must have the named component.
    RequiredComponent { component: String },
    /// Every matched entity must have at least one child matching all
    /// stated expectations.
    RequiredChild {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        archetype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// A named (dotted) field must lie within an inclusive numeric range.
    ValueRange { field: String, min: f64, max: f64 },
    /// A reference-valued field must name an entity that exists.
    ReferenceValid { field: String },
    /// Fully general form: the rule fires for every matched entity the
    /// given query returns.
    QueryRule { rule: String },
}

/// A declarative rule, scoped by a query, that flags entities violating a
/// stated condition. Constraints never mutate the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Applicability filter, in query engine syntax.
    pub query: String,
    pub severity: Severity,
    /// Message template; `{name}` and other matched-entity field paths
    /// are substituted textually.
    pub message: String,
    pub kind: ConstraintKind,
}

#[derive(Debug, Deserialize)]
struct ConstraintFile {
    #[serde(default)]
    constraint: Vec<Constraint>,
}

/// Load constraints from every `*.toml` file in a directory, in file
/// name order. Block order within each file is preserved.
pub fn load_constraints<P: AsRef<Path>>(dir: P) -> SchemaResult<Vec<Constraint>> {
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

    let mut constraints = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path).map_err(|source| SchemaError::Io {
            file: path.clone(),
            source,
        })?;
        constraints.extend(parse_constraints(&content, &path.to_string_lossy())?);
    }

    log::info!("loaded {} constraints", constraints.len());
    Ok(constraints)
}

/// Parse constraints from a TOML string. `origin` labels the source in
/// error messages.
pub fn parse_constraints(content: &str, origin: &str) -> SchemaResult<Vec<Constraint>> {
    let file: ConstraintFile =
        toml::from_str(content).map_err(|e| SchemaError::malformed(origin, e.to_string()))?;
    Ok(file.constraint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_required_component_constraint() {
        let toml = r#"
[[constraint]]
name = "doors_need_transform"
description = "Every door is positioned somewhere"
query = "entities where archetype == 'door'"
severity = "error"
message = "Door '{name}' is missing a transform component"

[constraint.kind]
type = "required_component"
component = "transform"
"#;
        let constraints = parse_constraints(toml, "rules.toml").unwrap();
        assert_eq!(constraints.len(), 1);
        let c = &constraints[0];
        assert_eq!(c.name, "doors_need_transform");
        assert_eq!(c.severity, Severity::Error);
        assert!(matches!(&c.kind, ConstraintKind::RequiredComponent { component }
            if component == "transform"));
    }

    #[test]
    fn test_parse_required_child_constraint() {
        let toml = r#"
[[constraint]]
name = "doors_have_handles"
query = "entities where archetype == 'door'"
severity = "warning"
message = "Door '{name}' is missing a handle"

[constraint.kind]
type = "required_child"
archetype = "handle"
"#;
        let constraints = parse_constraints(toml, "rules.toml").unwrap();
        assert!(matches!(&constraints[0].kind,
            ConstraintKind::RequiredChild { archetype: Some(a), name: None }
            if a == "handle"));
    }

    #[test]
    fn test_parse_value_range_constraint() {
        let toml = r#"
[[constraint]]
name = "door_angle_valid"
query = "entities where archetype == 'door'"
severity = "error"
message = "Door '{name}' has an invalid open_angle"

[constraint.kind]
type = "value_range"
field = "door.open_angle"
min = 0.0
max = 180.0
"#;
        let constraints = parse_constraints(toml, "rules.toml").unwrap();
        assert!(matches!(&constraints[0].kind,
            ConstraintKind::ValueRange { field, min, max }
            if field == "door.open_angle" && *min == 0.0 && *max == 180.0));
    }

    #[test]
    fn test_parse_multiple_blocks_keep_order() {
        let toml = r#"
[[constraint]]
name = "first"
query = "entities"
severity = "warning"
message = "m"

[constraint.kind]
type = "required_component"
component = "transform"

[[constraint]]
name = "second"
query = "entities"
severity = "error"
message = "m"

[constraint.kind]
type = "reference_valid"
field = "link.target"
"#;
        let constraints = parse_constraints(toml, "rules.toml").unwrap();
        let names: Vec<&str> = constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_malformed_file_is_a_schema_error() {
        let err = parse_constraints("[[constraint]]\nname = 1\n", "rules.toml").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedFile { .. }));
    }

    #[test]
    fn test_load_constraints_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.toml"),
            r#"
[[constraint]]
name = "from_b"
query = "entities"
severity = "warning"
message = "m"

[constraint.kind]
type = "required_component"
component = "transform"
"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.toml"),
            r#"
[[constraint]]
name = "from_a"
query = "entities"
severity = "error"
message = "m"

[constraint.kind]
type = "query_rule"
rule = "entities where archetype == 'ghost'"
"#,
        )
        .unwrap();

        let constraints = load_constraints(dir.path()).unwrap();
        // File name order, then block order.
        let names: Vec<&str> = constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["from_a", "from_b"]);
    }
}

//! Constraint validation.

use crate::{Constraint, ConstraintKind, Diagnostic, Diagnostics, Severity};
use diorama_core::EntityId;
use diorama_query::{evaluate, parse, resolve_path, QueryOutcome, ResolvedValue};
use diorama_scene::{Entity, Scene};

/// Evaluates constraints against a scene, collecting diagnostics
/// exhaustively: no failing rule stops the others.
pub struct Validator<'a> {
    scene: &'a Scene,
    constraints: &'a [Constraint],
}

impl<'a> Validator<'a> {
    pub fn new(scene: &'a Scene, constraints: &'a [Constraint]) -> Self {
        Self { scene, constraints }
    }

    /// Run every constraint and return the collected diagnostics, in
    /// constraint order then scene declaration order.
    pub fn validate(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for constraint in self.constraints {
            self.check_constraint(constraint, &mut diagnostics);
        }
        log::info!(
            "validated '{}' against {} constraints: {}",
            self.scene.name,
            self.constraints.len(),
            diagnostics.summary()
        );
        diagnostics
    }

    fn check_constraint(&self, constraint: &Constraint, out: &mut Diagnostics) {
        let matched = match self.applicable_entities(&constraint.query, &constraint.name, out) {
            Some(ids) => ids,
            None => return,
        };

        // The general form flags whatever its own query returns, scoped
        // by the applicability filter.
        if let ConstraintKind::QueryRule { rule } = &constraint.kind {
            let Some(flagged) = self.applicable_entities(rule, &constraint.name, out) else {
                return;
            };
            for id in flagged {
                if !matched.contains(&id) {
                    continue;
                }
                if let Some(entity) = self.scene.entity(id) {
                    out.push(self.violation(constraint, entity));
                }
            }
            return;
        }

        for id in matched {
            let Some(entity) = self.scene.entity(id) else {
                continue;
            };
            let violated = match &constraint.kind {
                ConstraintKind::RequiredComponent { component } => {
                    !entity.has_component(component)
                }
                ConstraintKind::RequiredChild { archetype, name } => {
                    !self.has_matching_child(entity, archetype.as_deref(), name.as_deref())
                }
                ConstraintKind::ValueRange { field, min, max } => {
                    self.value_out_of_range(entity, field, *min, *max)
                }
                ConstraintKind::ReferenceValid { field } => self.reference_dangles(entity, field),
                ConstraintKind::QueryRule { .. } => unreachable!("handled above"),
            };

            if violated {
                out.push(self.violation(constraint, entity));
            }
        }
    }

    /// Parse and evaluate a scoping query. A query that does not parse
    /// contributes one error diagnostic naming the constraint; it is
    /// never silently dropped.
    fn applicable_entities(
        &self,
        query_text: &str,
        constraint_name: &str,
        out: &mut Diagnostics,
    ) -> Option<Vec<EntityId>> {
        let query = match parse(query_text) {
            Ok(query) => query,
            Err(e) => {
                out.push(Diagnostic::new(
                    Severity::Error,
                    constraint_name,
                    "",
                    format!("invalid query '{}': {}", query_text, e),
                ));
                return None;
            }
        };
        match evaluate(&query, self.scene) {
            QueryOutcome::Entities(ids) => Some(ids),
            // Only entity queries can scope a constraint.
            QueryOutcome::Components(_) => None,
        }
    }

    fn violation(&self, constraint: &Constraint, entity: &Entity) -> Diagnostic {
        Diagnostic::new(
            constraint.severity,
            &constraint.name,
            &entity.name,
            expand_message(&constraint.message, self.scene, entity),
        )
    }

    fn has_matching_child(
        &self,
        entity: &Entity,
        archetype: Option<&str>,
        name: Option<&str>,
    ) -> bool {
        self.scene
            .children_of(&entity.name)
            .into_iter()
            .filter_map(|id| self.scene.entity(id))
            .any(|child| {
                archetype.map_or(true, |a| child.archetype.as_deref() == Some(a))
                    && name.map_or(true, |n| child.name == n)
            })
    }

    fn value_out_of_range(&self, entity: &Entity, field: &str, min: f64, max: f64) -> bool {
        let path: Vec<String> = field.split('.').map(String::from).collect();
        match resolve_path(self.scene, entity, &path) {
            // Missing or non-numeric fields are not range violations.
            Some(ResolvedValue::Num(n)) => n < min || n > max,
            _ => false,
        }
    }

    fn reference_dangles(&self, entity: &Entity, field: &str) -> bool {
        let path: Vec<String> = field.split('.').map(String::from).collect();
        match resolve_path(self.scene, entity, &path) {
            Some(ResolvedValue::Str(target)) => !self.scene.contains_name(&target),
            _ => false,
        }
    }
}

/// Expand `{placeholder}` references in a message template against the
/// matched entity. A placeholder is `name` or any query-resolvable path;
/// unresolved placeholders render literally.
pub fn expand_message(template: &str, scene: &Scene, entity: &Entity) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let placeholder = &after[..close];
                let path: Vec<String> = placeholder.split('.').map(String::from).collect();
                match resolve_path(scene, entity, &path) {
                    Some(value) => out.push_str(&render_resolved(&value)),
                    None => {
                        out.push('{');
                        out.push_str(placeholder);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn render_resolved(value: &ResolvedValue) -> String {
    match value {
        ResolvedValue::Str(s) => s.clone(),
        ResolvedValue::Num(n) => n.to_string(),
        ResolvedValue::Bool(b) => b.to_string(),
        ResolvedValue::List(items) => {
            let rendered: Vec<String> = items.iter().map(render_resolved).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_constraints;
    use diorama_schema::SchemaRegistry;

    fn test_registry() -> SchemaRegistry {
        SchemaRegistry::load_str(
            r#"
[component.transform.fields]
position = { type = "vec3", default = [0.0, 0.0, 0.0] }

[component.door.fields]
locked = { type = "bool", default = false }
open_angle = { type = "f32", default = 0.0 }

[component.link.fields]
target = { type = "entity_ref", default = "" }

[archetype.room]
components = ["transform"]

[archetype.door]
components = ["door"]

[archetype.handle]
components = []
"#,
            "test.toml",
        )
        .unwrap()
    }

    fn validate_with(scene_toml: &str, rules_toml: &str) -> Diagnostics {
        let registry = test_registry();
        let scene = Scene::load_str(scene_toml, &registry).unwrap();
        let constraints = parse_constraints(rules_toml, "rules.toml").unwrap();
        Validator::new(&scene, &constraints).validate()
    }

    const REQUIRED_TRANSFORM: &str = r#"
[[constraint]]
name = "doors_need_transform"
query = "entities where archetype == 'door'"
severity = "error"
message = "Door '{name}' is missing a transform component"

[constraint.kind]
type = "required_component"
component = "transform"
"#;

    #[test]
    fn test_required_component_violation() {
        // GIVEN a door without a transform component
        let scene = r#"
[scene]
name = "s"

[entities.bare_door]
archetype = "door"
"#;

        // WHEN validated
        let diagnostics = validate_with(scene, REQUIRED_TRANSFORM);

        // THEN exactly one error diagnostic names that entity
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics.all()[0];
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.entity_name, "bare_door");
        assert_eq!(d.constraint_name, "doors_need_transform");
        assert_eq!(d.message, "Door 'bare_door' is missing a transform component");
    }

    #[test]
    fn test_required_component_passes() {
        // GIVEN all doors have transforms
        let scene = r#"
[scene]
name = "s"

[entities.good_door]
archetype = "door"

[entities.good_door.transform]
position = [1.0, 0.0, 0.0]
"#;

        // WHEN validated THEN no diagnostics fire for the rule
        let diagnostics = validate_with(scene, REQUIRED_TRANSFORM);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_required_child() {
        let rules = r#"
[[constraint]]
name = "doors_have_handles"
query = "entities where archetype == 'door'"
severity = "warning"
message = "Door '{name}' is missing a handle"

[constraint.kind]
type = "required_child"
archetype = "handle"
"#;
        let without = r#"
[scene]
name = "s"

[entities.front_door]
archetype = "door"
"#;
        let diagnostics = validate_with(without, rules);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.all()[0].severity, Severity::Warning);

        let with = r#"
[scene]
name = "s"

[entities.front_door]
archetype = "door"

[entities.front_handle]
archetype = "handle"
parent = "front_door"
"#;
        assert!(validate_with(with, rules).is_empty());
    }

    #[test]
    fn test_value_range() {
        let rules = r#"
[[constraint]]
name = "door_angle_valid"
query = "entities where archetype == 'door'"
severity = "error"
message = "Door '{name}' opens to {door.open_angle} degrees"

[constraint.kind]
type = "value_range"
field = "door.open_angle"
min = 0.0
max = 180.0
"#;
        let scene = r#"
[scene]
name = "s"

[entities.fine_door]
archetype = "door"

[entities.broken_door]
archetype = "door"

[entities.broken_door.door]
open_angle = 270.0
"#;
        let diagnostics = validate_with(scene, rules);
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics.all()[0];
        assert_eq!(d.entity_name, "broken_door");
        // The field path placeholder expanded from the entity.
        assert_eq!(d.message, "Door 'broken_door' opens to 270 degrees");
    }

    #[test]
    fn test_reference_valid() {
        let rules = r#"
[[constraint]]
name = "links_resolve"
query = "entities"
severity = "error"
message = "'{name}' links to missing entity '{link.target}'"

[constraint.kind]
type = "reference_valid"
field = "link.target"
"#;
        let scene = r#"
[scene]
name = "s"

[entities.hall]
archetype = "room"

[entities.good_portal.link]
target = "hall"

[entities.bad_portal.link]
target = "basement"
"#;
        let diagnostics = validate_with(scene, rules);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.all()[0].entity_name, "bad_portal");
        assert_eq!(
            diagnostics.all()[0].message,
            "'bad_portal' links to missing entity 'basement'"
        );
    }

    #[test]
    fn test_query_rule_flags_returned_entities() {
        let rules = r#"
[[constraint]]
name = "no_locked_kitchen_doors"
query = "entities where archetype == 'door'"
severity = "warning"
message = "'{name}' should not be locked"

[constraint.kind]
type = "query_rule"
rule = "entities where door.locked == true"
"#;
        let scene = r#"
[scene]
name = "s"

[entities.storage_door]
archetype = "door"

[entities.storage_door.door]
locked = true

[entities.kitchen_door]
archetype = "door"
"#;
        let diagnostics = validate_with(scene, rules);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.all()[0].entity_name, "storage_door");
    }

    #[test]
    fn test_invalid_query_surfaces_and_others_continue() {
        let rules = r#"
[[constraint]]
name = "broken_rule"
query = "entities where archetype ="
severity = "warning"
message = "never rendered"

[constraint.kind]
type = "required_component"
component = "transform"

[[constraint]]
name = "doors_need_transform"
query = "entities where archetype == 'door'"
severity = "error"
message = "Door '{name}' is missing a transform component"

[constraint.kind]
type = "required_component"
component = "transform"
"#;
        let scene = r#"
[scene]
name = "s"

[entities.bare_door]
archetype = "door"
"#;
        let diagnostics = validate_with(scene, rules);
        // One error for the unparseable query, one for the real rule.
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.all()[0].constraint_name, "broken_rule");
        assert!(diagnostics.all()[0].message.contains("invalid query"));
        assert_eq!(diagnostics.all()[1].entity_name, "bare_door");
    }

    #[test]
    fn test_unresolved_placeholder_renders_literally() {
        let rules = r#"
[[constraint]]
name = "doors_need_transform"
query = "entities where archetype == 'door'"
severity = "error"
message = "{name} / {window.tint} / {name}"

[constraint.kind]
type = "required_component"
component = "transform"
"#;
        let scene = r#"
[scene]
name = "s"

[entities.bare_door]
archetype = "door"
"#;
        let diagnostics = validate_with(scene, rules);
        assert_eq!(
            diagnostics.all()[0].message,
            "bare_door / {window.tint} / bare_door"
        );
    }
}

//! Query evaluation against a scene store.
//!
//! Evaluation is total: a predicate either matches an entity or it does
//! not. Missing components, missing fields, and type-mismatched
//! comparisons exclude the entity instead of raising errors.

use crate::{CompareOp, Literal, Predicate, Query, Resource};
use diorama_core::{EntityId, FieldValue};
use diorama_schema::widen_f32;
use diorama_scene::{Entity, Scene};

/// The result of evaluating a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Matched entity ids, in scene declaration order.
    Entities(Vec<EntityId>),
    /// Distinct component names attached across the scene, sorted.
    Components(Vec<String>),
}

impl QueryOutcome {
    pub fn is_empty(&self) -> bool {
        match self {
            QueryOutcome::Entities(ids) => ids.is_empty(),
            QueryOutcome::Components(names) => names.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryOutcome::Entities(ids) => ids.len(),
            QueryOutcome::Components(names) => names.len(),
        }
    }
}

/// Evaluate a parsed query. Never fails: data-level mismatches are
/// no-matches, and result order is scene declaration order.
pub fn evaluate(query: &Query, scene: &Scene) -> QueryOutcome {
    match query.resource {
        Resource::Entities => {
            let ids = scene
                .entities()
                .filter(|entity| match &query.predicate {
                    Some(predicate) => matches(scene, entity, predicate),
                    None => true,
                })
                .map(|entity| entity.id)
                .collect();
            QueryOutcome::Entities(ids)
        }
        Resource::Components => {
            let mut names: Vec<String> = scene
                .entities()
                .flat_map(|entity| entity.component_names().map(String::from))
                .collect();
            names.sort();
            names.dedup();
            QueryOutcome::Components(names)
        }
    }
}

/// Check one entity against a predicate.
pub fn matches(scene: &Scene, entity: &Entity, predicate: &Predicate) -> bool {
    match resolve_path(scene, entity, &predicate.path) {
        Some(value) => compare(&value, predicate.op, &predicate.literal),
        None => false,
    }
}

/// A path resolved into the comparison domain.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Str(String),
    Num(f64),
    Bool(bool),
    List(Vec<ResolvedValue>),
}

/// Resolve a dotted path on an entity.
///
/// Single-segment paths address the built-ins `archetype`, `name`, and
/// `parent` (as strings), or test for an attached component by name
/// (resolving to `true`). Longer paths address `component.field`, with a
/// further `x`/`y`/`z` segment reaching into vec3 fields. A path that is
/// missing on this entity resolves to `None`.
pub fn resolve_path(scene: &Scene, entity: &Entity, path: &[String]) -> Option<ResolvedValue> {
    match path {
        [] => None,
        [segment] => match segment.as_str() {
            "name" => Some(ResolvedValue::Str(entity.name.clone())),
            "archetype" => entity.archetype.clone().map(ResolvedValue::Str),
            "parent" => entity
                .parent
                .and_then(|id| scene.entity(id))
                .map(|parent| ResolvedValue::Str(parent.name.clone())),
            component => entity
                .has_component(component)
                .then_some(ResolvedValue::Bool(true)),
        },
        [component, field, rest @ ..] => {
            let value = entity.field(component, field)?;
            resolve_value(value, rest)
        }
    }
}

fn resolve_value(value: &FieldValue, rest: &[String]) -> Option<ResolvedValue> {
    match rest {
        [] => match value {
            FieldValue::Bool(b) => Some(ResolvedValue::Bool(*b)),
            FieldValue::Int(i) => Some(ResolvedValue::Num(*i as f64)),
            FieldValue::Float(f) => Some(ResolvedValue::Num(widen_f32(*f))),
            FieldValue::String(s) | FieldValue::Enum(s) | FieldValue::EntityRef(s) => {
                Some(ResolvedValue::Str(s.clone()))
            }
            FieldValue::Array(items) => Some(ResolvedValue::List(
                items.iter().filter_map(|item| resolve_value(item, &[])).collect(),
            )),
            // A bare vec3 has no comparison meaning; its subfields do.
            FieldValue::Vec3(_) => None,
        },
        [subfield] => value
            .as_vec3()
            .and_then(|v| v.component(subfield))
            .map(|n| ResolvedValue::Num(widen_f32(n))),
        _ => None,
    }
}

fn compare(value: &ResolvedValue, op: CompareOp, literal: &Literal) -> bool {
    match (value, literal) {
        (ResolvedValue::Str(s), Literal::Str(lit)) => match op {
            CompareOp::Eq => s == lit,
            CompareOp::NotEq => s != lit,
            CompareOp::Contains => s.contains(lit.as_str()),
            // Ordering is defined for numbers only.
            _ => false,
        },
        (ResolvedValue::Num(n), Literal::Number(lit)) => match op {
            CompareOp::Eq => n == lit,
            CompareOp::NotEq => n != lit,
            CompareOp::Gt => n > lit,
            CompareOp::Lt => n < lit,
            CompareOp::GtEq => n >= lit,
            CompareOp::LtEq => n <= lit,
            CompareOp::Contains => false,
        },
        (ResolvedValue::Bool(b), Literal::Bool(lit)) => match op {
            CompareOp::Eq => b == lit,
            CompareOp::NotEq => b != lit,
            _ => false,
        },
        (ResolvedValue::List(items), literal) => match op {
            // Element membership, type-aware like scalar equality.
            CompareOp::Contains => items
                .iter()
                .any(|item| compare(item, CompareOp::Eq, literal)),
            _ => false,
        },
        // Cross-type comparisons never match: a string "5" is not the
        // number 5.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use diorama_schema::SchemaRegistry;

    fn test_registry() -> SchemaRegistry {
        SchemaRegistry::load_str(
            r#"
[component.transform.fields]
position = { type = "vec3", default = [0.0, 0.0, 0.0] }

[component.door.fields]
locked = { type = "bool", default = false }
open_angle = { type = "f32", default = 0.0 }

[component.tags.fields]
labels = { type = "array", element = "string", default = [] }

[archetype.room]
components = ["transform"]

[archetype.door]
components = ["transform", "door"]
"#,
            "test.toml",
        )
        .unwrap()
    }

    fn test_scene() -> Scene {
        Scene::load_str(
            r#"
[scene]
name = "tavern"

[entities.main_hall]
archetype = "room"

[entities.storage_door]
archetype = "door"
parent = "main_hall"

[entities.storage_door.door]
locked = true
open_angle = 5.0

[entities.storage_door.tags]
labels = ["interior", "wood"]

[entities.kitchen_door]
archetype = "door"

[entities.kitchen_door.door]
locked = false

[entities.kitchen_door.transform]
position = [2.5, 1.0, -3.5]
"#,
            &test_registry(),
        )
        .unwrap()
    }

    fn names(scene: &Scene, outcome: QueryOutcome) -> Vec<String> {
        match outcome {
            QueryOutcome::Entities(ids) => ids
                .into_iter()
                .map(|id| scene.entity(id).unwrap().name.clone())
                .collect(),
            QueryOutcome::Components(names) => names,
        }
    }

    fn run(scene: &Scene, text: &str) -> Vec<String> {
        names(scene, evaluate(&parse(text).unwrap(), scene))
    }

    #[test]
    fn test_bare_query_returns_all_in_declaration_order() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "entities"),
            vec!["main_hall", "storage_door", "kitchen_door"]
        );
    }

    #[test]
    fn test_filter_by_archetype() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "entities where archetype == 'door'"),
            vec!["storage_door", "kitchen_door"]
        );
        // Rooms exclude both doors.
        assert_eq!(
            run(&scene, "entities where archetype == 'room'"),
            vec!["main_hall"]
        );
    }

    #[test]
    fn test_filter_by_component_field() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "entities where door.locked == true"),
            vec!["storage_door"]
        );
        assert_eq!(
            run(&scene, "entities where door.locked == false"),
            vec!["kitchen_door"]
        );
    }

    #[test]
    fn test_missing_path_excludes_entity() {
        let scene = test_scene();
        // main_hall has no door component; it is excluded, not an error.
        assert_eq!(
            run(&scene, "entities where door.locked != true"),
            vec!["kitchen_door"]
        );
        assert!(run(&scene, "entities where window.tint == 1").is_empty());
    }

    #[test]
    fn test_name_and_parent_builtins() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "entities where name contains 'door'"),
            vec!["storage_door", "kitchen_door"]
        );
        assert_eq!(
            run(&scene, "entities where parent == 'main_hall'"),
            vec!["storage_door"]
        );
    }

    #[test]
    fn test_component_existence_path() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "entities where tags == true"),
            vec!["storage_door"]
        );
    }

    #[test]
    fn test_numeric_equality_across_int_and_float() {
        let scene = test_scene();
        // The literal 5 matches the stored 5.0.
        assert_eq!(
            run(&scene, "entities where door.open_angle == 5"),
            vec!["storage_door"]
        );
        // But the string '5' does not.
        assert!(run(&scene, "entities where door.open_angle == '5'").is_empty());
    }

    #[test]
    fn test_numeric_ordering() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "entities where door.open_angle > 1"),
            vec!["storage_door"]
        );
        assert_eq!(
            run(&scene, "entities where door.open_angle <= 0"),
            vec!["kitchen_door"]
        );
    }

    #[test]
    fn test_numeric_operator_on_non_numeric_is_no_match() {
        let scene = test_scene();
        assert!(run(&scene, "entities where name > 5").is_empty());
        assert!(run(&scene, "entities where door.locked >= 1").is_empty());
    }

    #[test]
    fn test_vec3_subfield() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "entities where transform.position.y == 1"),
            vec!["kitchen_door"]
        );
        assert_eq!(
            run(&scene, "entities where transform.position.z < 0"),
            vec!["kitchen_door"]
        );
        // A bare vec3 field has no comparison meaning.
        assert!(run(&scene, "entities where transform.position == 1").is_empty());
    }

    #[test]
    fn test_contains_on_arrays() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "entities where tags.labels contains 'wood'"),
            vec!["storage_door"]
        );
        assert!(run(&scene, "entities where tags.labels contains 'stone'").is_empty());
    }

    #[test]
    fn test_components_resource() {
        let scene = test_scene();
        assert_eq!(
            run(&scene, "components"),
            vec!["door", "tags", "transform"]
        );
    }

    #[test]
    fn test_evaluation_is_total() {
        // Every syntactically valid predicate evaluates to match or
        // no-match on every entity; none of these can error.
        let scene = test_scene();
        for text in [
            "entities where archetype == 'door'",
            "entities where archetype == 5",
            "entities where name > 5",
            "entities where parent contains 3",
            "entities where door.locked contains 'x'",
            "entities where door.open_angle contains 1",
            "entities where missing.path.here.deep == true",
            "entities where transform.position.w == 1",
            "entities where tags.labels > 2",
        ] {
            let query = parse(text).unwrap();
            let _ = evaluate(&query, &scene);
        }
    }
}

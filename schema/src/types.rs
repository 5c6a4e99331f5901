//! Schema definition types.

use diorama_core::{FieldValue, Fields};
use indexmap::IndexMap;

/// The declared type of a component field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Bool,
    I32,
    F32,
    String,
    Vec3,
    /// Enumerated string with a fixed set of allowed values.
    Enum { values: Vec<String> },
    /// Name-based reference to another entity.
    EntityRef,
    /// Ordered sequence of a single element type.
    Array { element: Box<FieldType> },
}

impl FieldType {
    /// Returns the type name as written in schema documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::I32 => "i32",
            FieldType::F32 => "f32",
            FieldType::String => "string",
            FieldType::Vec3 => "vec3",
            FieldType::Enum { .. } => "enum",
            FieldType::EntityRef => "entity_ref",
            FieldType::Array { .. } => "array",
        }
    }

    /// Check whether a value already has this declared type's shape.
    /// Coercions (int-to-float, string-to-enum) are handled by
    /// [`FieldDef::coerce`]; this is the strict check.
    pub fn matches(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldType::Bool, FieldValue::Bool(_)) => true,
            (FieldType::I32, FieldValue::Int(_)) => true,
            (FieldType::F32, FieldValue::Float(_)) => true,
            (FieldType::String, FieldValue::String(_)) => true,
            (FieldType::Vec3, FieldValue::Vec3(_)) => true,
            (FieldType::Enum { values }, FieldValue::Enum(v)) => values.contains(v),
            (FieldType::EntityRef, FieldValue::EntityRef(_)) => true,
            (FieldType::Array { element }, FieldValue::Array(items)) => {
                items.iter().all(|item| element.matches(item))
            }
            _ => false,
        }
    }
}

/// Schema for a single field within a component.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub field_type: FieldType,
    /// Default value. Every field either has one or is `required`.
    pub default: Option<FieldValue>,
    pub required: bool,
    pub description: Option<String>,
    /// Inclusive lower bound for numeric fields.
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric fields.
    pub max: Option<f64>,
}

impl FieldDef {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            default: None,
            required: false,
            description: None,
            min: None,
            max: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Schema definition for a component.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    pub name: String,
    pub description: Option<String>,
    /// Field definitions, in declaration order.
    pub fields: IndexMap<String, FieldDef>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    /// Get a field definition by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Iterate field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }

    /// Field defaults in declaration order (required-only fields are
    /// absent until provided by an archetype or entity).
    pub fn default_fields(&self) -> Fields {
        let mut fields = Fields::new();
        for (name, def) in &self.fields {
            if let Some(default) = &def.default {
                fields.insert(name.clone(), default.clone());
            }
        }
        fields
    }
}

/// Schema definition for an archetype: a named bundle of components with
/// per-component default overrides.
#[derive(Debug, Clone)]
pub struct ArchetypeDef {
    pub name: String,
    pub description: Option<String>,
    /// Component names this archetype bundles, in declaration order.
    pub components: Vec<String>,
    /// Per-component field overrides, already decoded and type-checked.
    pub defaults: IndexMap<String, Fields>,
}

impl ArchetypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            components: Vec::new(),
            defaults: IndexMap::new(),
        }
    }

    /// Check whether this archetype bundles the named component.
    pub fn has_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_core::Vec3;

    #[test]
    fn test_field_type_matches() {
        assert!(FieldType::Bool.matches(&FieldValue::Bool(true)));
        assert!(FieldType::I32.matches(&FieldValue::Int(5)));
        assert!(FieldType::F32.matches(&FieldValue::Float(5.0)));
        assert!(!FieldType::F32.matches(&FieldValue::Int(5)));
        assert!(FieldType::Vec3.matches(&FieldValue::Vec3(Vec3::ZERO)));
        assert!(!FieldType::Bool.matches(&FieldValue::String("true".into())));
    }

    #[test]
    fn test_enum_matches_only_members() {
        let ty = FieldType::Enum {
            values: vec!["hinged".into(), "sliding".into()],
        };
        assert!(ty.matches(&FieldValue::Enum("hinged".into())));
        assert!(!ty.matches(&FieldValue::Enum("revolving".into())));
        // Plain strings go through coercion, not the strict check.
        assert!(!ty.matches(&FieldValue::String("hinged".into())));
    }

    #[test]
    fn test_array_matches_elementwise() {
        let ty = FieldType::Array {
            element: Box::new(FieldType::I32),
        };
        assert!(ty.matches(&FieldValue::Array(vec![
            FieldValue::Int(1),
            FieldValue::Int(2),
        ])));
        assert!(!ty.matches(&FieldValue::Array(vec![
            FieldValue::Int(1),
            FieldValue::Bool(false),
        ])));
    }

    #[test]
    fn test_component_default_fields_skip_required() {
        let mut component = ComponentDef::new("door");
        component.fields.insert(
            "locked".into(),
            FieldDef::new(FieldType::Bool).with_default(false),
        );
        component
            .fields
            .insert("style".into(), FieldDef::new(FieldType::String).required());

        let defaults = component.default_fields();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults.get("locked"), Some(&FieldValue::Bool(false)));
    }
}

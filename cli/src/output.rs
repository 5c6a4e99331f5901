//! Output formatting shared by the commands.

use diorama_core::FieldValue;
use diorama_scene::{Entity, Scene};
use serde::Serialize;

/// One entity as presented in query and list output.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub components: Vec<String>,
}

impl EntitySummary {
    pub fn from_entity(scene: &Scene, entity: &Entity) -> Self {
        Self {
            name: entity.name.clone(),
            archetype: entity.archetype.clone(),
            parent: entity
                .parent
                .and_then(|id| scene.entity(id))
                .map(|parent| parent.name.clone()),
            components: entity.component_names().map(String::from).collect(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut line = self.name.clone();
        if let Some(archetype) = &self.archetype {
            line.push_str(&format!(" ({})", archetype));
        }
        if let Some(parent) = &self.parent {
            line.push_str(&format!(" parent={}", parent));
        }
        line
    }
}

/// Wrapper so the TOML rendering has a top-level key.
#[derive(Serialize)]
pub struct EntityList {
    pub entities: Vec<EntitySummary>,
}

/// Full entity detail for `entity show`: the summary plus component data
/// in document shape.
#[derive(Serialize)]
pub struct EntityDetails {
    #[serde(flatten)]
    pub summary: EntitySummary,
    pub data: toml::value::Table,
}

impl EntityDetails {
    pub fn from_entity(scene: &Scene, entity: &Entity) -> Self {
        let mut data = toml::value::Table::new();
        for (comp_name, fields) in &entity.components {
            let mut table = toml::value::Table::new();
            for (field_name, value) in fields {
                table.insert(field_name.clone(), diorama_schema::encode_value(value));
            }
            data.insert(comp_name.clone(), toml::Value::Table(table));
        }
        Self {
            summary: EntitySummary::from_entity(scene, entity),
            data,
        }
    }
}

/// Render a field value as JSON.
pub fn field_value_json(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Bool(b) => serde_json::Value::Bool(*b),
        FieldValue::Int(i) => serde_json::Value::from(*i),
        FieldValue::Float(f) => serde_json::Value::from(diorama_schema::widen_f32(*f)),
        FieldValue::String(s) | FieldValue::Enum(s) | FieldValue::EntityRef(s) => {
            serde_json::Value::String(s.clone())
        }
        FieldValue::Vec3(v) => serde_json::json!([v.x, v.y, v.z]),
        FieldValue::Array(items) => {
            serde_json::Value::Array(items.iter().map(field_value_json).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_core::Vec3;

    #[test]
    fn test_field_value_json_shapes() {
        assert_eq!(field_value_json(&FieldValue::Bool(true)), serde_json::json!(true));
        assert_eq!(field_value_json(&FieldValue::Int(5)), serde_json::json!(5));
        assert_eq!(
            field_value_json(&FieldValue::Enum("hinged".into())),
            serde_json::json!("hinged")
        );
        assert_eq!(
            field_value_json(&FieldValue::Vec3(Vec3::new(1.0, 2.0, 3.0))),
            serde_json::json!([1.0, 2.0, 3.0])
        );
    }
}

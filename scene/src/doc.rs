//! Scene document layer - the raw on-disk TOML shape.
//!
//! The document tree is untyped: component fields are plain TOML values.
//! The store interprets them against the schema registry on load and
//! produces them from typed values on save. Key order is preserved in
//! both directions, which is what makes idempotent saves byte-stable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root structure of a scene TOML document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDoc {
    pub scene: SceneMeta,
    #[serde(default)]
    pub entities: IndexMap<String, EntityDoc>,
}

/// Scene metadata, the `[scene]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMeta {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// One entity in a scene document. Every key other than `archetype` and
/// `parent` is a component table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub components: IndexMap<String, toml::Value>,
}

impl SceneDoc {
    /// Create an empty document for a named scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneMeta {
                name: name.into(),
                version: default_version(),
                description: None,
            },
            entities: IndexMap::new(),
        }
    }

    /// Parse a document from TOML text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Serialize the document to TOML text.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAVERN: &str = r#"
[scene]
name = "tavern"

[entities.main_hall]
archetype = "room"

[entities.storage_door]
archetype = "door"
parent = "main_hall"

[entities.storage_door.door]
locked = true
"#;

    #[test]
    fn test_parse_scene_doc() {
        let doc = SceneDoc::parse(TAVERN).unwrap();
        assert_eq!(doc.scene.name, "tavern");
        assert_eq!(doc.scene.version, "1.0");
        assert_eq!(doc.entities.len(), 2);

        let door = &doc.entities["storage_door"];
        assert_eq!(door.archetype.as_deref(), Some("door"));
        assert_eq!(door.parent.as_deref(), Some("main_hall"));
        assert!(door.components.contains_key("door"));
    }

    #[test]
    fn test_entities_keep_declaration_order() {
        let doc = SceneDoc::parse(TAVERN).unwrap();
        let names: Vec<&str> = doc.entities.keys().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["main_hall", "storage_door"]);
    }

    #[test]
    fn test_serialize_parse_is_stable() {
        let doc = SceneDoc::parse(TAVERN).unwrap();
        let first = doc.to_toml_string().unwrap();
        let second = SceneDoc::parse(&first).unwrap().to_toml_string().unwrap();
        assert_eq!(first, second);
    }
}

//! Scene saving.
//!
//! Serialization goes through the document layer in stored order, so an
//! unchanged store always produces identical bytes. The file is written
//! to a temporary sibling and atomically renamed over the destination;
//! a failed write never corrupts the existing file.

use crate::{EntityDoc, SaveError, Scene, SceneDoc, SceneMeta};
use diorama_schema::encode_value;
use std::io::Write;
use std::path::Path;

impl Scene {
    /// Build the document tree for this scene, in stored order.
    pub fn to_doc(&self) -> SceneDoc {
        let mut doc = SceneDoc {
            scene: SceneMeta {
                name: self.name.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
            },
            entities: indexmap::IndexMap::new(),
        };

        for entity in self.entities() {
            let mut entity_doc = EntityDoc {
                archetype: entity.archetype.clone(),
                parent: entity
                    .parent
                    .and_then(|id| self.entity(id))
                    .map(|parent| parent.name.clone()),
                components: indexmap::IndexMap::new(),
            };
            for (comp_name, fields) in &entity.components {
                let mut table = toml::map::Map::new();
                for (field_name, value) in fields {
                    table.insert(field_name.clone(), encode_value(value));
                }
                entity_doc
                    .components
                    .insert(comp_name.clone(), toml::Value::Table(table));
            }
            doc.entities.insert(entity.name.clone(), entity_doc);
        }

        doc
    }

    /// Serialize the scene to TOML text.
    pub fn to_toml_string(&self) -> Result<String, SaveError> {
        self.to_doc()
            .to_toml_string()
            .map_err(|e| SaveError::Serialize(e.to_string()))
    }

    /// Write the scene to a file, atomically replacing any existing one.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))
            .map_err(|source| SaveError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        tmp.write_all(content.as_bytes())
            .map_err(|source| SaveError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        tmp.persist(path).map_err(|e| SaveError::Io {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        log::debug!("saved scene '{}' to {}", self.name, path.display());
        Ok(())
    }
}

//! The scene store - validated entity graph for one loaded scene.

use crate::{Entity, LoadError, LoadResult, MutationError, MutationResult, SceneDoc};
use diorama_core::{ComponentData, EntityId, FieldValue, Fields};
use diorama_schema::{ComponentDef, SchemaRegistry};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One loaded scene: metadata plus the full set of entities forming a
/// forest. Entities live in a flat arena keyed by [`EntityId`] and
/// iterate in declaration order; parent/child relations are id edges.
///
/// The store is built whole by [`Scene::load`] or grown through the
/// schema-checked mutation API. Reload is "replace, don't patch": build a
/// new instance and swap the handle.
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    entities: IndexMap<EntityId, Entity>,
    names: HashMap<String, EntityId>,
    next_id: u32,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1.0".to_string(),
            description: None,
            entities: IndexMap::new(),
            names: HashMap::new(),
            next_id: 1,
        }
    }

    /// Load and validate a scene file. Fails atomically: on any error no
    /// scene is returned and a previously loaded instance stays usable.
    pub fn load<P: AsRef<Path>>(path: P, registry: &SchemaRegistry) -> LoadResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Self::load_str_origin(&content, registry, path)?;
        log::info!(
            "loaded scene '{}' from {}: {} entities",
            scene.name,
            path.display(),
            scene.len()
        );
        Ok(scene)
    }

    /// Load a scene from TOML text.
    pub fn load_str(content: &str, registry: &SchemaRegistry) -> LoadResult<Self> {
        Self::load_str_origin(content, registry, Path::new("<string>"))
    }

    fn load_str_origin(
        content: &str,
        registry: &SchemaRegistry,
        origin: &Path,
    ) -> LoadResult<Self> {
        let doc = SceneDoc::parse(content).map_err(|e| LoadError::Parse {
            path: origin.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_doc(&doc, registry)
    }

    /// Build a validated scene from a parsed document.
    pub fn from_doc(doc: &SceneDoc, registry: &SchemaRegistry) -> LoadResult<Self> {
        let mut scene = Self::new(doc.scene.name.clone());
        scene.version = doc.scene.version.clone();
        scene.description = doc.scene.description.clone();

        // First pass: create every entity so forward parent references
        // resolve regardless of declaration order.
        for name in doc.entities.keys() {
            if scene.names.contains_key(name) {
                return Err(LoadError::DuplicateName { name: name.clone() });
            }
            let id = scene.alloc_id();
            scene.names.insert(name.clone(), id);
            scene.entities.insert(id, Entity::new(id, name.clone()));
        }

        // Second pass: archetype defaults, component data, parents.
        for (name, entity_doc) in &doc.entities {
            let id = scene.names[name];

            let mut components = ComponentData::new();
            if let Some(archetype) = &entity_doc.archetype {
                components =
                    registry
                        .resolve_defaults(archetype)
                        .ok_or_else(|| LoadError::UnknownArchetype {
                            entity: name.clone(),
                            archetype: archetype.clone(),
                        })?;
            }

            for (comp_name, raw) in &entity_doc.components {
                let component =
                    registry
                        .component(comp_name)
                        .ok_or_else(|| LoadError::UnknownComponent {
                            entity: name.clone(),
                            component: comp_name.clone(),
                        })?;
                let table = raw.as_table().ok_or_else(|| LoadError::TypeMismatch {
                    entity: name.clone(),
                    field: comp_name.clone(),
                    detail: "component data must be a table".to_string(),
                })?;

                let fields = components.entry(comp_name.clone()).or_insert_with(|| {
                    // Component attached directly, without the archetype:
                    // seed its schema defaults before the overrides.
                    component.default_fields()
                });
                for (field_name, raw_value) in table {
                    let qualified = format!("{}.{}", comp_name, field_name);
                    let field_def =
                        component
                            .field(field_name)
                            .ok_or_else(|| LoadError::TypeMismatch {
                                entity: name.clone(),
                                field: qualified.clone(),
                                detail: "unknown field".to_string(),
                            })?;
                    let value =
                        field_def
                            .decode(raw_value)
                            .map_err(|e| LoadError::TypeMismatch {
                                entity: name.clone(),
                                field: qualified.clone(),
                                detail: e.to_string(),
                            })?;
                    fields.insert(field_name.clone(), value);
                }
            }

            // Every attached component must satisfy its required fields.
            for (comp_name, fields) in &components {
                if let Some(component) = registry.component(comp_name) {
                    check_required(component, fields).map_err(|(field, detail)| {
                        LoadError::TypeMismatch {
                            entity: name.clone(),
                            field,
                            detail,
                        }
                    })?;
                }
            }

            let parent_id = match &entity_doc.parent {
                Some(parent_name) => Some(scene.names.get(parent_name).copied().ok_or_else(
                    || LoadError::DanglingParent {
                        entity: name.clone(),
                        parent: parent_name.clone(),
                    },
                )?),
                None => None,
            };

            let entity = scene.entities.get_mut(&id).expect("entity created in pass 1");
            entity.archetype = entity_doc.archetype.clone();
            entity.components = components;
            entity.parent = parent_id;
        }

        // Final pass: the parent relation must be a forest.
        for (id, entity) in &scene.entities {
            let mut hops = 0;
            let mut cursor = entity.parent;
            while let Some(parent_id) = cursor {
                if parent_id == *id || hops > scene.entities.len() {
                    return Err(LoadError::CyclicParent {
                        entity: entity.name.clone(),
                    });
                }
                hops += 1;
                cursor = scene.entities.get(&parent_id).and_then(|e| e.parent);
            }
        }

        Ok(scene)
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // ==================== Lookups ====================

    /// Get an entity by name.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.names.get(name).and_then(|id| self.entities.get(id))
    }

    /// Get an entity id by name.
    pub fn get_id(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Get an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Check if an entity with this name exists.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Iterate entities in declaration order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of entities in the scene.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Direct children of an entity, in declaration order.
    pub fn children_of(&self, name: &str) -> Vec<EntityId> {
        let Some(id) = self.get_id(name) else {
            return Vec::new();
        };
        self.entities
            .values()
            .filter(|e| e.parent == Some(id))
            .map(|e| e.id)
            .collect()
    }

    /// Ancestors of an entity, nearest first. Empty for roots and for
    /// unknown names.
    pub fn ancestors_of(&self, name: &str) -> Vec<EntityId> {
        let mut ancestors = Vec::new();
        let Some(entity) = self.get(name) else {
            return ancestors;
        };
        let mut cursor = entity.parent;
        while let Some(parent_id) = cursor {
            ancestors.push(parent_id);
            cursor = self.entities.get(&parent_id).and_then(|e| e.parent);
        }
        ancestors
    }

    // ==================== Mutations ====================

    /// Create an entity, seeding components from the archetype's resolved
    /// defaults and merging `overrides` field by field. All inputs are
    /// schema-checked; on any error nothing is created.
    pub fn create(
        &mut self,
        name: &str,
        archetype: Option<&str>,
        parent: Option<&str>,
        overrides: ComponentData,
        registry: &SchemaRegistry,
    ) -> MutationResult<EntityId> {
        if self.names.contains_key(name) {
            return Err(MutationError::DuplicateName(name.to_string()));
        }

        let parent_id = match parent {
            Some(parent_name) => Some(
                self.get_id(parent_name)
                    .ok_or_else(|| MutationError::MissingParent(parent_name.to_string()))?,
            ),
            None => None,
        };

        let mut components = match archetype {
            Some(arch_name) => registry
                .resolve_defaults(arch_name)
                .ok_or_else(|| MutationError::UnknownArchetype(arch_name.to_string()))?,
            None => ComponentData::new(),
        };

        for (comp_name, override_fields) in overrides {
            let component = registry
                .component(&comp_name)
                .ok_or_else(|| MutationError::UnknownComponent(comp_name.clone()))?;
            let fields = components
                .entry(comp_name.clone())
                .or_insert_with(|| component.default_fields());
            for (field_name, value) in override_fields {
                let qualified = format!("{}.{}", comp_name, field_name);
                let field_def =
                    component
                        .field(&field_name)
                        .ok_or_else(|| MutationError::UnknownField {
                            component: comp_name.clone(),
                            field: field_name.clone(),
                        })?;
                let value = field_def
                    .coerce(value)
                    .map_err(|e| MutationError::from_value_error(&qualified, e))?;
                fields.insert(field_name, value);
            }
        }

        for (comp_name, fields) in &components {
            if let Some(component) = registry.component(comp_name) {
                check_required(component, fields)
                    .map_err(|(field, detail)| MutationError::TypeMismatch { field, detail })?;
            }
        }

        let id = self.alloc_id();
        let mut entity = Entity::new(id, name);
        entity.archetype = archetype.map(String::from);
        entity.parent = parent_id;
        entity.components = components;
        self.names.insert(name.to_string(), id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Delete an entity and its entire subtree (cascade policy: children
    /// are removed with their parent). Returns false if no entity with
    /// this name exists.
    pub fn delete(&mut self, name: &str) -> bool {
        let Some(root) = self.get_id(name) else {
            return false;
        };

        let mut doomed = vec![root];
        let mut index = 0;
        while index < doomed.len() {
            let parent = doomed[index];
            doomed.extend(
                self.entities
                    .values()
                    .filter(|e| e.parent == Some(parent))
                    .map(|e| e.id),
            );
            index += 1;
        }

        for id in doomed {
            if let Some(entity) = self.entities.shift_remove(&id) {
                self.names.remove(&entity.name);
            }
        }
        true
    }

    /// Set a single component field, schema-checked. The entity is left
    /// unmodified on any error. Setting a field of a schema-known
    /// component that is not yet attached attaches it, seeded from its
    /// defaults.
    pub fn set_field(
        &mut self,
        name: &str,
        component: &str,
        field: &str,
        value: FieldValue,
        registry: &SchemaRegistry,
    ) -> MutationResult<()> {
        let id = self
            .get_id(name)
            .ok_or_else(|| MutationError::UnknownEntity(name.to_string()))?;
        let component_def = registry
            .component(component)
            .ok_or_else(|| MutationError::UnknownComponent(component.to_string()))?;
        let qualified = format!("{}.{}", component, field);
        let field_def = component_def
            .field(field)
            .ok_or_else(|| MutationError::UnknownField {
                component: component.to_string(),
                field: field.to_string(),
            })?;

        let value = field_def
            .coerce(value)
            .map_err(|e| MutationError::from_value_error(&qualified, e))?;

        // Stage the whole component so a failed required-field check
        // leaves the entity untouched.
        let entity = self.entities.get(&id).expect("name index consistent");
        let mut staged = entity
            .components
            .get(component)
            .cloned()
            .unwrap_or_else(|| component_def.default_fields());
        staged.insert(field.to_string(), value);
        check_required(component_def, &staged)
            .map_err(|(field, detail)| MutationError::TypeMismatch { field, detail })?;

        self.entities
            .get_mut(&id)
            .expect("name index consistent")
            .components
            .insert(component.to_string(), staged);
        Ok(())
    }

    /// Re-parent an entity (or detach it with `None`). Rejects unknown
    /// names and any assignment that would make the entity its own
    /// ancestor.
    pub fn set_parent(&mut self, name: &str, parent: Option<&str>) -> MutationResult<()> {
        let id = self
            .get_id(name)
            .ok_or_else(|| MutationError::UnknownEntity(name.to_string()))?;

        let parent_id = match parent {
            Some(parent_name) => {
                let parent_id = self
                    .get_id(parent_name)
                    .ok_or_else(|| MutationError::MissingParent(parent_name.to_string()))?;
                if parent_id == id || self.ancestors_of(parent_name).contains(&id) {
                    return Err(MutationError::CyclicParent {
                        entity: name.to_string(),
                    });
                }
                Some(parent_id)
            }
            None => None,
        };

        self.entities
            .get_mut(&id)
            .expect("name index consistent")
            .parent = parent_id;
        Ok(())
    }
}

/// Check that every required field of a component is present.
fn check_required(component: &ComponentDef, fields: &Fields) -> Result<(), (String, String)> {
    for (field_name, def) in &component.fields {
        if def.required && !fields.contains_key(field_name) {
            return Err((
                format!("{}.{}", component.name, field_name),
                "missing required field".to_string(),
            ));
        }
    }
    Ok(())
}

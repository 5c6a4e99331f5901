//! Entity structure.

use diorama_core::{ComponentData, EntityId, FieldValue, Fields};

/// A uniquely named node in a scene's hierarchy, optionally typed by an
/// archetype and optionally parented to another entity. Component data is
/// owned by the scene store; parent links are id-to-id edges resolved by
/// lookup, never owning pointers.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub archetype: Option<String>,
    pub parent: Option<EntityId>,
    /// Component data in attachment order: component name -> fields.
    pub components: ComponentData,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            archetype: None,
            parent: None,
            components: ComponentData::new(),
        }
    }

    /// Check if a component is attached.
    pub fn has_component(&self, component: &str) -> bool {
        self.components.contains_key(component)
    }

    /// Get a component's fields.
    pub fn component(&self, component: &str) -> Option<&Fields> {
        self.components.get(component)
    }

    /// Get a single field value.
    pub fn field(&self, component: &str, field: &str) -> Option<&FieldValue> {
        self.components.get(component).and_then(|f| f.get(field))
    }

    /// Iterate attached component names in attachment order.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(|s| s.as_str())
    }
}

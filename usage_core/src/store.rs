//! Document store interface
//!
//! The engine never talks to persistence directly; all reads and writes go
//! through this narrow trait. The in-memory implementation backs the tests
//! and counts calls so atomicity can be asserted.

use std::collections::BTreeMap;

use thiserror::Error;

use effect_core::{Entity, EntityId, UpdateMap};

/// Error surfaced by a document store write
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no document with id '{0}'")]
    NotFound(EntityId),
    #[error("store rejected the write: {0}")]
    Rejected(String),
}

/// External document store contract.
pub trait DocumentStore {
    fn get(&self, id: &EntityId) -> Option<Entity>;
    fn update(&mut self, id: &EntityId, fields: &UpdateMap) -> Result<(), StoreError>;
    fn delete(&mut self, id: &EntityId) -> Result<(), StoreError>;
    fn create(&mut self, entity: Entity) -> Result<EntityId, StoreError>;
}

/// In-memory store for hosts-in-tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: BTreeMap<EntityId, Entity>,
    pub update_calls: usize,
    pub delete_calls: usize,
    pub create_calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn with(mut self, entity: Entity) -> Self {
        self.insert(entity);
        self
    }

    /// Total mutating calls issued so far.
    pub fn write_calls(&self) -> usize {
        self.update_calls + self.delete_calls + self.create_calls
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, id: &EntityId) -> Option<Entity> {
        self.entities.get(id).cloned()
    }

    fn update(&mut self, id: &EntityId, fields: &UpdateMap) -> Result<(), StoreError> {
        self.update_calls += 1;
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        entity.apply_updates(fields);
        Ok(())
    }

    fn delete(&mut self, id: &EntityId) -> Result<(), StoreError> {
        self.delete_calls += 1;
        self.entities
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn create(&mut self, entity: Entity) -> Result<EntityId, StoreError> {
        self.create_calls += 1;
        let id = entity.id.clone();
        self.entities.insert(id.clone(), entity);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effect_core::{EntityKind, FieldValue};

    #[test]
    fn update_applies_the_batch_and_counts() {
        let mut store = MemoryStore::new().with(
            Entity::new("sword", EntityKind::Item)
                .with_field("quantity", FieldValue::Number(2.0)),
        );
        let mut updates = UpdateMap::new();
        updates.insert("quantity".to_string(), FieldValue::Number(1.0));
        store.update(&"sword".into(), &updates).unwrap();

        assert_eq!(store.get(&"sword".into()).unwrap().num("quantity"), Some(1.0));
        assert_eq!(store.update_calls, 1);
    }

    #[test]
    fn missing_document_is_an_error() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.delete(&"ghost".into()),
            Err(StoreError::NotFound(_))
        ));
    }
}

//! Entity snapshots addressed by dotted field paths
//!
//! Entities are cheap, owned snapshots of host documents. The engine never
//! mutates a live document graph; changes travel as explicit
//! `field path -> value` maps ([`UpdateMap`]) that the host applies as one
//! batch per entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::value::FieldValue;

/// Durable identifier for an actor, item, or companion document.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

/// The addressable document kinds this engine works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Actor,
    Item,
    /// A deployed companion entity (mount, drone, vehicle) that carries its
    /// own resource pools.
    Companion,
}

/// A batch of field updates for one entity, keyed by dotted path.
pub type UpdateMap = BTreeMap<String, FieldValue>;

/// An addressable record (actor, item, or companion) with typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    #[serde(default)]
    pub name: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: String::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, path: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(path.into(), value);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.fields.get(path)
    }

    pub fn set(&mut self, path: impl Into<String>, value: FieldValue) {
        self.fields.insert(path.into(), value);
    }

    /// Numeric accessor; booleans coerce to 0/1.
    pub fn num(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(FieldValue::as_number)
    }

    pub fn flag(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(FieldValue::as_bool)
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(FieldValue::as_text)
    }

    /// Apply a batch of updates, replacing each targeted field.
    pub fn apply_updates(&mut self, updates: &UpdateMap) {
        for (path, value) in updates {
            self.fields.insert(path.clone(), value.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_replace_fields_as_one_batch() {
        let mut actor = Entity::new("a1", EntityKind::Actor)
            .with_field("hp.value", FieldValue::Number(10.0))
            .with_field("hp.max", FieldValue::Number(10.0));

        let mut updates = UpdateMap::new();
        updates.insert("hp.value".to_string(), FieldValue::Number(7.0));
        actor.apply_updates(&updates);

        assert_eq!(actor.num("hp.value"), Some(7.0));
        assert_eq!(actor.num("hp.max"), Some(10.0));
    }
}

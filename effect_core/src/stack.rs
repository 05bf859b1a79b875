//! Effect stacks and derivation
//!
//! An [`EffectStack`] is the ordered collection of effect records attached
//! to one entity. Folding it produces a derived snapshot: the entity with
//! every active modifier applied, plus the accumulated change map so callers
//! can apply it explicitly.

use crate::apply::{self, CustomApply};
use crate::entity::{Entity, EntityId, UpdateMap};
use crate::modifier::{EffectRecord, Modifier, OriginState};
use crate::schema::FieldKindResolver;

/// A derived view of an entity: the patched clone plus the change map that
/// produced it. The source entity is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSnapshot {
    pub entity: Entity,
    pub changes: UpdateMap,
}

/// Ordered, id-addressed collection of effect records.
///
/// Records keep insertion order; removal is by durable id, never by
/// position, so concurrent edits cannot shift which record an id names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectStack {
    records: Vec<EffectRecord>,
}

impl EffectStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A record with an id already present replaces the
    /// existing one in place, keeping its position in the order.
    pub fn add(&mut self, record: EffectRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => self.records.push(record),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<EffectRecord> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&EffectRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut EffectRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &EffectRecord> {
        self.records.iter()
    }

    /// Recompute every record's derived `suppressed` flag from its origin's
    /// current owning state. Records without an origin are never suppressed.
    pub fn recompute_suppression<F>(&mut self, origin_state: F)
    where
        F: Fn(&EntityId) -> OriginState,
    {
        for record in &mut self.records {
            record.suppressed = record
                .origin
                .as_ref()
                .map(|origin| origin_state(origin).suppresses())
                .unwrap_or(false);
        }
    }

    /// Fold the stack onto an entity, producing a derived snapshot.
    ///
    /// Suppression is recomputed first, then every active modifier is
    /// applied in (effective priority, insertion order). A modifier that
    /// fails to apply (unknown field kind, malformed delta, unsupported
    /// mode) is logged and skipped; it never aborts the stack.
    pub fn derive<F>(
        &mut self,
        entity: &Entity,
        resolver: &FieldKindResolver<'_>,
        origin_state: F,
    ) -> DerivedSnapshot
    where
        F: Fn(&EntityId) -> OriginState,
    {
        self.derive_with(entity, resolver, origin_state, None)
    }

    /// [`EffectStack::derive`] with a caller-supplied `Custom` mode handler.
    pub fn derive_with<F>(
        &mut self,
        entity: &Entity,
        resolver: &FieldKindResolver<'_>,
        origin_state: F,
        custom: Option<CustomApply<'_>>,
    ) -> DerivedSnapshot
    where
        F: Fn(&EntityId) -> OriginState,
    {
        self.recompute_suppression(origin_state);

        let mut ordered: Vec<&Modifier> = self
            .records
            .iter()
            .filter(|r| r.active())
            .flat_map(|r| r.modifiers.iter())
            .collect();
        // Stable sort: insertion order is the tie-break.
        ordered.sort_by_key(|m| m.effective_priority());

        let mut changes = UpdateMap::new();
        for modifier in ordered {
            let path = modifier.target_path.as_str();
            let kind = resolver.resolve(path);
            let current = changes.get(path).or_else(|| entity.get(path));
            match apply::apply_with(&kind, modifier.mode, current, &modifier.value, custom) {
                Ok(value) => {
                    changes.insert(path.to_string(), value);
                }
                Err(err) => {
                    tracing::warn!(%err, path, "skipping modifier");
                }
            }
        }

        let mut derived = entity.clone();
        derived.apply_updates(&changes);
        DerivedSnapshot {
            entity: derived,
            changes,
        }
    }
}

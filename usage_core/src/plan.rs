//! Consumption plans
//!
//! The verified, not-yet-committed set of field updates produced by the
//! ledger. Pure data: nothing here touches the store.

use effect_core::{EntityId, FieldValue, UpdateMap};

/// All updates one invocation will commit, grouped per entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionPlan {
    /// Updates to the acting item.
    pub item_updates: UpdateMap,
    /// Updates to the owning actor.
    pub actor_updates: UpdateMap,
    /// Updates to the deployed companion, when one is involved.
    pub companion_updates: UpdateMap,
    /// Batched updates to other items (ammunition, class hit-dice
    /// trackers, charge-bearing items), keyed by durable id.
    pub other_item_updates: Vec<(EntityId, UpdateMap)>,
    /// The acting item's quantity resolved to zero on an auto-destroy
    /// item; the committer deletes it after writing its updates.
    pub delete_item: bool,
}

impl ConsumptionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.item_updates.is_empty()
            && self.actor_updates.is_empty()
            && self.companion_updates.is_empty()
            && self.other_item_updates.is_empty()
            && !self.delete_item
    }

    /// Merge an update for another item, reusing the entry for an id that
    /// is already present.
    pub fn push_other(&mut self, id: &EntityId, path: impl Into<String>, value: FieldValue) {
        match self
            .other_item_updates
            .iter_mut()
            .find(|(existing, _)| existing == id)
        {
            Some((_, updates)) => {
                updates.insert(path.into(), value);
            }
            None => {
                let mut updates = UpdateMap::new();
                updates.insert(path.into(), value);
                self.other_item_updates.push((id.clone(), updates));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_other_merges_by_id() {
        let mut plan = ConsumptionPlan::new();
        let id: EntityId = "cell".into();
        plan.push_other(&id, "quantity", FieldValue::Number(4.0));
        plan.push_other(&id, "uses.value", FieldValue::Number(1.0));
        plan.push_other(&"other".into(), "quantity", FieldValue::Number(9.0));

        assert_eq!(plan.other_item_updates.len(), 2);
        assert_eq!(plan.other_item_updates[0].1.len(), 2);
    }
}

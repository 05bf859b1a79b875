//! Transaction committer
//!
//! Writes a verified consumption plan to the document store in a fixed
//! order: the acting item, its deletion if scheduled, the actor, the
//! companion, then every other touched item. Ordering is deterministic so
//! replays of the same plan issue the same write sequence.

use tracing::debug;

use effect_core::EntityId;

use crate::plan::ConsumptionPlan;
use crate::store::{DocumentStore, StoreError};

/// Durable ids of the entities a plan's update groups refer to.
#[derive(Debug, Clone)]
pub struct CommitIds {
    pub item: EntityId,
    pub actor: EntityId,
    pub companion: Option<EntityId>,
}

/// Write every update group of the plan to the store.
///
/// Verification has already passed by the time this runs, so a failing
/// write here is a store-level fault; it is returned as-is and earlier
/// writes of the same plan are not rolled back.
pub fn commit(
    plan: &ConsumptionPlan,
    ids: &CommitIds,
    store: &mut dyn DocumentStore,
) -> Result<(), StoreError> {
    if !plan.item_updates.is_empty() {
        debug!(item = %ids.item, updates = plan.item_updates.len(), "committing item updates");
        store.update(&ids.item, &plan.item_updates)?;
    }
    if plan.delete_item {
        debug!(item = %ids.item, "deleting spent item");
        store.delete(&ids.item)?;
    }
    if !plan.actor_updates.is_empty() {
        debug!(actor = %ids.actor, updates = plan.actor_updates.len(), "committing actor updates");
        store.update(&ids.actor, &plan.actor_updates)?;
    }
    if !plan.companion_updates.is_empty() {
        match &ids.companion {
            Some(companion) => {
                debug!(companion = %companion, "committing companion updates");
                store.update(companion, &plan.companion_updates)?;
            }
            None => {
                return Err(StoreError::Rejected(
                    "plan carries companion updates but no companion id".to_string(),
                ))
            }
        }
    }
    for (id, updates) in &plan.other_item_updates {
        debug!(item = %id, updates = updates.len(), "committing linked item updates");
        store.update(id, updates)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use effect_core::{Entity, EntityKind, FieldValue};

    fn ids() -> CommitIds {
        CommitIds {
            item: "wand".into(),
            actor: "hero".into(),
            companion: None,
        }
    }

    #[test]
    fn empty_plan_issues_no_writes() {
        let mut store = MemoryStore::new();
        commit(&ConsumptionPlan::new(), &ids(), &mut store).unwrap();
        assert_eq!(store.write_calls(), 0);
    }

    #[test]
    fn commits_every_group_and_deletes_spent_items() {
        let mut store = MemoryStore::new()
            .with(Entity::new("wand", EntityKind::Item).with_field("uses.value", FieldValue::Number(1.0)))
            .with(Entity::new("hero", EntityKind::Actor).with_field("points.value", FieldValue::Number(4.0)))
            .with(Entity::new("cell", EntityKind::Item).with_field("quantity", FieldValue::Number(2.0)));

        let mut plan = ConsumptionPlan::new();
        plan.item_updates
            .insert("uses.value".to_string(), FieldValue::Number(0.0));
        plan.actor_updates
            .insert("points.value".to_string(), FieldValue::Number(3.0));
        plan.push_other(&"cell".into(), "quantity", FieldValue::Number(1.0));
        plan.delete_item = true;

        commit(&plan, &ids(), &mut store).unwrap();

        assert!(store.get(&"wand".into()).is_none());
        assert_eq!(store.get(&"hero".into()).unwrap().num("points.value"), Some(3.0));
        assert_eq!(store.get(&"cell".into()).unwrap().num("quantity"), Some(1.0));
        assert_eq!(store.update_calls, 3);
        assert_eq!(store.delete_calls, 1);
    }

    #[test]
    fn companion_updates_need_a_companion_id() {
        let mut store = MemoryStore::new();
        let mut plan = ConsumptionPlan::new();
        plan.companion_updates
            .insert("power_dice.central.value".to_string(), FieldValue::Number(1.0));
        assert!(matches!(
            commit(&plan, &ids(), &mut store),
            Err(StoreError::Rejected(_))
        ));
    }
}

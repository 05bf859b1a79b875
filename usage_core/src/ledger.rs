//! Resource ledger
//!
//! For each consumption step of an action request, resolves the concrete
//! pool(s) involved, verifies sufficiency, and accumulates the deltas into
//! a [`ConsumptionPlan`]. Verification is all-or-nothing: one failing step
//! fails the whole call and no delta from any step escapes, so the caller
//! never sees a partially-consumed invocation.

use std::fmt;

use effect_core::{Entity, FieldValue};

use crate::economy::{ConsumeTarget, HitDiceTarget, ItemEconomy, ResourceKind, SlotPool};
use crate::plan::ConsumptionPlan;
use crate::request::ActionRequest;
use crate::rules::RuleTable;
use crate::store::DocumentStore;
use crate::UsageError;

/// The consumption step an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionStep {
    Recharge,
    Reload,
    Resource(ResourceKind),
    PowerSlot,
    SpecialDie,
    Usage,
}

impl fmt::Display for ConsumptionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumptionStep::Recharge => write!(f, "recharge"),
            ConsumptionStep::Reload => write!(f, "ammunition"),
            ConsumptionStep::Resource(kind) => write!(f, "{kind}"),
            ConsumptionStep::PowerSlot => write!(f, "power slots"),
            ConsumptionStep::SpecialDie => write!(f, "superiority dice"),
            ConsumptionStep::Usage => write!(f, "item uses"),
        }
    }
}

/// Everything the ledger reads while verifying one invocation. Pool state
/// is a consistent snapshot; the ledger itself writes nothing.
pub struct LedgerContext<'a> {
    pub item: &'a Entity,
    pub actor: &'a Entity,
    /// Deployed companion entity, when one is involved.
    pub companion: Option<&'a Entity>,
    /// The actor's class-like sub-entities carrying hit-dice pools.
    pub classes: &'a [Entity],
    pub economy: &'a ItemEconomy,
    pub rules: &'a RuleTable,
}

/// Verify every requested consumption step and produce the plan.
pub fn verify(
    request: &ActionRequest,
    ctx: &LedgerContext<'_>,
    store: &dyn DocumentStore,
) -> Result<ConsumptionPlan, UsageError> {
    let mut plan = ConsumptionPlan::new();
    if request.consume_recharge {
        verify_recharge(ctx, &mut plan)?;
    }
    if request.consume_reload {
        verify_reload(ctx, store, &mut plan)?;
    }
    if request.consume_resource {
        verify_resource(ctx, store, &mut plan)?;
    }
    if request.consume_slot {
        verify_slot(request, ctx, &mut plan)?;
    }
    if request.consume_special_die {
        verify_special_die(ctx, &mut plan)?;
    }
    if request.consume_usage {
        verify_usage(request, ctx, &mut plan)?;
    }
    Ok(plan)
}

fn insufficient(step: ConsumptionStep, needed: f64, available: f64) -> UsageError {
    UsageError::Insufficient {
        step,
        needed,
        available,
    }
}

fn missing(step: ConsumptionStep, target: impl Into<String>) -> UsageError {
    UsageError::MissingTarget {
        step,
        target: target.into(),
    }
}

fn verify_recharge(ctx: &LedgerContext<'_>, plan: &mut ConsumptionPlan) -> Result<(), UsageError> {
    if !ctx.item.flag("recharge.charged").unwrap_or(false) {
        return Err(insufficient(ConsumptionStep::Recharge, 1.0, 0.0));
    }
    plan.item_updates
        .insert("recharge.charged".to_string(), FieldValue::Bool(false));
    Ok(())
}

fn verify_reload(
    ctx: &LedgerContext<'_>,
    store: &dyn DocumentStore,
    plan: &mut ConsumptionPlan,
) -> Result<(), UsageError> {
    let Some(ammo_id) = &ctx.economy.reload else {
        tracing::warn!("reload requested but no ammunition declared; skipping");
        return Ok(());
    };
    let ammo = store
        .get(ammo_id)
        .ok_or_else(|| missing(ConsumptionStep::Reload, ammo_id.to_string()))?;
    let quantity = ammo.num("quantity").unwrap_or(0.0);
    if quantity <= 0.0 {
        return Err(insufficient(ConsumptionStep::Reload, 1.0, quantity));
    }
    plan.push_other(ammo_id, "quantity", FieldValue::Number(quantity - 1.0));
    Ok(())
}

fn verify_resource(
    ctx: &LedgerContext<'_>,
    store: &dyn DocumentStore,
    plan: &mut ConsumptionPlan,
) -> Result<(), UsageError> {
    let Some(link) = &ctx.economy.consume else {
        tracing::warn!("resource consumption requested but no link declared; skipping");
        return Ok(());
    };
    let step = ConsumptionStep::Resource(link.kind);

    match (link.kind, &link.target) {
        (ResourceKind::Attribute, ConsumeTarget::Attribute(path)) => {
            let current = ctx
                .actor
                .num(path)
                .ok_or_else(|| missing(step, path.clone()))?;
            if current < link.amount {
                return Err(insufficient(step, link.amount, current));
            }
            plan.actor_updates
                .insert(path.clone(), FieldValue::Number(current - link.amount));
        }
        (ResourceKind::Ammo | ResourceKind::Material, ConsumeTarget::Item(id)) => {
            let item = store
                .get(id)
                .ok_or_else(|| missing(step, id.to_string()))?;
            let quantity = item.num("quantity").unwrap_or(0.0);
            if quantity < link.amount {
                return Err(insufficient(step, link.amount, quantity));
            }
            plan.push_other(id, "quantity", FieldValue::Number(quantity - link.amount));
        }
        (ResourceKind::HitDice, ConsumeTarget::HitDice(target)) => {
            verify_hit_dice(ctx, *target, link.amount, plan)?;
        }
        (ResourceKind::Charges, ConsumeTarget::Item(id)) => {
            let item = store
                .get(id)
                .ok_or_else(|| missing(step, id.to_string()))?;
            // An item tracks either uses or a recharge flag, never both.
            if let Some(uses) = item.num("uses.value") {
                if uses < link.amount {
                    return Err(insufficient(step, link.amount, uses));
                }
                plan.push_other(id, "uses.value", FieldValue::Number(uses - link.amount));
            } else if let Some(charged) = item.flag("recharge.charged") {
                let available = if charged { 1.0 } else { 0.0 };
                if !charged || link.amount > 1.0 {
                    return Err(insufficient(step, link.amount, available));
                }
                plan.push_other(id, "recharge.charged", FieldValue::Bool(false));
            } else {
                return Err(missing(step, id.to_string()));
            }
        }
        (ResourceKind::PowerDice, ConsumeTarget::CompanionPool(name)) => {
            verify_power_dice(ctx, name, link.amount, plan)?;
        }
        (kind, target) => {
            return Err(missing(ConsumptionStep::Resource(kind), target.to_string()));
        }
    }
    Ok(())
}

/// Greedy hit-dice consumption: sort the (optionally size-filtered) class
/// pools by die size and draw from the front until the amount is covered,
/// clamping each class's contribution to its own remaining dice.
fn verify_hit_dice(
    ctx: &LedgerContext<'_>,
    target: HitDiceTarget,
    amount: f64,
    plan: &mut ConsumptionPlan,
) -> Result<(), UsageError> {
    let step = ConsumptionStep::Resource(ResourceKind::HitDice);
    let mut classes: Vec<&Entity> = ctx.classes.iter().collect();
    match target {
        HitDiceTarget::Size(faces) => {
            classes.retain(|c| c.num("hit_dice.size") == Some(f64::from(faces)));
        }
        HitDiceTarget::Smallest => {
            classes.sort_by_key(|c| c.num("hit_dice.size").unwrap_or(0.0) as i64);
        }
        HitDiceTarget::Largest => {
            classes.sort_by_key(|c| -(c.num("hit_dice.size").unwrap_or(0.0) as i64));
        }
    }

    let mut remaining = amount;
    for class in classes {
        if remaining <= 0.0 {
            break;
        }
        let levels = class.num("levels").unwrap_or(0.0);
        let used = class.num("hit_dice.used").unwrap_or(0.0);
        let available = (levels - used).max(0.0);
        let take = available.min(remaining);
        if take > 0.0 {
            plan.push_other(&class.id, "hit_dice.used", FieldValue::Number(used + take));
            remaining -= take;
        }
    }
    if remaining > 0.0 {
        return Err(insufficient(step, amount, amount - remaining));
    }
    Ok(())
}

/// Power-die consumption with the single central fallback: when the named
/// sub-pool runs short, the whole amount is drawn from the central pool
/// instead; the fallback never cascades further.
fn verify_power_dice(
    ctx: &LedgerContext<'_>,
    name: &str,
    amount: f64,
    plan: &mut ConsumptionPlan,
) -> Result<(), UsageError> {
    let step = ConsumptionStep::Resource(ResourceKind::PowerDice);
    let companion = ctx
        .companion
        .ok_or_else(|| missing(step, "no deployed companion"))?;

    let path = format!("power_dice.{name}.value");
    let current = companion
        .num(&path)
        .ok_or_else(|| missing(step, path.clone()))?;
    if current >= amount {
        plan.companion_updates
            .insert(path, FieldValue::Number(current - amount));
        return Ok(());
    }

    let fallback = &ctx.rules.power_die_fallback;
    let fallback_path = format!("power_dice.{fallback}.value");
    let fallback_current = companion.num(&fallback_path).unwrap_or(0.0);
    if fallback_current >= amount {
        plan.companion_updates
            .insert(fallback_path, FieldValue::Number(fallback_current - amount));
        return Ok(());
    }
    Err(insufficient(step, amount, current.max(fallback_current)))
}

fn verify_slot(
    request: &ActionRequest,
    ctx: &LedgerContext<'_>,
    plan: &mut ConsumptionPlan,
) -> Result<(), UsageError> {
    let Some(slot) = &ctx.economy.slot else {
        tracing::warn!("slot consumption requested but no slot declared; skipping");
        return Ok(());
    };
    let level = request.slot_level.unwrap_or(slot.level);
    let pool_path = match &slot.pool {
        SlotPool::Leveled => format!("slots.level{level}.value"),
        SlotPool::Named(name) => format!("slots.{name}.value"),
    };
    let current = ctx
        .actor
        .num(&pool_path)
        .ok_or_else(|| missing(ConsumptionStep::PowerSlot, pool_path.clone()))?;
    if current <= 0.0 {
        return Err(insufficient(ConsumptionStep::PowerSlot, 1.0, current));
    }
    plan.actor_updates
        .insert(pool_path, FieldValue::Number(current - 1.0));

    // Innate casting debits no points.
    if !slot.innate {
        let cost = ctx.rules.slot_point_cost(level);
        let temp = ctx.actor.num("points.temp").unwrap_or(0.0);
        let value = ctx.actor.num("points.value").unwrap_or(0.0);
        let from_temp = temp.min(cost);
        let remainder = cost - from_temp;
        if from_temp > 0.0 {
            plan.actor_updates
                .insert("points.temp".to_string(), FieldValue::Number(temp - from_temp));
        }
        if remainder > 0.0 {
            plan.actor_updates.insert(
                "points.value".to_string(),
                FieldValue::Number((value - remainder).max(0.0)),
            );
        }
    }
    Ok(())
}

fn verify_special_die(
    ctx: &LedgerContext<'_>,
    plan: &mut ConsumptionPlan,
) -> Result<(), UsageError> {
    let current = ctx.actor.num("superiority.value").unwrap_or(0.0);
    if current <= 0.0 {
        return Err(insufficient(ConsumptionStep::SpecialDie, 1.0, current));
    }
    plan.actor_updates
        .insert("superiority.value".to_string(), FieldValue::Number(current - 1.0));
    Ok(())
}

fn verify_usage(
    request: &ActionRequest,
    ctx: &LedgerContext<'_>,
    plan: &mut ConsumptionPlan,
) -> Result<(), UsageError> {
    let auto_destroy = ctx
        .economy
        .uses
        .as_ref()
        .is_some_and(|u| u.auto_destroy);
    let uses = ctx.item.num("uses.value").unwrap_or(0.0);
    let max = ctx
        .item
        .num("uses.max")
        .or_else(|| ctx.economy.uses.as_ref().map(|u| u.max))
        .unwrap_or(0.0);
    let quantity = ctx.item.num("quantity").unwrap_or(0.0);

    // At least one of the two pools must have something to give.
    if uses <= 0.0 && quantity <= 0.0 {
        return Err(insufficient(ConsumptionStep::Usage, 1.0, 0.0));
    }

    let remaining = uses - 1.0;
    let draws_quantity =
        request.consume_quantity && (remaining < 0.0 || (remaining == 0.0 && auto_destroy));
    if draws_quantity {
        // One quantity draw per invocation: spend a unit and refill uses.
        if quantity <= 0.0 {
            return Err(insufficient(ConsumptionStep::Usage, 1.0, 0.0));
        }
        plan.item_updates
            .insert("quantity".to_string(), FieldValue::Number(quantity - 1.0));
        plan.item_updates
            .insert("uses.value".to_string(), FieldValue::Number(max));
        if quantity - 1.0 <= 0.0 && auto_destroy {
            plan.delete_item = true;
        }
    } else {
        if remaining < 0.0 {
            return Err(insufficient(ConsumptionStep::Usage, 1.0, uses));
        }
        plan.item_updates
            .insert("uses.value".to_string(), FieldValue::Number(remaining));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{ActionCategory, ConsumeLink, LimitedUses, RecoveryPeriod, SlotRequirement};
    use crate::store::MemoryStore;
    use effect_core::EntityKind;

    fn item() -> Entity {
        Entity::new("wand", EntityKind::Item)
    }

    fn actor() -> Entity {
        Entity::new("hero", EntityKind::Actor)
    }

    fn class(id: &str, size: f64, levels: f64, used: f64) -> Entity {
        Entity::new(id, EntityKind::Item)
            .with_field("hit_dice.size", FieldValue::Number(size))
            .with_field("levels", FieldValue::Number(levels))
            .with_field("hit_dice.used", FieldValue::Number(used))
    }

    struct Fixture {
        item: Entity,
        actor: Entity,
        companion: Option<Entity>,
        classes: Vec<Entity>,
        economy: ItemEconomy,
        rules: RuleTable,
        store: MemoryStore,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                item: item(),
                actor: actor(),
                companion: None,
                classes: Vec::new(),
                economy: ItemEconomy::new(ActionCategory::Feature),
                rules: RuleTable::default(),
                store: MemoryStore::new(),
            }
        }

        fn verify(&self, request: &ActionRequest) -> Result<ConsumptionPlan, UsageError> {
            let ctx = LedgerContext {
                item: &self.item,
                actor: &self.actor,
                companion: self.companion.as_ref(),
                classes: &self.classes,
                economy: &self.economy,
                rules: &self.rules,
            };
            verify(request, &ctx, &self.store)
        }
    }

    #[test]
    fn uncharged_recharge_fails() {
        let mut fx = Fixture::new();
        fx.item.set("recharge.charged", FieldValue::Bool(false));
        let request = ActionRequest {
            consume_recharge: true,
            ..Default::default()
        };
        assert!(matches!(
            fx.verify(&request),
            Err(UsageError::Insufficient {
                step: ConsumptionStep::Recharge,
                ..
            })
        ));
    }

    #[test]
    fn reload_decrements_the_ammo_item() {
        let mut fx = Fixture::new();
        fx.economy.reload = Some("cell".into());
        fx.store.insert(
            Entity::new("cell", EntityKind::Item).with_field("quantity", FieldValue::Number(3.0)),
        );
        let request = ActionRequest {
            consume_reload: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(
            plan.other_item_updates,
            vec![(
                "cell".into(),
                [("quantity".to_string(), FieldValue::Number(2.0))]
                    .into_iter()
                    .collect()
            )]
        );
    }

    #[test]
    fn empty_ammo_fails_reload() {
        let mut fx = Fixture::new();
        fx.economy.reload = Some("cell".into());
        fx.store.insert(
            Entity::new("cell", EntityKind::Item).with_field("quantity", FieldValue::Number(0.0)),
        );
        let request = ActionRequest {
            consume_reload: true,
            ..Default::default()
        };
        assert!(matches!(
            fx.verify(&request),
            Err(UsageError::Insufficient {
                step: ConsumptionStep::Reload,
                ..
            })
        ));
    }

    #[test]
    fn attribute_resource_debits_the_actor_path() {
        let mut fx = Fixture::new();
        fx.actor
            .set("resources.focus.value", FieldValue::Number(4.0));
        fx.economy.consume = Some(ConsumeLink {
            kind: ResourceKind::Attribute,
            target: ConsumeTarget::Attribute("resources.focus.value".to_string()),
            amount: 3.0,
        });
        let request = ActionRequest {
            consume_resource: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(
            plan.actor_updates.get("resources.focus.value"),
            Some(&FieldValue::Number(1.0))
        );
    }

    #[test]
    fn missing_attribute_is_a_distinct_error() {
        let mut fx = Fixture::new();
        fx.economy.consume = Some(ConsumeLink {
            kind: ResourceKind::Attribute,
            target: ConsumeTarget::Attribute("resources.gone.value".to_string()),
            amount: 1.0,
        });
        let request = ActionRequest {
            consume_resource: true,
            ..Default::default()
        };
        assert!(matches!(
            fx.verify(&request),
            Err(UsageError::MissingTarget { .. })
        ));
    }

    #[test]
    fn largest_hit_die_is_consumed_first() {
        let mut fx = Fixture::new();
        fx.classes = vec![class("fighter", 6.0, 2.0, 0.0), class("barbarian", 10.0, 1.0, 0.0)];
        fx.economy.consume = Some(ConsumeLink {
            kind: ResourceKind::HitDice,
            target: ConsumeTarget::HitDice(HitDiceTarget::Largest),
            amount: 1.0,
        });
        let request = ActionRequest {
            consume_resource: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(
            plan.other_item_updates,
            vec![(
                "barbarian".into(),
                [("hit_dice.used".to_string(), FieldValue::Number(1.0))]
                    .into_iter()
                    .collect()
            )]
        );
    }

    #[test]
    fn smallest_selection_spills_into_the_next_pool() {
        let mut fx = Fixture::new();
        fx.classes = vec![class("barbarian", 12.0, 3.0, 0.0), class("rogue", 8.0, 2.0, 1.0)];
        fx.economy.consume = Some(ConsumeLink {
            kind: ResourceKind::HitDice,
            target: ConsumeTarget::HitDice(HitDiceTarget::Smallest),
            amount: 3.0,
        });
        let request = ActionRequest {
            consume_resource: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        // rogue has one die left (2 levels, 1 used), barbarian covers the rest
        assert_eq!(plan.other_item_updates.len(), 2);
        assert_eq!(
            plan.other_item_updates[0],
            (
                "rogue".into(),
                [("hit_dice.used".to_string(), FieldValue::Number(2.0))]
                    .into_iter()
                    .collect()
            )
        );
        assert_eq!(
            plan.other_item_updates[1],
            (
                "barbarian".into(),
                [("hit_dice.used".to_string(), FieldValue::Number(2.0))]
                    .into_iter()
                    .collect()
            )
        );
    }

    #[test]
    fn exhausted_hit_dice_fail_with_partial_availability() {
        let mut fx = Fixture::new();
        fx.classes = vec![class("fighter", 10.0, 2.0, 1.0)];
        fx.economy.consume = Some(ConsumeLink {
            kind: ResourceKind::HitDice,
            target: ConsumeTarget::HitDice(HitDiceTarget::Largest),
            amount: 2.0,
        });
        let request = ActionRequest {
            consume_resource: true,
            ..Default::default()
        };
        match fx.verify(&request) {
            Err(UsageError::Insufficient {
                needed, available, ..
            }) => {
                assert_eq!(needed, 2.0);
                assert_eq!(available, 1.0);
            }
            other => panic!("expected insufficiency, got {other:?}"),
        }
    }

    #[test]
    fn power_dice_fall_back_to_central_once() {
        let mut fx = Fixture::new();
        fx.companion = Some(
            Entity::new("walker", EntityKind::Companion)
                .with_field("power_dice.wing.value", FieldValue::Number(0.0))
                .with_field("power_dice.central.value", FieldValue::Number(2.0)),
        );
        fx.economy.consume = Some(ConsumeLink {
            kind: ResourceKind::PowerDice,
            target: ConsumeTarget::CompanionPool("wing".to_string()),
            amount: 1.0,
        });
        let request = ActionRequest {
            consume_resource: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(
            plan.companion_updates.get("power_dice.central.value"),
            Some(&FieldValue::Number(1.0))
        );
        assert!(!plan.companion_updates.contains_key("power_dice.wing.value"));
    }

    #[test]
    fn power_dice_fail_when_both_pools_run_short() {
        let mut fx = Fixture::new();
        fx.companion = Some(
            Entity::new("walker", EntityKind::Companion)
                .with_field("power_dice.wing.value", FieldValue::Number(1.0))
                .with_field("power_dice.central.value", FieldValue::Number(1.0)),
        );
        fx.economy.consume = Some(ConsumeLink {
            kind: ResourceKind::PowerDice,
            target: ConsumeTarget::CompanionPool("wing".to_string()),
            amount: 2.0,
        });
        let request = ActionRequest {
            consume_resource: true,
            ..Default::default()
        };
        assert!(matches!(
            fx.verify(&request),
            Err(UsageError::Insufficient { .. })
        ));
    }

    #[test]
    fn slot_consumption_spends_temp_points_first() {
        let mut fx = Fixture::new();
        fx.actor.set("slots.level3.value", FieldValue::Number(2.0));
        fx.actor.set("points.temp", FieldValue::Number(3.0));
        fx.actor.set("points.value", FieldValue::Number(10.0));
        fx.economy.slot = Some(SlotRequirement {
            level: 3,
            pool: SlotPool::Leveled,
            innate: false,
        });
        let request = ActionRequest {
            consume_slot: true,
            slot_level: Some(3),
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        // cost = level + 1 = 4: 3 from temp, 1 from the permanent pool
        assert_eq!(
            plan.actor_updates.get("slots.level3.value"),
            Some(&FieldValue::Number(1.0))
        );
        assert_eq!(plan.actor_updates.get("points.temp"), Some(&FieldValue::Number(0.0)));
        assert_eq!(plan.actor_updates.get("points.value"), Some(&FieldValue::Number(9.0)));
    }

    #[test]
    fn point_debit_clamps_at_zero() {
        let mut fx = Fixture::new();
        fx.actor.set("slots.level4.value", FieldValue::Number(1.0));
        fx.actor.set("points.value", FieldValue::Number(2.0));
        fx.economy.slot = Some(SlotRequirement {
            level: 4,
            pool: SlotPool::Leveled,
            innate: false,
        });
        let request = ActionRequest {
            consume_slot: true,
            slot_level: Some(4),
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(plan.actor_updates.get("points.value"), Some(&FieldValue::Number(0.0)));
    }

    #[test]
    fn innate_casting_debits_no_points() {
        let mut fx = Fixture::new();
        fx.actor.set("slots.level2.value", FieldValue::Number(1.0));
        fx.actor.set("points.value", FieldValue::Number(10.0));
        fx.economy.slot = Some(SlotRequirement {
            level: 2,
            pool: SlotPool::Leveled,
            innate: true,
        });
        let request = ActionRequest {
            consume_slot: true,
            slot_level: Some(2),
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert!(!plan.actor_updates.contains_key("points.value"));
        assert!(!plan.actor_updates.contains_key("points.temp"));
    }

    #[test]
    fn named_slot_pool_resolves_by_name() {
        let mut fx = Fixture::new();
        fx.actor.set("slots.overcharge.value", FieldValue::Number(1.0));
        fx.economy.slot = Some(SlotRequirement {
            level: 1,
            pool: SlotPool::Named("overcharge".to_string()),
            innate: true,
        });
        let request = ActionRequest {
            consume_slot: true,
            slot_level: Some(1),
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(
            plan.actor_updates.get("slots.overcharge.value"),
            Some(&FieldValue::Number(0.0))
        );
    }

    #[test]
    fn special_die_decrements_by_exactly_one() {
        let mut fx = Fixture::new();
        fx.actor.set("superiority.value", FieldValue::Number(4.0));
        let request = ActionRequest {
            consume_special_die: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(
            plan.actor_updates.get("superiority.value"),
            Some(&FieldValue::Number(3.0))
        );

        fx.actor.set("superiority.value", FieldValue::Number(0.0));
        assert!(matches!(
            fx.verify(&request),
            Err(UsageError::Insufficient {
                step: ConsumptionStep::SpecialDie,
                ..
            })
        ));
    }

    #[test]
    fn plain_usage_decrements_uses() {
        let mut fx = Fixture::new();
        fx.item.set("uses.value", FieldValue::Number(2.0));
        fx.item.set("uses.max", FieldValue::Number(3.0));
        fx.economy.uses = Some(LimitedUses {
            max: 3.0,
            per: RecoveryPeriod::LongRest,
            auto_destroy: false,
        });
        let request = ActionRequest {
            consume_usage: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(plan.item_updates.get("uses.value"), Some(&FieldValue::Number(1.0)));
        assert!(!plan.delete_item);
    }

    #[test]
    fn last_use_on_auto_destroy_item_spends_a_unit() {
        let mut fx = Fixture::new();
        fx.item.set("uses.value", FieldValue::Number(1.0));
        fx.item.set("uses.max", FieldValue::Number(3.0));
        fx.item.set("quantity", FieldValue::Number(1.0));
        fx.economy.uses = Some(LimitedUses {
            max: 3.0,
            per: RecoveryPeriod::Charges,
            auto_destroy: true,
        });
        let request = ActionRequest {
            consume_usage: true,
            consume_quantity: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        let expected: effect_core::UpdateMap = [
            ("quantity".to_string(), FieldValue::Number(0.0)),
            ("uses.value".to_string(), FieldValue::Number(3.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(plan.item_updates, expected);
        assert!(plan.delete_item);
    }

    #[test]
    fn usage_fails_when_both_pools_are_empty() {
        let mut fx = Fixture::new();
        fx.item.set("uses.value", FieldValue::Number(0.0));
        fx.item.set("quantity", FieldValue::Number(0.0));
        fx.economy.uses = Some(LimitedUses {
            max: 3.0,
            per: RecoveryPeriod::Charges,
            auto_destroy: true,
        });
        let request = ActionRequest {
            consume_usage: true,
            consume_quantity: true,
            ..Default::default()
        };
        assert!(matches!(
            fx.verify(&request),
            Err(UsageError::Insufficient {
                step: ConsumptionStep::Usage,
                ..
            })
        ));
    }

    #[test]
    fn exhausted_uses_draw_from_quantity() {
        let mut fx = Fixture::new();
        fx.item.set("uses.value", FieldValue::Number(0.0));
        fx.item.set("uses.max", FieldValue::Number(5.0));
        fx.item.set("quantity", FieldValue::Number(2.0));
        fx.economy.uses = Some(LimitedUses {
            max: 5.0,
            per: RecoveryPeriod::Charges,
            auto_destroy: true,
        });
        let request = ActionRequest {
            consume_usage: true,
            consume_quantity: true,
            ..Default::default()
        };
        let plan = fx.verify(&request).unwrap();
        assert_eq!(plan.item_updates.get("quantity"), Some(&FieldValue::Number(1.0)));
        assert_eq!(plan.item_updates.get("uses.value"), Some(&FieldValue::Number(5.0)));
        // A unit remains, so the item survives
        assert!(!plan.delete_item);
    }
}

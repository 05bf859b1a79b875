//! Usage planning
//!
//! Inspects an item's static economy and decides which consumption steps
//! apply to an invocation, and whether the caller must pause for user
//! configuration before the ledger runs.

use crate::economy::{ItemEconomy, SlotPool};
use crate::request::{ActionRequest, RequestOverrides};
use crate::rules::RuleTable;

/// Build the action request for one invocation of an item's action.
///
/// `overrides` is merged over the computed flags so callers can pre-disable
/// individual steps.
pub fn plan(
    economy: &ItemEconomy,
    rules: &RuleTable,
    overrides: &RequestOverrides,
) -> ActionRequest {
    let uses = economy.uses.as_ref();
    let slot_active = economy.slot.as_ref().is_some_and(|slot| match &slot.pool {
        SlotPool::Leveled => slot.level > 0,
        SlotPool::Named(_) => true,
    });

    let mut request = ActionRequest {
        consume_usage: uses.is_some_and(|u| u.max > 0.0),
        consume_quantity: uses.is_some_and(|u| u.auto_destroy),
        consume_recharge: economy.recharge.is_some(),
        consume_reload: economy.reload.is_some(),
        consume_resource: economy.consume.as_ref().is_some_and(|c| c.amount != 0.0),
        slot_level: economy.slot.as_ref().map(|s| s.level),
        consume_slot: slot_active,
        consume_special_die: economy.consumes_special_die,
        requires_user_configuration: false,
    };

    if let Some(flag) = overrides.consume_usage {
        request.consume_usage = flag;
    }
    if let Some(flag) = overrides.consume_quantity {
        request.consume_quantity = flag;
    }
    if let Some(flag) = overrides.consume_recharge {
        request.consume_recharge = flag;
    }
    if let Some(flag) = overrides.consume_reload {
        request.consume_reload = flag;
    }
    if let Some(flag) = overrides.consume_resource {
        request.consume_resource = flag;
    }
    if let Some(flag) = overrides.consume_slot {
        request.consume_slot = flag;
    }
    if let Some(flag) = overrides.consume_special_die {
        request.consume_special_die = flag;
    }

    // The exact gate for pausing on user input. Resource and plain usage
    // consumption skip the pause for the exempted weapon categories; every
    // other step always pauses.
    let exempt = rules.is_exempt(economy.category);
    request.requires_user_configuration = economy.places_template
        || request.consume_recharge
        || request.consume_reload
        || (request.consume_resource && !exempt)
        || request.consume_slot
        || request.consume_special_die
        || (request.consume_usage && !exempt);

    request
}

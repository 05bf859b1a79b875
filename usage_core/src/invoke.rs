//! Invocation driver
//!
//! Wires the full write path together: plan the request, pause for user
//! configuration when required, verify against the ledger, then commit.
//! Nothing is written before verification succeeds, so a refusal at any
//! stage leaves every document untouched.

use tracing::debug;

use crate::commit::{self, CommitIds};
use crate::ledger::{self, LedgerContext};
use crate::plan::ConsumptionPlan;
use crate::planner;
use crate::request::{ActionRequest, RequestOverrides};
use crate::store::DocumentStore;
use crate::UsageError;

/// Host-side configuration pause. Shown the planned request, the user may
/// adjust the flags or abort the invocation.
pub trait ConfigurePrompt {
    /// Returns the (possibly edited) request, or `None` to abort.
    fn configure(&self, defaults: &ActionRequest) -> Option<ActionRequest>;
}

/// Prompt that accepts the planner's defaults unchanged.
pub struct AcceptDefaults;

impl ConfigurePrompt for AcceptDefaults {
    fn configure(&self, defaults: &ActionRequest) -> Option<ActionRequest> {
        Some(defaults.clone())
    }
}

/// Run one invocation of an item's action end to end.
///
/// Returns the committed plan so the host can report what was spent.
pub fn run_action(
    ctx: &LedgerContext<'_>,
    overrides: &RequestOverrides,
    prompt: &dyn ConfigurePrompt,
    store: &mut dyn DocumentStore,
) -> Result<ConsumptionPlan, UsageError> {
    let mut request = planner::plan(ctx.economy, ctx.rules, overrides);
    if request.requires_user_configuration {
        debug!(item = %ctx.item.id, "pausing for usage configuration");
        request = prompt.configure(&request).ok_or(UsageError::Cancelled)?;
    }

    let plan = ledger::verify(&request, ctx, &*store)?;

    let ids = CommitIds {
        item: ctx.item.id.clone(),
        actor: ctx.actor.id.clone(),
        companion: ctx.companion.map(|c| c.id.clone()),
    };
    commit::commit(&plan, &ids, store)?;
    Ok(plan)
}

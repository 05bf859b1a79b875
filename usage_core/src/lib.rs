//! usage_core: the write path of the sheet engine.
//!
//! Where `effect_core` derives what an entity looks like, this crate
//! decides what an action invocation costs and spends it. An item's
//! declared economy is planned into an [`request::ActionRequest`], the
//! [`ledger`] verifies every step against live pool state and accumulates
//! a [`plan::ConsumptionPlan`], and the [`commit`] module writes the plan
//! to the host's document store in one deterministic pass.

pub mod commit;
pub mod economy;
pub mod invoke;
pub mod ledger;
pub mod plan;
pub mod planner;
pub mod request;
pub mod rules;
pub mod store;

pub use commit::{commit as commit_plan, CommitIds};
pub use economy::{
    ActionCategory, ConsumeLink, ConsumeTarget, HitDiceTarget, ItemEconomy, LimitedUses, Recharge,
    RecoveryPeriod, ResourceKind, SlotPool, SlotRequirement,
};
pub use invoke::{run_action, AcceptDefaults, ConfigurePrompt};
pub use ledger::{verify, ConsumptionStep, LedgerContext};
pub use plan::ConsumptionPlan;
pub use planner::plan;
pub use request::{ActionRequest, RequestOverrides};
pub use rules::{ConfigError, RuleTable};
pub use store::{DocumentStore, MemoryStore, StoreError};

use thiserror::Error;

/// Error produced while planning, verifying, or committing an invocation
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("insufficient {step}: needed {needed}, available {available}")]
    Insufficient {
        step: ConsumptionStep,
        needed: f64,
        available: f64,
    },
    #[error("{step} target '{target}' does not resolve")]
    MissingTarget { step: ConsumptionStep, target: String },
    /// The user aborted at the configuration pause. Not a fault; hosts
    /// should drop the invocation silently.
    #[error("invocation cancelled at configuration")]
    Cancelled,
    #[error(transparent)]
    Store(#[from] StoreError),
}

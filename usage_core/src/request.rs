//! Action requests
//!
//! The resolved set of consumption steps for one action invocation.
//! Requests are ephemeral: created by the planner, optionally adjusted by
//! the user-configuration prompt, handed to the ledger, and discarded.

use serde::{Deserialize, Serialize};

/// Which consumption steps one invocation performs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub consume_usage: bool,
    pub consume_quantity: bool,
    pub consume_recharge: bool,
    pub consume_reload: bool,
    pub consume_resource: bool,
    /// Slot level chosen for this invocation; the prompt may upcast it
    /// above the item's base level.
    pub slot_level: Option<u32>,
    pub consume_slot: bool,
    pub consume_special_die: bool,
    /// When set, the caller pauses for the user-configuration prompt
    /// before the ledger runs.
    pub requires_user_configuration: bool,
}

/// Per-call overrides merged over the planner's computed flags, letting a
/// caller pre-disable steps (for example a free cast).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOverrides {
    pub consume_usage: Option<bool>,
    pub consume_quantity: Option<bool>,
    pub consume_recharge: Option<bool>,
    pub consume_reload: Option<bool>,
    pub consume_resource: Option<bool>,
    pub consume_slot: Option<bool>,
    pub consume_special_die: Option<bool>,
}

impl RequestOverrides {
    pub fn none() -> Self {
        Self::default()
    }
}

//! Rule table
//!
//! Tunable rule constants, loadable from TOML. The table is immutable and
//! passed by value into the planner and ledger; nothing in this crate
//! reads process-wide state.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::economy::ActionCategory;

/// Error loading a rule table
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading rule table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error in rule table: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable rule constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Action categories that skip the user-configuration pause for plain
    /// usage/resource consumption.
    #[serde(default = "default_exempt_categories")]
    pub exempt_categories: Vec<ActionCategory>,
    /// The companion sub-pool power-die consumption falls back to when the
    /// named sub-pool runs short.
    #[serde(default = "default_power_die_fallback")]
    pub power_die_fallback: String,
    /// Points cost of a slot is `level + slot_point_offset`.
    #[serde(default = "default_slot_point_offset")]
    pub slot_point_offset: u32,
}

impl Default for RuleTable {
    fn default() -> Self {
        RuleTable {
            exempt_categories: default_exempt_categories(),
            power_die_fallback: default_power_die_fallback(),
            slot_point_offset: default_slot_point_offset(),
        }
    }
}

impl RuleTable {
    /// Load a rule table from a TOML file. Missing keys fall back to the
    /// defaults, so an empty file is a valid table.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let rules: RuleTable = toml::from_str(&content)?;
        Ok(rules)
    }

    pub fn is_exempt(&self, category: ActionCategory) -> bool {
        self.exempt_categories.contains(&category)
    }

    pub fn slot_point_cost(&self, level: u32) -> f64 {
        f64::from(level + self.slot_point_offset)
    }
}

fn default_exempt_categories() -> Vec<ActionCategory> {
    vec![ActionCategory::SimpleWeapon, ActionCategory::AutomaticWeapon]
}

fn default_power_die_fallback() -> String {
    "central".to_string()
}

fn default_slot_point_offset() -> u32 {
    1
}

//! Modifier records and effect groupings

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Placeholder token in a string-override delta; it is substituted with the
/// field's current value before the string is set, enabling "wrap the
/// existing text" effects.
pub const VALUE_PLACEHOLDER: &str = "{}";

/// The combination rule used to fold a modifier's delta onto a current
/// value. Applicability depends on the target's field kind (for example,
/// `Multiply` is meaningless on a set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierMode {
    Custom = 0,
    Multiply = 1,
    Add = 2,
    Downgrade = 3,
    Upgrade = 4,
    Override = 5,
}

impl ModifierMode {
    /// Default application priority when none is authored explicitly.
    pub fn default_priority(self) -> i32 {
        self as i32 * 10
    }
}

/// A single field-path/mode/value record contributing to a derived value.
///
/// The delta is kept as the raw authored string; it is cast to the target
/// field's kind at application time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub target_path: String,
    pub mode: ModifierMode,
    pub value: String,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl Modifier {
    pub fn new(
        target_path: impl Into<String>,
        mode: ModifierMode,
        value: impl Into<String>,
    ) -> Self {
        Self {
            target_path: target_path.into(),
            mode,
            value: value.into(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or_else(|| self.mode.default_priority())
    }
}

/// Owning state of an effect's origin item, used to derive suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginState {
    pub equipped: bool,
    pub attuned: bool,
}

impl OriginState {
    pub const ACTIVE: OriginState = OriginState {
        equipped: true,
        attuned: true,
    };

    /// An item-sourced effect is suppressed while its owner is unequipped
    /// or unattuned.
    pub fn suppresses(&self) -> bool {
        !self.equipped || !self.attuned
    }
}

/// An ordered group of modifiers sharing one origin and one
/// enabled/suppressed state.
///
/// `suppressed` is derived, never persisted; the stack recomputes it from
/// the origin's state on every derivation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRecord {
    /// Durable id, stable across edits to the containing stack.
    pub id: String,
    /// The item that sourced this effect, when item-sourced.
    #[serde(default)]
    pub origin: Option<EntityId>,
    pub enabled: bool,
    #[serde(skip)]
    pub suppressed: bool,
    pub modifiers: Vec<Modifier>,
}

impl EffectRecord {
    pub fn new(id: impl Into<String>, modifiers: Vec<Modifier>) -> Self {
        Self {
            id: id.into(),
            origin: None,
            enabled: true,
            suppressed: false,
            modifiers,
        }
    }

    pub fn from_origin(
        id: impl Into<String>,
        origin: impl Into<EntityId>,
        modifiers: Vec<Modifier>,
    ) -> Self {
        Self {
            id: id.into(),
            origin: Some(origin.into()),
            enabled: true,
            suppressed: false,
            modifiers,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this record contributes to derivation.
    pub fn active(&self) -> bool {
        self.enabled && !self.suppressed
    }
}

//! Item economy descriptors
//!
//! A read-only declaration of everything an action can consume: limited
//! uses, recharge, ammunition, a generic resource link, a power-slot
//! requirement, and the special-die category. The planner reads this; it
//! never mutates it.

use serde::{Deserialize, Serialize};
use std::fmt;

use effect_core::EntityId;

/// Action category, used for the user-configuration exemptions: the two
/// exempted simple/automatic weapon categories fire without pausing for
/// input even when they consume a use or a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    SimpleWeapon,
    MartialWeapon,
    AutomaticWeapon,
    Power,
    Feature,
    Consumable,
    Tool,
    Other,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionCategory::SimpleWeapon => "simple weapon",
            ActionCategory::MartialWeapon => "martial weapon",
            ActionCategory::AutomaticWeapon => "automatic weapon",
            ActionCategory::Power => "power",
            ActionCategory::Feature => "feature",
            ActionCategory::Consumable => "consumable",
            ActionCategory::Tool => "tool",
            ActionCategory::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Limited-use declaration: `uses.value`/`uses.max` live on the item;
/// `per` names the recovery period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitedUses {
    pub max: f64,
    pub per: RecoveryPeriod,
    /// When the last use is spent, draw down the item quantity and reset
    /// uses from the next unit.
    #[serde(default)]
    pub auto_destroy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPeriod {
    ShortRest,
    LongRest,
    Day,
    Charges,
}

/// Recharge declaration: the item regains its charge on a die roll meeting
/// the threshold (rolling is out of scope; only the `charged` flag is read).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recharge {
    pub threshold: u8,
}

/// The kinds of resource a generic consume link can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A plain numeric attribute path on the actor.
    Attribute,
    /// Another item's quantity.
    Ammo,
    /// Another item's quantity (non-ammunition materials).
    Material,
    /// Class hit-dice pools, greedily consumed by die size.
    HitDice,
    /// Another item's uses or recharge pool.
    Charges,
    /// A named power-die sub-pool on the deployed companion.
    PowerDice,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Attribute => "attribute",
            ResourceKind::Ammo => "ammo",
            ResourceKind::Material => "material",
            ResourceKind::HitDice => "hit dice",
            ResourceKind::Charges => "charges",
            ResourceKind::PowerDice => "power dice",
        };
        write!(f, "{name}")
    }
}

/// Which concrete pool a consume link targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumeTarget {
    /// Dotted numeric path on the actor, e.g. `resources.focus.value`.
    Attribute(String),
    /// Another item owned by the actor.
    Item(EntityId),
    /// Class hit dice, optionally narrowed to a die size or the symbolic
    /// smallest/largest die.
    HitDice(HitDiceTarget),
    /// Named power-die sub-pool on the deployed companion.
    CompanionPool(String),
}

impl fmt::Display for ConsumeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumeTarget::Attribute(path) => write!(f, "{path}"),
            ConsumeTarget::Item(id) => write!(f, "item {id}"),
            ConsumeTarget::HitDice(t) => write!(f, "hit dice ({t})"),
            ConsumeTarget::CompanionPool(name) => write!(f, "companion pool {name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitDiceTarget {
    Smallest,
    Largest,
    /// One specific die size (faces), e.g. 8 for d8.
    Size(u32),
}

impl fmt::Display for HitDiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitDiceTarget::Smallest => write!(f, "smallest"),
            HitDiceTarget::Largest => write!(f, "largest"),
            HitDiceTarget::Size(faces) => write!(f, "d{faces}"),
        }
    }
}

/// A generic resource-consumption declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumeLink {
    pub kind: ResourceKind,
    pub target: ConsumeTarget,
    pub amount: f64,
}

/// Which slot pool a power draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPool {
    /// Pools keyed by power level (`slots.level{n}`).
    Leveled,
    /// A named non-leveled pool (`slots.{name}`).
    Named(String),
}

/// Slot requirement for slot-consuming action types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRequirement {
    pub level: u32,
    pub pool: SlotPool,
    /// Innate casting debits no points.
    #[serde(default)]
    pub innate: bool,
}

/// The static economy of one action-capable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEconomy {
    pub category: ActionCategory,
    #[serde(default)]
    pub uses: Option<LimitedUses>,
    #[serde(default)]
    pub recharge: Option<Recharge>,
    /// The ammunition item this action reloads from, when declared.
    #[serde(default)]
    pub reload: Option<EntityId>,
    #[serde(default)]
    pub consume: Option<ConsumeLink>,
    #[serde(default)]
    pub slot: Option<SlotRequirement>,
    /// Actions in this category always consume one superiority die.
    #[serde(default)]
    pub consumes_special_die: bool,
    /// An area-effect template must be placed before resolution.
    #[serde(default)]
    pub places_template: bool,
}

impl ItemEconomy {
    /// A bare economy with no consumption declarations.
    pub fn new(category: ActionCategory) -> Self {
        Self {
            category,
            uses: None,
            recharge: None,
            reload: None,
            consume: None,
            slot: None,
            consumes_special_die: false,
            places_template: false,
        }
    }
}

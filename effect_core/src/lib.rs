//! effect_core - Typed field-change resolution for character-sheet effects
//!
//! This library provides:
//! - FieldKind/FieldValue: the semantic types a target field can hold
//! - FieldKindResolver: schema-backed classification of target paths
//! - apply(): the pure modifier applier, with textual formula composition
//! - EffectStack: ordered, suppressible effect records folded into a
//!   derived snapshot
//!
//! Derivation is deterministic: the same stack and entity state always
//! yield the same snapshot. A single failing modifier is logged and
//! skipped, never aborting the stack.

pub mod apply;
pub mod entity;
pub mod formula;
pub mod modifier;
pub mod prelude;
pub mod schema;
pub mod stack;
pub mod value;

pub use apply::{apply, apply_with, CustomApply};
pub use entity::{Entity, EntityId, EntityKind, UpdateMap};
pub use modifier::{EffectRecord, Modifier, ModifierMode, OriginState, VALUE_PLACEHOLDER};
pub use schema::{FieldKindResolver, MapSchema, SchemaSource};
pub use stack::{DerivedSnapshot, EffectStack};
pub use value::{FieldKind, FieldValue};

use thiserror::Error;

/// Error applying a single modifier.
///
/// These are validation failures: the caller logs them, skips the one
/// modifier, and continues deriving.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("no schema entry for target field")]
    UnknownKind,
    #[error("cannot cast '{raw}' to {kind}")]
    MalformedDelta { raw: String, kind: FieldKind },
    #[error("mode {mode:?} is not applicable to {kind}")]
    UnsupportedMode { mode: ModifierMode, kind: FieldKind },
}

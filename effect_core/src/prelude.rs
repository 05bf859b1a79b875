//! Prelude module for convenient imports
//!
//! ```rust
//! use effect_core::prelude::*;
//! ```

pub use crate::apply::{apply, apply_with};
pub use crate::entity::{Entity, EntityId, EntityKind, UpdateMap};
pub use crate::modifier::{EffectRecord, Modifier, ModifierMode, OriginState};
pub use crate::schema::{FieldKindResolver, MapSchema, SchemaSource};
pub use crate::stack::{DerivedSnapshot, EffectStack};
pub use crate::value::{FieldKind, FieldValue};
pub use crate::ApplyError;

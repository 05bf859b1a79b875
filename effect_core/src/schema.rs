//! Schema introspection and field-kind resolution
//!
//! The data model owning an entity exposes the kind of each field path; this
//! module wraps that capability and layers the caller-supplied set of known
//! formula paths on top, since some derived paths are never schema-declared.

use std::collections::{BTreeMap, BTreeSet};

use crate::value::FieldKind;

/// Injected capability: the entity's data model reports the kind of a field
/// path. Paths without a schema entry return [`FieldKind::Unknown`].
pub trait SchemaSource {
    fn field_kind(&self, path: &str) -> FieldKind;
}

/// A plain map-backed schema, used by hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MapSchema {
    kinds: BTreeMap<String, FieldKind>,
}

impl MapSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, kind: FieldKind) {
        self.kinds.insert(path.into(), kind);
    }

    /// Builder-style insertion
    pub fn with(mut self, path: impl Into<String>, kind: FieldKind) -> Self {
        self.insert(path, kind);
        self
    }
}

impl SchemaSource for MapSchema {
    fn field_kind(&self, path: &str) -> FieldKind {
        self.kinds.get(path).cloned().unwrap_or(FieldKind::Unknown)
    }
}

/// Classifies a target field path, preferring the known-formula set over the
/// schema: a path listed there is a formula even when the schema calls it a
/// plain string.
pub struct FieldKindResolver<'a> {
    schema: &'a dyn SchemaSource,
    formula_paths: BTreeSet<String>,
}

impl<'a> FieldKindResolver<'a> {
    pub fn new(schema: &'a dyn SchemaSource) -> Self {
        Self {
            schema,
            formula_paths: BTreeSet::new(),
        }
    }

    pub fn with_formula_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formula_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn resolve(&self, path: &str) -> FieldKind {
        if self.formula_paths.contains(path) {
            return FieldKind::Formula;
        }
        self.schema.field_kind(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_paths_shadow_schema() {
        let schema = MapSchema::new()
            .with("attributes.speed", FieldKind::Number)
            .with("bonuses.attack", FieldKind::Str);
        let resolver =
            FieldKindResolver::new(&schema).with_formula_paths(["bonuses.attack"]);

        assert_eq!(resolver.resolve("attributes.speed"), FieldKind::Number);
        assert_eq!(resolver.resolve("bonuses.attack"), FieldKind::Formula);
        assert_eq!(resolver.resolve("nonexistent"), FieldKind::Unknown);
    }
}

//! Pure modifier application
//!
//! `apply(kind, mode, current, delta) -> new value`, no I/O. The delta
//! arrives as the raw authored string and is cast to the target kind first;
//! formula fields route through [`crate::formula`] instead of being cast.

use std::collections::BTreeSet;

use crate::formula;
use crate::modifier::{ModifierMode, VALUE_PLACEHOLDER};
use crate::value::{FieldKind, FieldValue};
use crate::ApplyError;

/// Caller-extensible handler for `Custom` mode (and the modes that fall
/// back to it). Returning `None` keeps the default no-op-with-warning.
pub type CustomApply<'a> =
    &'a dyn Fn(&FieldKind, Option<&FieldValue>, &str) -> Option<FieldValue>;

/// Apply one modifier delta to a current value.
pub fn apply(
    kind: &FieldKind,
    mode: ModifierMode,
    current: Option<&FieldValue>,
    raw_delta: &str,
) -> Result<FieldValue, ApplyError> {
    apply_with(kind, mode, current, raw_delta, None)
}

/// [`apply`] with a caller-supplied `Custom` handler.
pub fn apply_with(
    kind: &FieldKind,
    mode: ModifierMode,
    current: Option<&FieldValue>,
    raw_delta: &str,
    custom: Option<CustomApply<'_>>,
) -> Result<FieldValue, ApplyError> {
    if *kind == FieldKind::Unknown {
        return Err(ApplyError::UnknownKind);
    }
    if *kind == FieldKind::Formula {
        let cur = current.and_then(FieldValue::as_text);
        return Ok(FieldValue::Formula(formula::compose(mode, cur, raw_delta)));
    }
    if mode == ModifierMode::Custom {
        return Ok(custom_fallback(kind, current, raw_delta, custom));
    }
    let delta = FieldValue::cast(kind, raw_delta)?;
    combine(kind, mode, current, &delta, raw_delta, custom)
}

fn custom_fallback(
    kind: &FieldKind,
    current: Option<&FieldValue>,
    raw_delta: &str,
    custom: Option<CustomApply<'_>>,
) -> FieldValue {
    if let Some(handler) = custom {
        if let Some(value) = handler(kind, current, raw_delta) {
            return value;
        }
    }
    tracing::warn!(%kind, delta = raw_delta, "no custom handler; modifier is a no-op");
    current.cloned().unwrap_or_else(|| FieldValue::zero(kind))
}

fn combine(
    kind: &FieldKind,
    mode: ModifierMode,
    current: Option<&FieldValue>,
    delta: &FieldValue,
    raw_delta: &str,
    custom: Option<CustomApply<'_>>,
) -> Result<FieldValue, ApplyError> {
    match kind {
        FieldKind::Number => {
            let cur = current.and_then(FieldValue::as_number).unwrap_or(0.0);
            let d = delta.as_number().unwrap_or(0.0);
            let out = match mode {
                ModifierMode::Add => cur + d,
                ModifierMode::Multiply => cur * d,
                ModifierMode::Override => d,
                ModifierMode::Upgrade => cur.max(d),
                ModifierMode::Downgrade => cur.min(d),
                ModifierMode::Custom => unreachable!("custom handled by caller"),
            };
            Ok(FieldValue::Number(out))
        }
        FieldKind::Bool => {
            let cur = current.and_then(FieldValue::as_bool).unwrap_or(false);
            let d = delta.as_bool().unwrap_or(false);
            let out = match mode {
                ModifierMode::Add => cur || d,
                ModifierMode::Multiply => cur && d,
                ModifierMode::Override => d,
                ModifierMode::Upgrade => cur.max(d),
                ModifierMode::Downgrade => cur.min(d),
                ModifierMode::Custom => unreachable!("custom handled by caller"),
            };
            Ok(FieldValue::Bool(out))
        }
        FieldKind::Str => match mode {
            ModifierMode::Override => {
                let d = delta.as_text().unwrap_or(raw_delta);
                if d.contains(VALUE_PLACEHOLDER) {
                    let cur = current.and_then(FieldValue::as_text).unwrap_or("");
                    Ok(FieldValue::Str(d.replace(VALUE_PLACEHOLDER, cur)))
                } else {
                    Ok(FieldValue::Str(d.to_string()))
                }
            }
            _ => Ok(custom_fallback(kind, current, raw_delta, custom)),
        },
        FieldKind::Set => {
            let FieldValue::Set(members) = delta else {
                unreachable!("cast produced a non-set for a set field");
            };
            let mut cur = match current {
                Some(FieldValue::Set(s)) => s.clone(),
                _ => BTreeSet::new(),
            };
            match mode {
                ModifierMode::Add => {
                    for member in members {
                        // A negation marker removes the unmarked member.
                        if let Some(stripped) = member.strip_prefix('-') {
                            cur.remove(stripped);
                        } else {
                            cur.insert(member.clone());
                        }
                    }
                    Ok(FieldValue::Set(cur))
                }
                ModifierMode::Override => Ok(FieldValue::Set(members.clone())),
                ModifierMode::Upgrade | ModifierMode::Downgrade => {
                    // Nothing to compare against when the field is absent.
                    if current.is_none() {
                        Ok(FieldValue::Set(members.clone()))
                    } else {
                        Ok(custom_fallback(kind, current, raw_delta, custom))
                    }
                }
                ModifierMode::Multiply => Err(ApplyError::UnsupportedMode {
                    mode,
                    kind: kind.clone(),
                }),
                ModifierMode::Custom => unreachable!("custom handled by caller"),
            }
        }
        FieldKind::Array(inner) => {
            let FieldValue::Array(deltas) = delta else {
                unreachable!("cast produced a non-array for an array field");
            };
            let mut cur = match current {
                Some(FieldValue::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            match mode {
                ModifierMode::Override => Ok(FieldValue::Array(deltas.clone())),
                ModifierMode::Add => {
                    cur.extend(deltas.iter().cloned());
                    Ok(FieldValue::Array(cur))
                }
                ModifierMode::Multiply | ModifierMode::Upgrade | ModifierMode::Downgrade => {
                    // Element-wise over the zipped prefix.
                    let n = cur.len().min(deltas.len());
                    for i in 0..n {
                        let next =
                            combine(inner, mode, Some(&cur[i]), &deltas[i], raw_delta, custom)?;
                        cur[i] = next;
                    }
                    Ok(FieldValue::Array(cur))
                }
                ModifierMode::Custom => unreachable!("custom handled by caller"),
            }
        }
        FieldKind::Object => match mode {
            ModifierMode::Override => Ok(delta.clone()),
            _ => Ok(custom_fallback(kind, current, raw_delta, custom)),
        },
        FieldKind::Formula | FieldKind::Unknown => {
            unreachable!("handled before casting")
        }
    }
}

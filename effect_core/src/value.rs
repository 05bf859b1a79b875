//! Field kinds and typed field values

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::ApplyError;

/// Semantic type of a target field.
///
/// `Formula` is distinct from `Str` even though both are textually
/// represented: a formula field holds an arithmetic expression that is
/// evaluated downstream, so modifiers combine it textually rather than
/// numerically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Str,
    Bool,
    Set,
    Array(Box<FieldKind>),
    Object,
    Formula,
    /// No schema entry exists for the path. Callers skip the modifier and
    /// continue rather than aborting the whole stack.
    Unknown,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Number => write!(f, "number"),
            FieldKind::Str => write!(f, "string"),
            FieldKind::Bool => write!(f, "boolean"),
            FieldKind::Set => write!(f, "set"),
            FieldKind::Array(inner) => write!(f, "array of {inner}"),
            FieldKind::Object => write!(f, "object"),
            FieldKind::Formula => write!(f, "formula"),
            FieldKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A typed field value.
///
/// Collections are ordered (`BTreeSet`/`BTreeMap`) so that derivation is
/// deterministic regardless of insertion history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Number(f64),
    Str(String),
    Bool(bool),
    Set(BTreeSet<String>),
    Array(Vec<FieldValue>),
    Object(BTreeMap<String, FieldValue>),
    Formula(String),
}

impl FieldValue {
    /// The neutral value for a kind, used as the current value when the
    /// target field is absent.
    pub fn zero(kind: &FieldKind) -> FieldValue {
        match kind {
            FieldKind::Number => FieldValue::Number(0.0),
            FieldKind::Str => FieldValue::Str(String::new()),
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Set => FieldValue::Set(BTreeSet::new()),
            FieldKind::Array(_) => FieldValue::Array(Vec::new()),
            FieldKind::Object => FieldValue::Object(BTreeMap::new()),
            FieldKind::Formula | FieldKind::Unknown => FieldValue::Str(String::new()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) | FieldValue::Formula(s) => Some(s),
            _ => None,
        }
    }

    /// Cast a raw delta string into a value of the requested kind.
    ///
    /// The raw string is first tried as JSON (a delta may be authored as a
    /// JSON scalar, array, or object), falling back to the bare string.
    /// A cast that cannot produce the requested kind is a
    /// [`ApplyError::MalformedDelta`]; callers log it and skip the modifier.
    pub fn cast(kind: &FieldKind, raw: &str) -> Result<FieldValue, ApplyError> {
        let raw = raw.trim();
        let json: Option<serde_json::Value> = serde_json::from_str(raw).ok();
        let malformed = || ApplyError::MalformedDelta {
            raw: raw.to_string(),
            kind: kind.clone(),
        };

        match kind {
            FieldKind::Number => {
                let n = match &json {
                    Some(serde_json::Value::Number(n)) => n.as_f64(),
                    Some(serde_json::Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
                    _ => raw.parse::<f64>().ok(),
                };
                n.map(FieldValue::Number).ok_or_else(malformed)
            }
            FieldKind::Bool => {
                let b = match &json {
                    Some(serde_json::Value::Bool(b)) => Some(*b),
                    Some(serde_json::Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
                    _ => raw.parse::<bool>().ok(),
                };
                b.map(FieldValue::Bool).ok_or_else(malformed)
            }
            FieldKind::Str => match json {
                Some(serde_json::Value::String(s)) => Ok(FieldValue::Str(s)),
                _ => Ok(FieldValue::Str(raw.to_string())),
            },
            FieldKind::Formula => match json {
                Some(serde_json::Value::String(s)) => Ok(FieldValue::Formula(s)),
                _ => Ok(FieldValue::Formula(raw.to_string())),
            },
            FieldKind::Set => {
                let members = match json {
                    Some(serde_json::Value::Array(items)) => items
                        .into_iter()
                        .filter_map(|v| match v {
                            serde_json::Value::String(s) => Some(s),
                            other => Some(other.to_string()),
                        })
                        .collect(),
                    Some(serde_json::Value::String(s)) => BTreeSet::from([s]),
                    _ => BTreeSet::from([raw.to_string()]),
                };
                Ok(FieldValue::Set(members))
            }
            FieldKind::Array(inner) => {
                let elements = match json {
                    Some(serde_json::Value::Array(items)) => items,
                    Some(other) => vec![other],
                    None => vec![serde_json::Value::String(raw.to_string())],
                };
                // Malformed elements are dropped with a warning, never fatal.
                let cast: Vec<FieldValue> = elements
                    .iter()
                    .filter_map(|el| {
                        let el_raw = match el {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        match FieldValue::cast(inner, &el_raw) {
                            Ok(v) => Some(v),
                            Err(err) => {
                                tracing::warn!(%err, element = %el_raw, "dropping array element");
                                None
                            }
                        }
                    })
                    .collect();
                Ok(FieldValue::Array(cast))
            }
            FieldKind::Object => match json {
                Some(serde_json::Value::Object(map)) => {
                    let fields = map
                        .iter()
                        .filter_map(|(k, v)| {
                            FieldValue::from_json(v).map(|v| (k.clone(), v))
                        })
                        .collect();
                    Ok(FieldValue::Object(fields))
                }
                _ => Err(malformed()),
            },
            FieldKind::Unknown => Err(ApplyError::UnknownKind),
        }
    }

    /// Convert a JSON value into a field value, inferring the kind.
    /// JSON `null` has no field-value representation and yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<FieldValue> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
            serde_json::Value::String(s) => Some(FieldValue::Str(s.clone())),
            serde_json::Value::Array(items) => Some(FieldValue::Array(
                items.iter().filter_map(FieldValue::from_json).collect(),
            )),
            serde_json::Value::Object(map) => Some(FieldValue::Object(
                map.iter()
                    .filter_map(|(k, v)| FieldValue::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Str(s) | FieldValue::Formula(s) => write!(f, "{s}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Set(members) => {
                let joined: Vec<&str> = members.iter().map(String::as_str).collect();
                write!(f, "{{{}}}", joined.join(", "))
            }
            FieldValue::Array(items) => {
                let joined: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", joined.join(", "))
            }
            FieldValue::Object(_) => write!(f, "<object>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_number_from_bare_and_json() {
        assert_eq!(
            FieldValue::cast(&FieldKind::Number, "2.5").unwrap(),
            FieldValue::Number(2.5)
        );
        assert_eq!(
            FieldValue::cast(&FieldKind::Number, "\"3\"").unwrap_err().to_string(),
            "cannot cast '\"3\"' to number"
        );
    }

    #[test]
    fn cast_set_from_json_array() {
        let v = FieldValue::cast(&FieldKind::Set, r#"["fire", "cold"]"#).unwrap();
        assert_eq!(
            v,
            FieldValue::Set(BTreeSet::from(["fire".to_string(), "cold".to_string()]))
        );
    }

    #[test]
    fn cast_array_drops_malformed_elements() {
        let v = FieldValue::cast(
            &FieldKind::Array(Box::new(FieldKind::Number)),
            r#"[1, "oops", 3]"#,
        )
        .unwrap();
        assert_eq!(
            v,
            FieldValue::Array(vec![FieldValue::Number(1.0), FieldValue::Number(3.0)])
        );
    }

    #[test]
    fn cast_unknown_kind_fails() {
        assert!(matches!(
            FieldValue::cast(&FieldKind::Unknown, "1"),
            Err(ApplyError::UnknownKind)
        ));
    }
}

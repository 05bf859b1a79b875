//! Formula composition
//!
//! Formula fields hold arithmetic expression strings ("2d6+2") that are
//! evaluated downstream, outside this crate. Modifiers therefore combine
//! them textually, taking care to preserve operator precedence for the
//! eventual evaluation.

use crate::modifier::ModifierMode;

/// Combine a formula delta onto the current expression.
///
/// An absent (or empty) current expression degrades every mode to
/// `Override`: there is nothing to combine against.
pub fn compose(mode: ModifierMode, current: Option<&str>, delta: &str) -> String {
    let delta = delta.trim();
    let current = match current.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => return delta.to_string(),
    };

    match mode {
        ModifierMode::Override => delta.to_string(),
        ModifierMode::Add => {
            let (op, rest) = match delta.strip_prefix('-') {
                Some(rest) => ("-", rest.trim_start()),
                None => ("+", delta.strip_prefix('+').unwrap_or(delta).trim_start()),
            };
            format!("{current} {op} {rest}")
        }
        ModifierMode::Multiply => {
            if top_level_terms(current) > 1 {
                format!("({current}) * {delta}")
            } else {
                format!("{current} * {delta}")
            }
        }
        ModifierMode::Upgrade => wrap_comparison("max", current, delta),
        ModifierMode::Downgrade => wrap_comparison("min", current, delta),
        ModifierMode::Custom => {
            tracing::warn!(delta, "custom mode has no formula handler; keeping current");
            current.to_string()
        }
    }
}

/// Wrap as `func(current, delta)`, except when current is already a single
/// call of the same function spanning the whole expression: then delta is
/// appended as an extra argument instead of nesting.
fn wrap_comparison(func: &str, current: &str, delta: &str) -> String {
    if let Some(args) = single_call_args(current, func) {
        format!("{func}({args},{delta})")
    } else {
        format!("{func}({current}, {delta})")
    }
}

/// If `expr` is exactly one `func(...)` call, return its argument text.
fn single_call_args<'a>(expr: &'a str, func: &str) -> Option<&'a str> {
    let inner = expr.strip_prefix(func)?.strip_prefix('(')?;
    let inner = inner.strip_suffix(')')?;
    // The opening paren must match the final one, otherwise this is a
    // larger expression that merely starts with a call.
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Number of top-level additive terms in an expression. `+`/`-` inside
/// parentheses or in leading-sign position do not split terms.
fn top_level_terms(expr: &str) -> usize {
    let mut depth = 0i32;
    let mut terms = 1usize;
    let mut prev: Option<char> = None;
    for c in expr.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '+' | '-' if depth == 0 => {
                // A sign following an operator or an open paren is unary.
                let unary = matches!(prev, None | Some('+' | '-' | '*' | '/' | '('));
                if !unary {
                    terms += 1;
                }
            }
            _ => {}
        }
        if !c.is_whitespace() {
            prev = Some(c);
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_normalizes_leading_sign() {
        assert_eq!(
            compose(ModifierMode::Add, Some("2d6+2"), "+3"),
            "2d6+2 + 3"
        );
        assert_eq!(
            compose(ModifierMode::Add, Some("2d6+2"), "-1d4"),
            "2d6+2 - 1d4"
        );
        assert_eq!(compose(ModifierMode::Add, Some("1d8"), "2"), "1d8 + 2");
    }

    #[test]
    fn multiply_parenthesizes_multi_term_current() {
        assert_eq!(
            compose(ModifierMode::Multiply, Some("2d6+2"), "2"),
            "(2d6+2) * 2"
        );
        assert_eq!(compose(ModifierMode::Multiply, Some("2d6"), "2"), "2d6 * 2");
        // Terms hidden inside parens do not force another layer
        assert_eq!(
            compose(ModifierMode::Multiply, Some("(1d4+1)"), "3"),
            "(1d4+1) * 3"
        );
    }

    #[test]
    fn upgrade_collapses_matching_call() {
        assert_eq!(
            compose(ModifierMode::Upgrade, Some("max(1,2)"), "5"),
            "max(1,2,5)"
        );
        assert_eq!(
            compose(ModifierMode::Upgrade, Some("1d6"), "5"),
            "max(1d6, 5)"
        );
        // A min() call does not collapse into max()
        assert_eq!(
            compose(ModifierMode::Upgrade, Some("min(1,2)"), "5"),
            "max(min(1,2), 5)"
        );
    }

    #[test]
    fn downgrade_collapses_matching_call() {
        assert_eq!(
            compose(ModifierMode::Downgrade, Some("min(4,6)"), "2"),
            "min(4,6,2)"
        );
    }

    #[test]
    fn sibling_calls_do_not_collapse() {
        // "max(1,2) + max(3,4)" starts with max( but is not a single call
        assert_eq!(
            compose(ModifierMode::Upgrade, Some("max(1,2) + max(3,4)"), "5"),
            "max(max(1,2) + max(3,4), 5)"
        );
    }

    #[test]
    fn absent_current_degrades_to_override() {
        assert_eq!(compose(ModifierMode::Add, None, "+3"), "+3");
        assert_eq!(compose(ModifierMode::Multiply, Some(""), "2"), "2");
        assert_eq!(compose(ModifierMode::Upgrade, None, "1d4"), "1d4");
    }

    #[test]
    fn term_counting_ignores_unary_signs() {
        assert_eq!(top_level_terms("-2d6"), 1);
        assert_eq!(top_level_terms("2d6+2"), 2);
        assert_eq!(top_level_terms("(2d6+2)"), 1);
        assert_eq!(top_level_terms("1 + 2 - 3"), 3);
        assert_eq!(top_level_terms("2 * -3"), 1);
    }

    proptest! {
        // Composition is pure: same inputs, same output.
        #[test]
        fn compose_is_deterministic(current in "[0-9d+\\- ()]{0,16}", delta in "[0-9d+\\-]{1,8}") {
            let a = compose(ModifierMode::Add, Some(&current), &delta);
            let b = compose(ModifierMode::Add, Some(&current), &delta);
            prop_assert_eq!(a, b);
        }

        // Add always preserves the current expression as a prefix when
        // current is non-empty.
        #[test]
        fn add_keeps_current_prefix(delta in "[0-9]{1,4}") {
            let out = compose(ModifierMode::Add, Some("1d8+1"), &delta);
            prop_assert!(out.starts_with("1d8+1 + "));
        }
    }
}

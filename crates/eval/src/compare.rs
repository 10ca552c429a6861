//! Operator semantics for leaf comparisons.
//!
//! `actual` is the resolved value of the comparison's variable; `expected`
//! is the resolved operand. Type mismatches are never errors: a comparison
//! that cannot apply to its operands is false. The one failure is a regex
//! pattern that does not compile.

use std::cmp::Ordering;
use std::collections::HashMap;

use clausal_core::Operator;
use regex::Regex;
use serde_json::Value;

use crate::numeric::{compare_numbers, numbers_equal};

/// Deep equality. Numbers compare by value; every other pairing needs the
/// same JSON type, so `"18"` never equals `18`.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => numbers_equal(l, r),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l
                    .iter()
                    .all(|(k, a)| r.get(k).is_some_and(|b| values_equal(a, b)))
        }
        _ => left == right,
    }
}

/// `empty`: true for `""`, `[]` and `null`.
pub fn is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Applies a value-free operator (`exists`, `empty`) to a present variable.
/// Value-taking operators are false here.
pub fn test_presence(op: Operator, actual: &Value) -> bool {
    match op {
        Operator::Exists => true,
        Operator::Empty => is_empty(actual),
        _ => false,
    }
}

/// Applies `op` to a present variable and a resolved operand.
pub fn compare(
    op: Operator,
    actual: &Value,
    expected: &Value,
    patterns: &mut PatternCache,
) -> Result<bool, regex::Error> {
    let result = match op {
        Operator::Exists | Operator::Empty => test_presence(op, actual),
        Operator::Eq => values_equal(actual, expected),
        Operator::Ne => !values_equal(actual, expected),
        Operator::Gt => ordering_is(actual, expected, |o| o == Ordering::Greater),
        Operator::Gte => ordering_is(actual, expected, |o| o != Ordering::Less),
        Operator::Lt => ordering_is(actual, expected, |o| o == Ordering::Less),
        Operator::Lte => ordering_is(actual, expected, |o| o != Ordering::Greater),
        Operator::In => expected
            .as_array()
            .is_some_and(|items| items.iter().any(|item| values_equal(item, actual))),
        Operator::Contains => match actual {
            Value::String(s) => expected.as_str().is_some_and(|needle| s.contains(needle)),
            Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
            _ => false,
        },
        Operator::StartsWith => match (actual.as_str(), expected.as_str()) {
            (Some(s), Some(prefix)) => s.starts_with(prefix),
            _ => false,
        },
        Operator::EndsWith => match (actual.as_str(), expected.as_str()) {
            (Some(s), Some(suffix)) => s.ends_with(suffix),
            _ => false,
        },
        Operator::Regex => match (actual.as_str(), expected.as_str()) {
            (Some(s), Some(pattern)) => patterns.get(pattern)?.is_match(s),
            _ => false,
        },
    };
    Ok(result)
}

fn ordering_is(actual: &Value, expected: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    compare_numbers(actual, expected).is_some_and(accept)
}

/// Compiled regex patterns, kept for the length of one pass.
#[derive(Debug, Default)]
pub struct PatternCache(HashMap<String, Regex>);

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, pattern: &str) -> Result<&Regex, regex::Error> {
        if !self.0.contains_key(pattern) {
            let compiled = Regex::new(pattern)?;
            self.0.insert(pattern.to_string(), compiled);
        }
        Ok(&self.0[pattern])
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

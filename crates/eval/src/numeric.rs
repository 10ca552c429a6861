//! Numeric handling for comparisons.
//!
//! JSON numbers are compared as `rust_decimal::Decimal` so `0.1 + 0.2`-style
//! representation noise cannot flip a threshold test on a salary or notice
//! period. Numbers outside the decimal range or precision (`1e300`, `1e-30`)
//! fall back to `f64`.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde_json::{Number, Value};

/// Converts a JSON number to a decimal. `None` when it is outside the
/// decimal range (e.g. `1e300`).
pub fn to_decimal(n: &Number) -> Option<Decimal> {
    let text = n.to_string();
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Orders two values when both are numbers. `None` for anything else.
pub fn compare_numbers(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (to_decimal(l), to_decimal(r)) {
            (Some(l), Some(r)) => Some(l.cmp(&r)),
            _ => l.as_f64()?.partial_cmp(&r.as_f64()?),
        },
        _ => None,
    }
}

/// Numeric equality: `1` equals `1.0`.
pub fn numbers_equal(left: &Number, right: &Number) -> bool {
    match (to_decimal(left), to_decimal(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left.as_f64() == right.as_f64(),
    }
}

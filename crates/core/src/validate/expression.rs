//! Expression-tree validation.

use serde_json::{Map, Value};

use super::{field, index, is_truthy, non_empty_str};
use crate::ast::{names, var_ref_name, Operator};
use crate::error::ValidationError;

const EXACTLY_ONE: &str = "expression must have exactly one of: all, any, not, or var+op";

/// Validate an expression node rooted at `path`.
///
/// A node that is not an object, or that does not select exactly one mode,
/// produces one error and is not descended into. Sibling nodes are still
/// checked.
pub fn validate_expression(expr: &Value, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_expression(expr, path, &mut errors);
    errors
}

fn check_expression(expr: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(obj) = expr.as_object() else {
        errors.push(ValidationError::new(path, "expression must be an object"));
        return;
    };

    let has_var = obj.contains_key("var");
    let has_op = obj.contains_key("op");
    let modes = [
        obj.contains_key("all"),
        obj.contains_key("any"),
        obj.contains_key("not"),
        has_var || has_op,
    ]
    .iter()
    .filter(|present| **present)
    .count();

    // A leaf needs var and op together; half a leaf is not a mode.
    if modes != 1 || has_var != has_op {
        errors.push(ValidationError::new(path, EXACTLY_ONE));
        return;
    }

    if let Some(items) = obj.get("all") {
        check_list("all", items, path, errors);
    } else if let Some(items) = obj.get("any") {
        check_list("any", items, path, errors);
    } else if let Some(inner) = obj.get("not") {
        let not_path = field(path, "not");
        if is_truthy(inner) {
            check_expression(inner, &not_path, errors);
        } else {
            errors.push(ValidationError::new(not_path, "'not' must be an expression"));
        }
    } else {
        check_leaf(obj, path, errors);
    }
}

fn check_list(mode: &str, items: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let list_path = field(path, mode);
    match items.as_array() {
        Some(items) if !items.is_empty() => {
            for (i, item) in items.iter().enumerate() {
                check_expression(item, &index(&list_path, i), errors);
            }
        }
        _ => errors.push(ValidationError::new(
            list_path,
            format!("'{}' must be a non-empty array of expressions", mode),
        )),
    }
}

fn check_leaf(obj: &Map<String, Value>, path: &str, errors: &mut Vec<ValidationError>) {
    if non_empty_str(obj.get("var")).is_none() {
        errors.push(ValidationError::new(
            field(path, "var"),
            "'var' must be a non-empty string",
        ));
    }

    let op = obj
        .get("op")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Operator>().ok());
    let Some(op) = op else {
        errors.push(ValidationError::new(
            field(path, "op"),
            format!(
                "'op' must be one of: {}",
                names(&Operator::ALL, Operator::as_str)
            ),
        ));
        return;
    };

    if !op.requires_value() {
        return;
    }

    let value_path = field(path, "value");
    let Some(value) = obj.get("value") else {
        errors.push(ValidationError::new(
            value_path,
            format!("'value' is required for operator '{}'", op),
        ));
        return;
    };

    if op == Operator::In && !value.is_array() && var_ref_name(value).is_none() {
        errors.push(ValidationError::new(
            value_path,
            "'value' for operator 'in' must be an array or a variable reference",
        ));
    }
}

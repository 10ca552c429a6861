//! Rule-level validation.

use serde_json::Value;

use super::{field, index, non_empty_str, validate_action, validate_expression, ROOT};
use crate::ast::{names, Severity};
use crate::error::ValidationError;

/// Validate a single rule. Paths are rooted at `$`.
///
/// Every field is checked independently; a bad `rule_id` does not stop the
/// `when` tree or the actions from being inspected.
pub fn validate_rule(rule: &Value) -> Vec<ValidationError> {
    let Some(obj) = rule.as_object() else {
        return vec![ValidationError::new(ROOT, "rule must be an object")];
    };
    let mut errors = Vec::new();

    if non_empty_str(obj.get("rule_id")).is_none() {
        errors.push(ValidationError::new(
            field(ROOT, "rule_id"),
            "'rule_id' must be a non-empty string",
        ));
    }

    let severity_ok = obj
        .get("severity")
        .and_then(Value::as_str)
        .is_some_and(|s| s.parse::<Severity>().is_ok());
    if !severity_ok {
        errors.push(ValidationError::new(
            field(ROOT, "severity"),
            format!(
                "'severity' must be one of: {}",
                names(&Severity::ALL, Severity::as_str)
            ),
        ));
    }

    if let Some(desc) = obj.get("description") {
        if !desc.is_string() {
            errors.push(ValidationError::new(
                field(ROOT, "description"),
                "'description' must be a string",
            ));
        }
    }

    let when_path = field(ROOT, "when");
    match obj.get("when") {
        None | Some(Value::Null) => {
            errors.push(ValidationError::new(when_path, "'when' is required"));
        }
        Some(when) => errors.extend(validate_expression(when, &when_path)),
    }

    let then_path = field(ROOT, "then");
    match obj.get("then").and_then(Value::as_array) {
        Some(actions) if !actions.is_empty() => {
            for (i, action) in actions.iter().enumerate() {
                errors.extend(validate_action(action, &index(&then_path, i)));
            }
        }
        _ => errors.push(ValidationError::new(
            then_path,
            "'then' must be a non-empty array of actions",
        )),
    }

    errors
}

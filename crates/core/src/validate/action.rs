//! Action validation.

use serde_json::{Map, Value};

use super::{field, non_empty_str};
use crate::ast::{names, ActionKind, ClauseStatus};
use crate::error::ValidationError;

/// Validate one entry of a rule's `then` list, rooted at `path`.
///
/// An unknown or missing `action` kind stops the check for this entry;
/// otherwise every field required by the kind is checked.
pub fn validate_action(action: &Value, path: &str) -> Vec<ValidationError> {
    let Some(obj) = action.as_object() else {
        return vec![ValidationError::new(path, "action must be an object")];
    };

    let kind = obj
        .get("action")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<ActionKind>().ok());
    let Some(kind) = kind else {
        return vec![ValidationError::new(
            field(path, "action"),
            format!(
                "'action' must be one of: {}",
                names(&ActionKind::ALL, ActionKind::as_str)
            ),
        )];
    };

    let mut errors = Vec::new();
    match kind {
        ActionKind::Warn => {
            require_str(obj, "message", path, &mut errors);
            if let Some(ctx) = obj.get("context") {
                if !ctx.is_object() {
                    errors.push(ValidationError::new(
                        field(path, "context"),
                        "'context' must be an object",
                    ));
                }
            }
        }
        ActionKind::Block => require_str(obj, "message", path, &mut errors),
        ActionKind::SetClauseStatus => {
            require_str(obj, "clause_id", path, &mut errors);
            let status_ok = obj
                .get("status")
                .and_then(Value::as_str)
                .is_some_and(|s| s.parse::<ClauseStatus>().is_ok());
            if !status_ok {
                errors.push(ValidationError::new(
                    field(path, "status"),
                    format!(
                        "'status' must be one of: {}",
                        names(&ClauseStatus::ALL, ClauseStatus::as_str)
                    ),
                ));
            }
        }
        ActionKind::SetVariant => {
            require_str(obj, "clause_id", path, &mut errors);
            require_str(obj, "variant_id", path, &mut errors);
        }
        ActionKind::AddQuestion => require_str(obj, "question_key", path, &mut errors),
        ActionKind::SetVariable => {
            require_str(obj, "variable_key", path, &mut errors);
            // Any value, null included; only a missing key is an error.
            if !obj.contains_key("value") {
                errors.push(ValidationError::new(
                    field(path, "value"),
                    "'value' is required",
                ));
            }
        }
    }
    errors
}

fn require_str(
    obj: &Map<String, Value>,
    name: &str,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    if non_empty_str(obj.get(name)).is_none() {
        errors.push(ValidationError::new(
            field(path, name),
            format!("'{}' must be a non-empty string", name),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(action: Value) -> Vec<ValidationError> {
        validate_action(&action, "$.then[0]")
    }

    fn paths(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn well_formed_actions_pass() {
        let actions = [
            json!({ "action": "warn", "message": "review notice period", "context": { "clause": "c_notice" } }),
            json!({ "action": "block", "message": "must be adult" }),
            json!({ "action": "set_clause_status", "clause_id": "c_probation", "status": "mandatory" }),
            json!({ "action": "set_variant", "clause_id": "c_leave", "variant_id": "v_casual" }),
            json!({ "action": "add_question", "question_key": "q_overtime" }),
            json!({ "action": "set_variable", "variable_key": "notice_weeks", "value": 4 }),
        ];
        for action in actions {
            assert!(check(action.clone()).is_empty(), "{}", action);
        }
    }

    #[test]
    fn non_object_action() {
        assert_eq!(
            check(json!("warn")),
            vec![ValidationError::new("$.then[0]", "action must be an object")]
        );
    }

    #[test]
    fn unknown_kind_stops_checks() {
        let errors = check(json!({ "action": "delete_clause", "clause_id": "" }));
        assert_eq!(paths(&errors), vec!["$.then[0].action"]);
        assert_eq!(
            errors[0].message,
            "'action' must be one of: warn, block, set_clause_status, set_variant, add_question, set_variable"
        );
        assert_eq!(paths(&check(json!({ "message": "x" }))), vec!["$.then[0].action"]);
    }

    #[test]
    fn warn_context_must_be_object() {
        let errors = check(json!({ "action": "warn", "message": "", "context": "c_notice" }));
        assert_eq!(
            paths(&errors),
            vec!["$.then[0].message", "$.then[0].context"]
        );
    }

    #[test]
    fn set_clause_status_checks_both_fields() {
        let errors = check(json!({ "action": "set_clause_status", "status": "deleted" }));
        assert_eq!(
            paths(&errors),
            vec!["$.then[0].clause_id", "$.then[0].status"]
        );
        assert_eq!(
            errors[1].message,
            "'status' must be one of: included, excluded, mandatory, optional, recommended"
        );
    }

    #[test]
    fn set_variant_requires_both_ids() {
        let errors = check(json!({ "action": "set_variant" }));
        assert_eq!(
            paths(&errors),
            vec!["$.then[0].clause_id", "$.then[0].variant_id"]
        );
    }

    #[test]
    fn add_question_requires_key() {
        let errors = check(json!({ "action": "add_question", "question_key": 3 }));
        assert_eq!(paths(&errors), vec!["$.then[0].question_key"]);
    }

    #[test]
    fn set_variable_accepts_null_but_not_absence() {
        assert!(check(json!({ "action": "set_variable", "variable_key": "k", "value": null })).is_empty());
        let errors = check(json!({ "action": "set_variable", "variable_key": "k" }));
        assert_eq!(
            errors,
            vec![ValidationError::new("$.then[0].value", "'value' is required")]
        );
    }
}

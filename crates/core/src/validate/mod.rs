//! Structural validation of untrusted rule documents.
//!
//! Validation walks raw `serde_json::Value` trees rather than typed
//! structs so that one pass can report every problem in a template, not
//! just the first one serde would trip over. Errors are produced
//! depth-first in document order, which keeps the output stable for
//! authors and for tests.

mod action;
mod expression;
mod rule;

pub use action::validate_action;
pub use expression::validate_expression;
pub use rule::validate_rule;

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::ValidationError;

/// Path of the document root.
pub const ROOT: &str = "$";

/// Validate a sequence of rules.
///
/// A payload that is not an array yields a single error at `$`. Otherwise
/// each rule is validated on its own and its error paths are re-rooted at
/// `$[<index>]`. An empty result means the payload is well-formed.
pub fn validate_rules(payload: &Value) -> Vec<ValidationError> {
    let Some(rules) = payload.as_array() else {
        return vec![ValidationError::new(ROOT, "rules must be an array")];
    };
    validate_sequence(rules, ROOT)
}

/// Validate an on-disk rule document: either a bare rule array or an
/// object carrying the array under `rules`. Errors in the object form are
/// rooted at `$.rules[<index>]`.
pub fn validate_document(doc: &Value) -> Vec<ValidationError> {
    match doc {
        Value::Array(rules) => validate_sequence(rules, ROOT),
        Value::Object(obj) => match obj.get("rules") {
            Some(Value::Array(rules)) => validate_sequence(rules, "$.rules"),
            Some(_) => vec![ValidationError::new("$.rules", "'rules' must be an array")],
            None => vec![ValidationError::new(ROOT, DOCUMENT_SHAPE)],
        },
        _ => vec![ValidationError::new(ROOT, DOCUMENT_SHAPE)],
    }
}

const DOCUMENT_SHAPE: &str = "document must be an array of rules or an object with a 'rules' array";

fn validate_sequence(rules: &[Value], root: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for (i, rule) in rules.iter().enumerate() {
        let prefix = format!("{}[{}]", root, i);
        errors.extend(
            validate_rule(rule)
                .into_iter()
                .map(|e| e.rebased(&prefix)),
        );

        // Rule ids are the override key for later tooling; a repeat is
        // reported against the later occurrence.
        if let Some(id) = non_empty_str(rule.get("rule_id")) {
            match first_seen.get(id) {
                Some(first) => errors.push(ValidationError::new(
                    format!("{}.rule_id", prefix),
                    format!(
                        "duplicate rule_id '{}' (first defined at {}[{}])",
                        id, root, first
                    ),
                )),
                None => {
                    first_seen.insert(id, i);
                }
            }
        }
    }

    debug!(
        rules = rules.len(),
        errors = errors.len(),
        "validated rule sequence"
    );
    errors
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Appends a child member to a path: `$.when` + `all` gives `$.when.all`.
pub(crate) fn field(path: &str, name: &str) -> String {
    format!("{}.{}", path, name)
}

/// Appends an index to a path: `$.then` + 2 gives `$.then[2]`.
pub(crate) fn index(path: &str, i: usize) -> String {
    format!("{}[{}]", path, i)
}

pub(crate) fn non_empty_str(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// JavaScript-style truthiness over JSON: `null`, `false`, `0` and `""`
/// are falsy, everything else (including `[]` and `{}`) is truthy.
pub(crate) fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

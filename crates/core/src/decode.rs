//! Decoding rule documents into the typed model.
//!
//! [`RuleSet::from_json`] is strict and stops at the first problem. It does
//! not re-run the validator: a document that decodes cleanly here may still
//! break rules the validator enforces (empty `all` lists, empty ids). Use
//! [`load_rule_set`] to get both.

use serde_json::{Map, Value};
use tracing::debug;

use crate::ast::*;
use crate::error::ValidationError;
use crate::validate::validate_document;

/// Errors while decoding a rule document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("{path}: unknown operator '{op}'")]
    UnknownOperator { path: String, op: String },
    #[error("{path}: unknown action kind '{action}'")]
    UnknownAction { path: String, action: String },
    #[error("{path}: unknown severity '{severity}'")]
    UnknownSeverity { path: String, severity: String },
    #[error("{path}: unknown clause status '{status}'")]
    UnknownStatus { path: String, status: String },
    #[error("{path}: {message}")]
    Malformed { path: String, message: String },
}

/// Errors from [`load_rule_set`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("rule document has {} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Validate a rule document and decode it.
///
/// This is the gate between authored templates and the evaluator: any
/// validation error rejects the whole document.
pub fn load_rule_set(doc: &Value) -> Result<RuleSet, LoadError> {
    let errors = validate_document(doc);
    if !errors.is_empty() {
        return Err(LoadError::Invalid(errors));
    }
    let rule_set = RuleSet::from_json(doc)?;
    debug!(rules = rule_set.len(), "loaded rule set");
    Ok(rule_set)
}

impl RuleSet {
    /// Decode a bare rule array or a `{"rules": [...]}` document.
    pub fn from_json(doc: &Value) -> Result<RuleSet, DecodeError> {
        let (rules, root) = match doc {
            Value::Array(rules) => (rules, "$"),
            Value::Object(obj) => match obj.get("rules") {
                Some(Value::Array(rules)) => (rules, "$.rules"),
                _ => return Err(malformed("$.rules", "expected an array of rules")),
            },
            _ => {
                return Err(malformed(
                    "$",
                    "expected an array of rules or an object with 'rules'",
                ))
            }
        };

        let rules = rules
            .iter()
            .enumerate()
            .map(|(i, r)| decode_rule(r, &format!("{}[{}]", root, i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet { rules })
    }
}

impl Rule {
    /// Decode a single rule; paths in errors are rooted at `$`.
    pub fn from_json(v: &Value) -> Result<Rule, DecodeError> {
        decode_rule(v, "$")
    }
}

impl Expression {
    /// Decode a single expression; paths in errors are rooted at `$`.
    pub fn from_json(v: &Value) -> Result<Expression, DecodeError> {
        decode_expression(v, "$")
    }
}

impl Action {
    /// Decode a single action; paths in errors are rooted at `$`.
    pub fn from_json(v: &Value) -> Result<Action, DecodeError> {
        decode_action(v, "$")
    }
}

// ── Decoding helpers ────────────────────────────────────────────────

fn malformed(path: &str, message: impl Into<String>) -> DecodeError {
    DecodeError::Malformed {
        path: path.to_string(),
        message: message.into(),
    }
}

fn as_object<'a>(v: &'a Value, path: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    v.as_object()
        .ok_or_else(|| malformed(path, "expected an object"))
}

fn required_str(obj: &Map<String, Value>, name: &str, path: &str) -> Result<String, DecodeError> {
    obj.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed(&format!("{}.{}", path, name), "expected a string"))
}

fn decode_rule(v: &Value, path: &str) -> Result<Rule, DecodeError> {
    let obj = as_object(v, path)?;
    let rule_id = required_str(obj, "rule_id", path)?;

    let severity_path = format!("{}.severity", path);
    let severity_name = required_str(obj, "severity", path)?;
    let severity = severity_name
        .parse::<Severity>()
        .map_err(|severity| DecodeError::UnknownSeverity {
            path: severity_path,
            severity,
        })?;

    let description = match obj.get("description") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(malformed(&format!("{}.description", path), "expected a string")),
    };

    let when_path = format!("{}.when", path);
    let when = obj
        .get("when")
        .ok_or_else(|| malformed(&when_path, "missing condition"))?;
    let when = decode_expression(when, &when_path)?;

    let then_path = format!("{}.then", path);
    let then = obj
        .get("then")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(&then_path, "expected an array of actions"))?
        .iter()
        .enumerate()
        .map(|(i, a)| decode_action(a, &format!("{}[{}]", then_path, i)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Rule {
        rule_id,
        severity,
        description,
        when,
        then,
    })
}

fn decode_expression(v: &Value, path: &str) -> Result<Expression, DecodeError> {
    let obj = as_object(v, path)?;

    let has_var = obj.contains_key("var");
    let has_op = obj.contains_key("op");
    let modes = ["all", "any", "not"]
        .iter()
        .filter(|key| obj.contains_key(**key))
        .count()
        + usize::from(has_var || has_op);
    if modes != 1 || has_var != has_op {
        return Err(malformed(
            path,
            "expression must have exactly one of: all, any, not, or var+op",
        ));
    }

    if let Some(items) = obj.get("all") {
        return Ok(Expression::All(decode_list(items, &format!("{}.all", path))?));
    }
    if let Some(items) = obj.get("any") {
        return Ok(Expression::Any(decode_list(items, &format!("{}.any", path))?));
    }
    if let Some(inner) = obj.get("not") {
        let inner = decode_expression(inner, &format!("{}.not", path))?;
        return Ok(Expression::Not(Box::new(inner)));
    }

    let var = required_str(obj, "var", path)?;
    let op_name = required_str(obj, "op", path)?;
    let op = op_name
        .parse::<Operator>()
        .map_err(|op| DecodeError::UnknownOperator {
            path: format!("{}.op", path),
            op,
        })?;

    let value = if op.requires_value() {
        let value = obj
            .get("value")
            .ok_or_else(|| malformed(&format!("{}.value", path), "missing comparison value"))?;
        Some(Operand::from_json(value))
    } else {
        None
    };

    Ok(Expression::Compare(Comparison { var, op, value }))
}

fn decode_list(items: &Value, path: &str) -> Result<Vec<Expression>, DecodeError> {
    items
        .as_array()
        .ok_or_else(|| malformed(path, "expected an array of expressions"))?
        .iter()
        .enumerate()
        .map(|(i, item)| decode_expression(item, &format!("{}[{}]", path, i)))
        .collect()
}

fn decode_action(v: &Value, path: &str) -> Result<Action, DecodeError> {
    let obj = as_object(v, path)?;
    let kind_name = required_str(obj, "action", path)?;
    let kind = kind_name
        .parse::<ActionKind>()
        .map_err(|action| DecodeError::UnknownAction {
            path: format!("{}.action", path),
            action,
        })?;

    let action = match kind {
        ActionKind::Warn => {
            let context = match obj.get("context") {
                None => None,
                Some(Value::Object(ctx)) => Some(ctx.clone()),
                Some(_) => {
                    return Err(malformed(&format!("{}.context", path), "expected an object"))
                }
            };
            Action::Warn {
                message: required_str(obj, "message", path)?,
                context,
            }
        }
        ActionKind::Block => Action::Block {
            message: required_str(obj, "message", path)?,
        },
        ActionKind::SetClauseStatus => {
            let clause_id = required_str(obj, "clause_id", path)?;
            let status = required_str(obj, "status", path)?
                .parse::<ClauseStatus>()
                .map_err(|status| DecodeError::UnknownStatus {
                    path: format!("{}.status", path),
                    status,
                })?;
            Action::SetClauseStatus { clause_id, status }
        }
        ActionKind::SetVariant => Action::SetVariant {
            clause_id: required_str(obj, "clause_id", path)?,
            variant_id: required_str(obj, "variant_id", path)?,
        },
        ActionKind::AddQuestion => Action::AddQuestion {
            question_key: required_str(obj, "question_key", path)?,
        },
        ActionKind::SetVariable => Action::SetVariable {
            variable_key: required_str(obj, "variable_key", path)?,
            value: obj
                .get("value")
                .cloned()
                .ok_or_else(|| malformed(&format!("{}.value", path), "missing value"))?,
        },
    };
    Ok(action)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

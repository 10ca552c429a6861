//! Typed model of the clause rule language.
//!
//! These types are produced by [`crate::decode`] from JSON rule documents
//! and consumed by the evaluator. Every enum here is closed: an expression
//! node is exactly one of all/any/not/comparison, so the "exactly one mode"
//! constraint the validator checks on raw JSON holds by construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ──────────────────────────────────────────────
// Named enums
// ──────────────────────────────────────────────

/// Comparison operator of a leaf expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    Exists,
    Empty,
}

impl Operator {
    /// Every operator, in wire-format order.
    pub const ALL: [Operator; 13] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Regex,
        Operator::Exists,
        Operator::Empty,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Regex => "regex",
            Operator::Exists => "exists",
            Operator::Empty => "empty",
        }
    }

    /// `exists` and `empty` test the variable alone; every other operator
    /// compares it against a `value`.
    pub fn requires_value(self) -> bool {
        !matches!(self, Operator::Exists | Operator::Empty)
    }
}

/// Inclusion status a rule can assign to a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseStatus {
    Included,
    Excluded,
    Mandatory,
    Optional,
    Recommended,
}

impl ClauseStatus {
    pub const ALL: [ClauseStatus; 5] = [
        ClauseStatus::Included,
        ClauseStatus::Excluded,
        ClauseStatus::Mandatory,
        ClauseStatus::Optional,
        ClauseStatus::Recommended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClauseStatus::Included => "included",
            ClauseStatus::Excluded => "excluded",
            ClauseStatus::Mandatory => "mandatory",
            ClauseStatus::Optional => "optional",
            ClauseStatus::Recommended => "recommended",
        }
    }
}

/// Advisory classification of a rule. The evaluator acts on action kinds,
/// not on severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Block,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Block];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Block => "block",
        }
    }
}

/// Discriminant of an [`Action`], as named by its `"action"` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Warn,
    Block,
    SetClauseStatus,
    SetVariant,
    AddQuestion,
    SetVariable,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Warn,
        ActionKind::Block,
        ActionKind::SetClauseStatus,
        ActionKind::SetVariant,
        ActionKind::AddQuestion,
        ActionKind::SetVariable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Warn => "warn",
            ActionKind::Block => "block",
            ActionKind::SetClauseStatus => "set_clause_status",
            ActionKind::SetVariant => "set_variant",
            ActionKind::AddQuestion => "add_question",
            ActionKind::SetVariable => "set_variable",
        }
    }
}

macro_rules! named_enum_impls {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = String;

            /// Parses the wire name; the error carries the rejected input.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| s.to_string())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_enum_impls!(Operator);
named_enum_impls!(ClauseStatus);
named_enum_impls!(Severity);
named_enum_impls!(ActionKind);

/// Comma-separated wire names, for error messages.
pub fn names<T: Copy>(all: &[T], name: fn(T) -> &'static str) -> String {
    all.iter()
        .map(|v| name(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

/// A boolean condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Conjunction over a non-empty list.
    All(Vec<Expression>),
    /// Disjunction over a non-empty list.
    Any(Vec<Expression>),
    Not(Box<Expression>),
    Compare(Comparison),
}

/// A leaf test of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub var: String,
    pub op: Operator,
    /// Absent for `exists` / `empty`.
    pub value: Option<Operand>,
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// `{"var": "..."}`, resolved against the facts at evaluation time.
    VarRef(String),
}

impl Operand {
    /// Reads an operand from its wire form. An object whose `var` member is
    /// a string is a variable reference; anything else is a literal.
    pub fn from_json(v: &Value) -> Operand {
        match var_ref_name(v) {
            Some(name) => Operand::VarRef(name.to_string()),
            None => Operand::Literal(v.clone()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Operand::Literal(v) => v.clone(),
            Operand::VarRef(name) => json!({ "var": name }),
        }
    }
}

/// Name of the referenced variable when `v` is `{"var": "<name>"}`.
pub fn var_ref_name(v: &Value) -> Option<&str> {
    v.as_object()?.get("var")?.as_str()
}

impl Expression {
    pub fn to_json(&self) -> Value {
        match self {
            Expression::All(items) => {
                json!({ "all": items.iter().map(Expression::to_json).collect::<Vec<_>>() })
            }
            Expression::Any(items) => {
                json!({ "any": items.iter().map(Expression::to_json).collect::<Vec<_>>() })
            }
            Expression::Not(inner) => json!({ "not": inner.to_json() }),
            Expression::Compare(cmp) => {
                let mut obj = Map::new();
                obj.insert("var".to_string(), Value::String(cmp.var.clone()));
                obj.insert("op".to_string(), Value::String(cmp.op.as_str().to_string()));
                if let Some(value) = &cmp.value {
                    obj.insert("value".to_string(), value.to_json());
                }
                Value::Object(obj)
            }
        }
    }
}

// ──────────────────────────────────────────────
// Actions
// ──────────────────────────────────────────────

/// Effect applied to the decision state when a rule fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Warn {
        message: String,
        context: Option<Map<String, Value>>,
    },
    Block {
        message: String,
    },
    SetClauseStatus {
        clause_id: String,
        status: ClauseStatus,
    },
    SetVariant {
        clause_id: String,
        variant_id: String,
    },
    AddQuestion {
        question_key: String,
    },
    SetVariable {
        variable_key: String,
        value: Value,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Warn { .. } => ActionKind::Warn,
            Action::Block { .. } => ActionKind::Block,
            Action::SetClauseStatus { .. } => ActionKind::SetClauseStatus,
            Action::SetVariant { .. } => ActionKind::SetVariant,
            Action::AddQuestion { .. } => ActionKind::AddQuestion,
            Action::SetVariable { .. } => ActionKind::SetVariable,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            "action".to_string(),
            Value::String(self.kind().as_str().to_string()),
        );
        let mut put = |k: &str, v: Value| {
            obj.insert(k.to_string(), v);
        };
        match self {
            Action::Warn { message, context } => {
                put("message", Value::String(message.clone()));
                if let Some(ctx) = context {
                    put("context", Value::Object(ctx.clone()));
                }
            }
            Action::Block { message } => put("message", Value::String(message.clone())),
            Action::SetClauseStatus { clause_id, status } => {
                put("clause_id", Value::String(clause_id.clone()));
                put("status", Value::String(status.as_str().to_string()));
            }
            Action::SetVariant {
                clause_id,
                variant_id,
            } => {
                put("clause_id", Value::String(clause_id.clone()));
                put("variant_id", Value::String(variant_id.clone()));
            }
            Action::AddQuestion { question_key } => {
                put("question_key", Value::String(question_key.clone()))
            }
            Action::SetVariable {
                variable_key,
                value,
            } => {
                put("variable_key", Value::String(variable_key.clone()));
                put("value", value.clone());
            }
        }
        Value::Object(obj)
    }
}

// ──────────────────────────────────────────────
// Rules
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub rule_id: String,
    pub severity: Severity,
    pub description: Option<String>,
    pub when: Expression,
    pub then: Vec<Action>,
}

impl Rule {
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("rule_id".to_string(), Value::String(self.rule_id.clone()));
        obj.insert(
            "severity".to_string(),
            Value::String(self.severity.as_str().to_string()),
        );
        if let Some(desc) = &self.description {
            obj.insert("description".to_string(), Value::String(desc.clone()));
        }
        obj.insert("when".to_string(), self.when.to_json());
        obj.insert(
            "then".to_string(),
            Value::Array(self.then.iter().map(Action::to_json).collect()),
        );
        Value::Object(obj)
    }
}

/// An ordered rule set. Document order is significant: rules are applied
/// in sequence and later writes win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serializes to the `{"rules": [...]}` document form.
    pub fn to_json(&self) -> Value {
        json!({ "rules": self.rules.iter().map(Rule::to_json).collect::<Vec<_>>() })
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>(), Ok(op));
        }
        assert_eq!("between".parse::<Operator>(), Err("between".to_string()));
    }

    #[test]
    fn only_exists_and_empty_take_no_value() {
        let no_value: Vec<_> = Operator::ALL
            .iter()
            .filter(|op| !op.requires_value())
            .collect();
        assert_eq!(no_value, vec![&Operator::Exists, &Operator::Empty]);
    }

    #[test]
    fn operand_detects_var_refs() {
        assert_eq!(
            Operand::from_json(&json!({ "var": "limit" })),
            Operand::VarRef("limit".to_string())
        );
        assert_eq!(
            Operand::from_json(&json!({ "var": 3 })),
            Operand::Literal(json!({ "var": 3 }))
        );
        assert_eq!(
            Operand::from_json(&json!(["a", "b"])),
            Operand::Literal(json!(["a", "b"]))
        );
    }

    #[test]
    fn serde_names_match_wire_names() {
        assert_eq!(
            serde_json::to_value(Operator::StartsWith).unwrap(),
            json!("starts_with")
        );
        assert_eq!(
            serde_json::to_value(ClauseStatus::Recommended).unwrap(),
            json!("recommended")
        );
    }

    #[test]
    fn action_to_json_omits_absent_context() {
        let action = Action::Warn {
            message: "check notice period".to_string(),
            context: None,
        };
        assert_eq!(
            action.to_json(),
            json!({ "action": "warn", "message": "check notice period" })
        );
    }
}

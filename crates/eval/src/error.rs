//! Evaluation errors.
//!
//! Business outcomes (`warn`, `block` actions) are not errors; they are
//! carried in the [`crate::DecisionState`]. Everything here means the pass
//! could not be completed and no decision state may be used.

use clausal_core::{DecodeError, Operator};

/// A pass-fatal evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The rule document could not be decoded (unknown operator or action
    /// kind, missing fields): the document was written for a different
    /// version of the rule language.
    #[error("invalid rule document: {0}")]
    Decode(#[from] DecodeError),

    /// A `{"var": ...}` operand did not resolve and strict references are on.
    #[error("rule '{rule_id}': unresolved variable reference '{var}'")]
    UnresolvedReference { rule_id: String, var: String },

    /// A comparison that needs a value was built without one.
    #[error("rule '{rule_id}': operator '{op}' has no comparison value")]
    MissingOperand { rule_id: String, op: Operator },

    #[error("rule '{rule_id}': invalid regex pattern '{pattern}': {message}")]
    InvalidPattern {
        rule_id: String,
        pattern: String,
        message: String,
    },
}

/// Errors reading a fact environment from JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactsError {
    #[error("facts must be a JSON object")]
    NotAnObject,
    #[error("'{section}' must be a JSON object")]
    InvalidSection { section: String },
    #[error("clause '{clause_id}': unknown status '{status}'")]
    InvalidClauseStatus { clause_id: String, status: String },
    #[error("clause '{clause_id}': variant id must be a string")]
    InvalidVariant { clause_id: String },
}

/// Document assembly refused because the pass produced block errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("generation blocked: {}", .messages.join("; "))]
pub struct Blocked {
    pub messages: Vec<String>,
}

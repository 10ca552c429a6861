//! clausal-eval: runs a rule set against a fact environment.
//!
//! One evaluation pass reads its two inputs without mutating them and
//! returns a [`DecisionState`]: clause statuses, variant selections,
//! derived variables, warnings, block errors, follow-up questions and a
//! per-rule provenance trace. Passes share nothing, so independent drafts
//! can be evaluated on as many threads as the caller likes.
//!
//! Rule documents are expected to have passed
//! [`clausal_core::validate_rules`] first; anything that still fails to
//! decode is an [`EvalError`], never a silently skipped rule.

pub mod compare;
pub mod decision;
pub mod error;
pub mod facts;
pub mod numeric;
pub mod options;
pub mod predicate;
pub mod provenance;
pub mod rules;

pub use decision::{BlockError, DecisionState, Warning};
pub use error::{Blocked, EvalError, FactsError};
pub use facts::{FactEnv, FactSource, FnSource};
pub use options::EvalOptions;
pub use provenance::RuleFiring;

use clausal_core::RuleSet;

/// Evaluate a rule set with default options.
pub fn evaluate<F: FactSource + ?Sized>(
    rule_set: &RuleSet,
    facts: &F,
) -> Result<DecisionState, EvalError> {
    rules::run_pass(rule_set, facts, &EvalOptions::default())
}

/// Evaluate a rule set with explicit options.
pub fn evaluate_with<F: FactSource + ?Sized>(
    rule_set: &RuleSet,
    facts: &F,
    options: &EvalOptions,
) -> Result<DecisionState, EvalError> {
    rules::run_pass(rule_set, facts, options)
}

/// Decode a rule document and evaluate it.
///
/// The document is decoded strictly but not validated; callers holding
/// untrusted input should gate it with [`clausal_core::load_rule_set`].
///
/// # Arguments
/// * `doc` - Rule document: an array of rules or `{"rules": [...]}`
/// * `facts` - Any fact source
/// * `options` - Pass options
pub fn evaluate_document<F: FactSource + ?Sized>(
    doc: &serde_json::Value,
    facts: &F,
    options: &EvalOptions,
) -> Result<DecisionState, EvalError> {
    let rule_set = RuleSet::from_json(doc)?;
    rules::run_pass(&rule_set, facts, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluate_document_reports_version_skew() {
        let doc = json!([{
            "rule_id": "r1",
            "severity": "info",
            "when": { "var": "age", "op": "between", "value": [18, 65] },
            "then": [{ "action": "warn", "message": "x" }]
        }]);
        let err = evaluate_document(&doc, &json!({ "age": 30 }), &EvalOptions::default())
            .unwrap_err();
        assert!(matches!(err, EvalError::Decode(_)));
        assert!(err.to_string().contains("$[0].when.op"), "{}", err);
    }

    #[test]
    fn evaluate_document_fails_on_mixed_mode_condition() {
        let doc = json!([{
            "rule_id": "r1",
            "severity": "warning",
            "when": {
                "all": [{ "var": "x", "op": "exists" }],
                "var": "x",
                "op": "eq",
                "value": 999
            },
            "then": [{ "action": "warn", "message": "x is 999" }]
        }]);
        let err = evaluate_document(&doc, &json!({ "x": 1 }), &EvalOptions::default())
            .unwrap_err();
        assert!(matches!(err, EvalError::Decode(_)));
        assert!(err.to_string().contains("$[0].when"), "{}", err);
    }

    #[test]
    fn evaluate_accepts_any_source() {
        let set = RuleSet::from_json(&json!([{
            "rule_id": "r1",
            "severity": "info",
            "when": { "var": "state", "op": "eq", "value": "NSW" },
            "then": [{ "action": "add_question", "question_key": "q_nsw_award" }]
        }]))
        .unwrap();
        let source = FnSource(|key: &str| (key == "state").then(|| json!("NSW")));
        let state = evaluate(&set, &source).unwrap();
        assert_eq!(state.questions, vec!["q_nsw_award"]);

        let dyn_source: &dyn FactSource = &source;
        assert_eq!(evaluate(&set, dyn_source).unwrap(), state);
    }
}

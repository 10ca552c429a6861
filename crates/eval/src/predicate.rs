//! Condition evaluator.
//!
//! Evaluates a rule's `when` tree against the facts and the decisions made
//! so far in the pass. An absent variable never satisfies a positive
//! comparison: only `empty` is true for it.

use std::borrow::Cow;

use clausal_core::{Comparison, Expression, Operand, Operator};
use serde_json::Value;

use crate::compare::{compare, test_presence, PatternCache};
use crate::decision::DecisionState;
use crate::error::EvalError;
use crate::facts::FactSource;
use crate::options::EvalOptions;
use crate::provenance::ProvenanceCollector;

const CLAUSE_PREFIX: &str = "clauses.";
const VARIANT_PREFIX: &str = "variants.";

/// What a condition can see while one rule is evaluated.
pub struct Scope<'a, F: FactSource + ?Sized> {
    pub rule_id: &'a str,
    pub facts: &'a F,
    pub state: &'a DecisionState,
    pub options: &'a EvalOptions,
}

impl<F: FactSource + ?Sized> Scope<'_, F> {
    /// Resolve a variable key.
    ///
    /// Variables set earlier in the pass shadow the facts. `clauses.<id>`
    /// and `variants.<id>` fall through to the clause decisions, the pass's
    /// own first and then the baseline carried by the facts.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        if let Some(v) = self.state.variables.get(key) {
            return Some(v.clone());
        }
        if let Some(v) = self.facts.resolve(key) {
            return Some(v);
        }
        if let Some(clause_id) = key.strip_prefix(CLAUSE_PREFIX) {
            return self
                .state
                .clauses
                .get(clause_id)
                .copied()
                .or_else(|| self.facts.clause_status(clause_id))
                .map(|status| Value::String(status.as_str().to_string()));
        }
        if let Some(clause_id) = key.strip_prefix(VARIANT_PREFIX) {
            return self
                .state
                .variants
                .get(clause_id)
                .cloned()
                .or_else(|| self.facts.variant(clause_id))
                .map(Value::String);
        }
        None
    }
}

/// Evaluate a condition tree. `all` and `any` short-circuit left to right.
pub fn eval_expr<F: FactSource + ?Sized>(
    expr: &Expression,
    scope: &Scope<'_, F>,
    patterns: &mut PatternCache,
    collector: &mut ProvenanceCollector,
) -> Result<bool, EvalError> {
    match expr {
        Expression::All(items) => {
            for item in items {
                if !eval_expr(item, scope, patterns, collector)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expression::Any(items) => {
            for item in items {
                if eval_expr(item, scope, patterns, collector)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expression::Not(inner) => Ok(!eval_expr(inner, scope, patterns, collector)?),
        Expression::Compare(cmp) => eval_comparison(cmp, scope, patterns, collector),
    }
}

fn eval_comparison<F: FactSource + ?Sized>(
    cmp: &Comparison,
    scope: &Scope<'_, F>,
    patterns: &mut PatternCache,
    collector: &mut ProvenanceCollector,
) -> Result<bool, EvalError> {
    collector.record_variable(&cmp.var);
    let actual = scope.lookup(&cmp.var);

    if !cmp.op.requires_value() {
        return Ok(match &actual {
            Some(v) => test_presence(cmp.op, v),
            None => cmp.op == Operator::Empty,
        });
    }

    // Resolve the operand before looking at `actual` so strict mode reports
    // a dangling reference even when the compared variable is absent.
    let expected: Cow<'_, Value> = match &cmp.value {
        None => {
            return Err(EvalError::MissingOperand {
                rule_id: scope.rule_id.to_string(),
                op: cmp.op,
            })
        }
        Some(Operand::Literal(v)) => Cow::Borrowed(v),
        Some(Operand::VarRef(name)) => {
            collector.record_variable(name);
            match scope.lookup(name) {
                Some(v) => Cow::Owned(v),
                None if scope.options.strict_references => {
                    return Err(EvalError::UnresolvedReference {
                        rule_id: scope.rule_id.to_string(),
                        var: name.clone(),
                    })
                }
                None => {
                    tracing::trace!(rule_id = scope.rule_id, var = %name, "unresolved reference");
                    return Ok(false);
                }
            }
        }
    };

    let Some(actual) = actual else {
        return Ok(false);
    };

    compare(cmp.op, &actual, &expected, patterns).map_err(|e| EvalError::InvalidPattern {
        rule_id: scope.rule_id.to_string(),
        pattern: expected.as_str().unwrap_or_default().to_string(),
        message: e.to_string(),
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

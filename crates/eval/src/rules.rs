//! Sequential rule evaluation.
//!
//! Rules run once each, in document order. A fired rule's actions are
//! applied before the next rule's condition is evaluated, so variables it
//! sets are visible downstream; earlier rules are never revisited.

use clausal_core::{Action, Rule, RuleSet};

use crate::compare::PatternCache;
use crate::decision::DecisionState;
use crate::error::EvalError;
use crate::facts::FactSource;
use crate::options::EvalOptions;
use crate::predicate::{eval_expr, Scope};
use crate::provenance::ProvenanceCollector;

/// Run one pass over `rule_set`, producing a fresh decision state.
pub fn run_pass<F: FactSource + ?Sized>(
    rule_set: &RuleSet,
    facts: &F,
    options: &EvalOptions,
) -> Result<DecisionState, EvalError> {
    let mut state = DecisionState::new();
    let mut patterns = PatternCache::new();

    for rule in &rule_set.rules {
        eval_rule(rule, facts, options, &mut state, &mut patterns)?;
    }

    tracing::info!(
        rules = rule_set.len(),
        fired = state.trace.len(),
        warnings = state.warnings.len(),
        blocks = state.blocks.len(),
        patterns = patterns.len(),
        "evaluation pass complete"
    );
    Ok(state)
}

/// Evaluate a single rule and, if its condition holds, apply its actions.
fn eval_rule<F: FactSource + ?Sized>(
    rule: &Rule,
    facts: &F,
    options: &EvalOptions,
    state: &mut DecisionState,
    patterns: &mut PatternCache,
) -> Result<(), EvalError> {
    let mut collector = ProvenanceCollector::new();
    let fired = {
        let scope = Scope {
            rule_id: &rule.rule_id,
            facts,
            state: &*state,
            options,
        };
        eval_expr(&rule.when, &scope, patterns, &mut collector)?
    };

    if !fired {
        tracing::trace!(rule_id = %rule.rule_id, "rule skipped");
        return Ok(());
    }

    tracing::debug!(
        rule_id = %rule.rule_id,
        severity = %rule.severity,
        actions = rule.then.len(),
        "rule fired"
    );
    for action in &rule.then {
        state.apply(&rule.rule_id, action);
    }
    let kinds = rule.then.iter().map(Action::kind).collect();
    state
        .trace
        .push(collector.into_firing(rule.rule_id.clone(), rule.severity, kinds));
    Ok(())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

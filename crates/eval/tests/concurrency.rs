//! Independent passes share nothing: one rule set can be evaluated on many
//! threads at once, and each thread gets exactly the result a sequential
//! pass would.

use std::collections::BTreeMap;
use std::thread;

use clausal_core::{load_rule_set, ClauseStatus, RuleSet};
use clausal_eval::{evaluate, evaluate_with, EvalOptions, FactEnv};
use serde_json::json;

fn rule_set() -> RuleSet {
    load_rule_set(&json!([
        {
            "rule_id": "r_minor",
            "severity": "block",
            "when": { "var": "age", "op": "lt", "value": 18 },
            "then": [{ "action": "block", "message": "must be adult" }]
        },
        {
            "rule_id": "r_casual",
            "severity": "info",
            "when": { "var": "employment_type", "op": "eq", "value": "casual" },
            "then": [
                { "action": "set_clause_status", "clause_id": "c_probation", "status": "excluded" },
                { "action": "set_variable", "variable_key": "loading", "value": 25 }
            ]
        },
        {
            "rule_id": "r_loading",
            "severity": "warning",
            "when": { "var": "loading", "op": "gte", "value": 25 },
            "then": [{ "action": "warn", "message": "casual loading applies" }]
        }
    ]))
    .unwrap()
}

fn draft(i: usize) -> FactEnv {
    let employment = if i % 2 == 0 { "casual" } else { "full_time" };
    FactEnv::new()
        .with_variable("age", json!(15 + (i % 10)))
        .with_variable("employment_type", json!(employment))
}

#[test]
fn parallel_passes_match_sequential_passes() {
    let rules = rule_set();
    let drafts: Vec<FactEnv> = (0..64).map(draft).collect();

    let sequential: Vec<_> = drafts
        .iter()
        .map(|facts| evaluate(&rules, facts).unwrap())
        .collect();

    let parallel: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = drafts
            .iter()
            .map(|facts| {
                let rules = &rules;
                s.spawn(move || evaluate(rules, facts).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn inputs_are_not_mutated() {
    let rules = rule_set();
    let before = rules.clone();
    let facts = draft(0);
    let facts_before = facts.clone();

    let state = evaluate_with(&rules, &facts, &EvalOptions::default()).unwrap();

    assert_eq!(rules, before);
    assert_eq!(facts, facts_before);
    assert_eq!(state.clauses["c_probation"], ClauseStatus::Excluded);
    assert!(!facts.variables.contains_key("loading"));
}

#[test]
fn each_pass_starts_fresh() {
    let rules = rule_set();
    let casual = draft(0);
    let full_time = draft(1);

    let first = evaluate(&rules, &casual).unwrap();
    let second = evaluate(&rules, &full_time).unwrap();

    assert_eq!(first.warnings.len(), 1);
    assert!(second.warnings.is_empty());
    assert!(second.clauses.is_empty());
    assert_eq!(second.variables, BTreeMap::new());
}

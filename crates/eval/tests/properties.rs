//! Property tests for evaluation.

use clausal_core::RuleSet;
use clausal_eval::{evaluate, DecisionState};
use proptest::prelude::*;
use serde_json::{json, Value};

const VARS: [&str; 3] = ["a", "b", "c"];

fn arb_fact_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (-5i64..5).prop_map(|n| json!(n)),
        prop_oneof![Just(""), Just("x"), Just("yz")].prop_map(|s| json!(s)),
        prop::collection::vec((-2i64..2).prop_map(|n| json!(n)), 0..3).prop_map(Value::Array),
    ]
}

fn arb_facts() -> impl Strategy<Value = Value> {
    prop::collection::vec(prop::option::of(arb_fact_value()), 3).prop_map(|values| {
        let mut obj = serde_json::Map::new();
        for (key, value) in VARS.iter().zip(values) {
            if let Some(value) = value {
                obj.insert(key.to_string(), value);
            }
        }
        Value::Object(obj)
    })
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    let var = prop::sample::select(VARS.to_vec());
    let op = prop::sample::select(vec![
        "eq", "ne", "gt", "gte", "lt", "lte", "contains", "starts_with", "exists", "empty",
    ]);
    (var, op, arb_fact_value()).prop_map(|(var, op, value)| match op {
        "exists" | "empty" => json!({ "var": var, "op": op }),
        _ => json!({ "var": var, "op": op, "value": value }),
    })
}

fn arb_expression() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3).prop_map(|xs| json!({ "all": xs })),
            prop::collection::vec(inner.clone(), 1..3).prop_map(|xs| json!({ "any": xs })),
            inner.prop_map(|x| json!({ "not": x })),
        ]
    })
}

fn single_rule(when: &Value) -> RuleSet {
    RuleSet::from_json(&json!([{
        "rule_id": "r",
        "severity": "info",
        "when": when,
        "then": [{ "action": "add_question", "question_key": "q" }]
    }]))
    .unwrap()
}

fn fired(state: &DecisionState) -> bool {
    !state.trace.is_empty()
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(when in arb_expression(), facts in arb_facts()) {
        let rules = single_rule(&when);
        let first = evaluate(&rules, &facts).unwrap();
        let second = evaluate(&rules, &facts).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn not_inverts(when in arb_expression(), facts in arb_facts()) {
        let plain = evaluate(&single_rule(&when), &facts).unwrap();
        let negated = evaluate(&single_rule(&json!({ "not": when })), &facts).unwrap();
        prop_assert_ne!(fired(&plain), fired(&negated));
    }

    #[test]
    fn absent_variables_only_satisfy_empty(leaf in arb_leaf()) {
        let state = evaluate(&single_rule(&leaf), &json!({})).unwrap();
        prop_assert_eq!(fired(&state), leaf["op"] == "empty");
    }
}

//! The decision state: everything one evaluation pass decided.

use std::collections::BTreeMap;

use clausal_core::{Action, ClauseStatus};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Blocked;
use crate::provenance::RuleFiring;

/// A `warn` action's output. Never halts evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub rule_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

/// A `block` action's output. Any of these forbids document assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockError {
    pub rule_id: String,
    pub message: String,
}

/// Output accumulator of one pass.
///
/// Keyed decisions (`clauses`, `variants`, `variables`) are last-write-wins
/// in rule order. Only keys some fired rule wrote are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecisionState {
    pub clauses: BTreeMap<String, ClauseStatus>,
    pub variants: BTreeMap<String, String>,
    pub variables: BTreeMap<String, Value>,
    pub warnings: Vec<Warning>,
    pub blocks: Vec<BlockError>,
    pub questions: Vec<String>,
    pub trace: Vec<RuleFiring>,
}

impl DecisionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action of a fired rule.
    pub fn apply(&mut self, rule_id: &str, action: &Action) {
        match action {
            Action::Warn { message, context } => self.warnings.push(Warning {
                rule_id: rule_id.to_string(),
                message: message.clone(),
                context: context.clone(),
            }),
            Action::Block { message } => self.blocks.push(BlockError {
                rule_id: rule_id.to_string(),
                message: message.clone(),
            }),
            Action::SetClauseStatus { clause_id, status } => {
                self.clauses.insert(clause_id.clone(), *status);
            }
            Action::SetVariant {
                clause_id,
                variant_id,
            } => {
                self.variants.insert(clause_id.clone(), variant_id.clone());
            }
            Action::AddQuestion { question_key } => {
                if !self.questions.contains(question_key) {
                    self.questions.push(question_key.clone());
                }
            }
            Action::SetVariable {
                variable_key,
                value,
            } => {
                self.variables.insert(variable_key.clone(), value.clone());
            }
        }
    }

    pub fn is_blocked(&self) -> bool {
        !self.blocks.is_empty()
    }

    /// Gate for document assembly: fails when any block error was raised.
    pub fn ensure_generatable(&self) -> Result<(), Blocked> {
        if self.is_blocked() {
            return Err(Blocked {
                messages: self.blocks.iter().map(|b| b.message.clone()).collect(),
            });
        }
        Ok(())
    }

    /// JSON form, as written by the CLI and compared by conformance tests.
    pub fn to_json(&self) -> Value {
        let clauses: Map<String, Value> = self
            .clauses
            .iter()
            .map(|(id, status)| (id.clone(), Value::String(status.as_str().to_string())))
            .collect();
        let variants: Map<String, Value> = self
            .variants
            .iter()
            .map(|(id, v)| (id.clone(), Value::String(v.clone())))
            .collect();
        let variables: Map<String, Value> = self
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let warnings: Vec<Value> = self
            .warnings
            .iter()
            .map(|w| {
                let mut obj = Map::new();
                obj.insert("rule_id".to_string(), Value::String(w.rule_id.clone()));
                obj.insert("message".to_string(), Value::String(w.message.clone()));
                if let Some(ctx) = &w.context {
                    obj.insert("context".to_string(), Value::Object(ctx.clone()));
                }
                Value::Object(obj)
            })
            .collect();
        let blocks: Vec<Value> = self
            .blocks
            .iter()
            .map(|b| serde_json::json!({ "rule_id": b.rule_id, "message": b.message }))
            .collect();
        let trace: Vec<Value> = self
            .trace
            .iter()
            .map(|f| {
                serde_json::json!({
                    "rule_id": f.rule_id,
                    "severity": f.severity.as_str(),
                    "variables_used": f.variables_used,
                    "actions_applied": f
                        .actions_applied
                        .iter()
                        .map(|k| k.as_str())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        serde_json::json!({
            "clauses": clauses,
            "variants": variants,
            "variables": variables,
            "warnings": warnings,
            "blocks": blocks,
            "questions": self.questions,
            "trace": trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyed_decisions_are_last_write_wins() {
        let mut state = DecisionState::new();
        state.apply(
            "r1",
            &Action::SetClauseStatus {
                clause_id: "c_probation".to_string(),
                status: ClauseStatus::Included,
            },
        );
        state.apply(
            "r2",
            &Action::SetClauseStatus {
                clause_id: "c_probation".to_string(),
                status: ClauseStatus::Excluded,
            },
        );
        assert_eq!(state.clauses["c_probation"], ClauseStatus::Excluded);
        assert_eq!(state.clauses.len(), 1);
    }

    #[test]
    fn questions_are_deduplicated() {
        let mut state = DecisionState::new();
        for key in ["q_overtime", "q_notice", "q_overtime"] {
            state.apply(
                "r1",
                &Action::AddQuestion {
                    question_key: key.to_string(),
                },
            );
        }
        assert_eq!(state.questions, vec!["q_overtime", "q_notice"]);
    }

    #[test]
    fn blocks_gate_generation() {
        let mut state = DecisionState::new();
        assert!(state.ensure_generatable().is_ok());
        state.apply(
            "r_warn",
            &Action::Warn {
                message: "check award".to_string(),
                context: None,
            },
        );
        assert!(!state.is_blocked());
        state.apply(
            "r_age",
            &Action::Block {
                message: "must be adult".to_string(),
            },
        );
        assert!(state.is_blocked());
        assert_eq!(
            state.ensure_generatable().unwrap_err().messages,
            vec!["must be adult"]
        );
    }

    #[test]
    fn json_form() {
        let mut state = DecisionState::new();
        state.apply(
            "r_probation",
            &Action::SetClauseStatus {
                clause_id: "c_probation".to_string(),
                status: ClauseStatus::Excluded,
            },
        );
        state.apply(
            "r_notice",
            &Action::Warn {
                message: "short notice".to_string(),
                context: None,
            },
        );
        let v = state.to_json();
        assert_eq!(v["clauses"], json!({ "c_probation": "excluded" }));
        assert_eq!(
            v["warnings"],
            json!([{ "rule_id": "r_notice", "message": "short notice" }])
        );
        assert_eq!(v["blocks"], json!([]));
        assert_eq!(v, serde_json::to_value(&state).unwrap());
    }
}

//! Provenance of rule firings.
//!
//! Every rule that fires leaves a [`RuleFiring`] in the decision state's
//! trace, recording which variables its condition read and which actions
//! it applied.

use clausal_core::{ActionKind, Severity};
use serde::Serialize;

/// Provenance record for a single fired rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFiring {
    pub rule_id: String,
    /// Advisory severity copied from the rule.
    pub severity: Severity,
    /// Variable keys read while evaluating `when`, in first-read order.
    pub variables_used: Vec<String>,
    /// Kinds of the actions applied, in `then` order.
    pub actions_applied: Vec<ActionKind>,
}

/// Collector that tracks variable reads during condition evaluation.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceCollector {
    pub variables_used: Vec<String>,
}

impl ProvenanceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a variable read. Repeated reads are kept once.
    pub fn record_variable(&mut self, key: &str) {
        if !self.variables_used.iter().any(|k| k == key) {
            self.variables_used.push(key.to_string());
        }
    }

    /// Finalize into a RuleFiring.
    pub fn into_firing(
        self,
        rule_id: String,
        severity: Severity,
        actions_applied: Vec<ActionKind>,
    ) -> RuleFiring {
        RuleFiring {
            rule_id,
            severity,
            variables_used: self.variables_used,
            actions_applied,
        }
    }
}

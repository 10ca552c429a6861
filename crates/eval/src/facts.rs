//! Fact sources: where a pass reads questionnaire answers and variables.
//!
//! A [`FactSource`] is synchronous and read-only. The evaluator never
//! writes through it; variables derived during a pass live in the pass's
//! own decision state.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use clausal_core::ClauseStatus;
use serde_json::{Map, Value};

use crate::error::FactsError;

// ──────────────────────────────────────────────
// Trait
// ──────────────────────────────────────────────

/// Read-only lookup of fact values by variable key.
pub trait FactSource {
    /// Value of `key`, or `None` when the variable is absent.
    fn resolve(&self, key: &str) -> Option<Value>;

    /// Baseline status of a clause before any rule runs.
    fn clause_status(&self, _clause_id: &str) -> Option<ClauseStatus> {
        None
    }

    /// Baseline selected variant of a clause before any rule runs.
    fn variant(&self, _clause_id: &str) -> Option<String> {
        None
    }
}

impl<T: FactSource + ?Sized> FactSource for &T {
    fn resolve(&self, key: &str) -> Option<Value> {
        (**self).resolve(key)
    }

    fn clause_status(&self, clause_id: &str) -> Option<ClauseStatus> {
        (**self).clause_status(clause_id)
    }

    fn variant(&self, clause_id: &str) -> Option<String> {
        (**self).variant(clause_id)
    }
}

impl FactSource for BTreeMap<String, Value> {
    fn resolve(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl<S: BuildHasher> FactSource for HashMap<String, Value, S> {
    fn resolve(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl FactSource for Map<String, Value> {
    fn resolve(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// A JSON object of variables. Non-object values resolve nothing.
impl FactSource for Value {
    fn resolve(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|obj| obj.get(key)).cloned()
    }
}

/// Adapts a lookup closure, e.g. one backed by an answer store.
pub struct FnSource<F>(pub F);

impl<F> FactSource for FnSource<F>
where
    F: Fn(&str) -> Option<Value>,
{
    fn resolve(&self, key: &str) -> Option<Value> {
        (self.0)(key)
    }
}

// ──────────────────────────────────────────────
// FactEnv
// ──────────────────────────────────────────────

/// An owned fact environment: variables plus the baseline clause and
/// variant decisions a pass starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactEnv {
    pub variables: BTreeMap<String, Value>,
    pub clauses: BTreeMap<String, ClauseStatus>,
    pub variants: BTreeMap<String, String>,
}

impl FactEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }

    pub fn with_clause_status(
        mut self,
        clause_id: impl Into<String>,
        status: ClauseStatus,
    ) -> Self {
        self.clauses.insert(clause_id.into(), status);
        self
    }

    pub fn with_variant(
        mut self,
        clause_id: impl Into<String>,
        variant_id: impl Into<String>,
    ) -> Self {
        self.variants.insert(clause_id.into(), variant_id.into());
        self
    }

    /// Read facts from JSON.
    ///
    /// Two shapes are accepted. A plain object is taken as variables only.
    /// An object whose `variables` member is itself an object is the
    /// structured form, with optional `clauses` (clause id to status) and
    /// `variants` (clause id to variant id) sections.
    pub fn from_json(v: &Value) -> Result<FactEnv, FactsError> {
        let obj = v.as_object().ok_or(FactsError::NotAnObject)?;

        let Some(Value::Object(variables)) = obj.get("variables") else {
            return Ok(FactEnv {
                variables: obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                ..FactEnv::default()
            });
        };

        let mut env = FactEnv {
            variables: variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..FactEnv::default()
        };

        for (clause_id, status) in section(obj, "clauses")? {
            let status = status
                .as_str()
                .and_then(|s| s.parse::<ClauseStatus>().ok())
                .ok_or_else(|| FactsError::InvalidClauseStatus {
                    clause_id: clause_id.clone(),
                    status: status.to_string(),
                })?;
            env.clauses.insert(clause_id.clone(), status);
        }

        for (clause_id, variant) in section(obj, "variants")? {
            let variant = variant
                .as_str()
                .ok_or_else(|| FactsError::InvalidVariant {
                    clause_id: clause_id.clone(),
                })?;
            env.variants.insert(clause_id.clone(), variant.to_string());
        }

        Ok(env)
    }
}

fn section<'a>(
    obj: &'a Map<String, Value>,
    name: &str,
) -> Result<Vec<(&'a String, &'a Value)>, FactsError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(entries)) => Ok(entries.iter().collect()),
        Some(_) => Err(FactsError::InvalidSection {
            section: name.to_string(),
        }),
    }
}

impl FactSource for FactEnv {
    fn resolve(&self, key: &str) -> Option<Value> {
        self.variables.get(key).cloned()
    }

    fn clause_status(&self, clause_id: &str) -> Option<ClauseStatus> {
        self.clauses.get(clause_id).copied()
    }

    fn variant(&self, clause_id: &str) -> Option<String> {
        self.variants.get(clause_id).cloned()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

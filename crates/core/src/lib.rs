//! clausal-core: the clause rule language.
//!
//! A rule document is a sequence of rules, each pairing a boolean
//! condition tree (`when`) with a list of actions (`then`) that decide
//! clause inclusion, variant selection, derived variables, warnings and
//! blocking errors for a contract draft.
//!
//! # Public API
//!
//! - [`validate_rules()`] / [`validate_document()`] -- accumulate every
//!   structural error in an untrusted JSON payload
//! - [`RuleSet::from_json()`] -- strict decoding into the typed model
//! - [`load_rule_set()`] -- validate, then decode (the gate every rule
//!   set passes before it is stored or evaluated)
//! - [`RuleSet::fingerprint()`] -- content hash identifying a template version
//! - Model types: [`Expression`], [`Comparison`], [`Operand`],
//!   [`Operator`], [`Action`], [`ClauseStatus`], [`Severity`], [`Rule`],
//!   [`RuleSet`]

pub mod ast;
pub mod decode;
pub mod error;
pub mod fingerprint;
pub mod validate;

pub use ast::{
    Action, ActionKind, ClauseStatus, Comparison, Expression, Operand, Operator, Rule, RuleSet,
    Severity,
};
pub use decode::{load_rule_set, DecodeError, LoadError};
pub use error::ValidationError;
pub use validate::{
    validate_action, validate_document, validate_expression, validate_rule, validate_rules,
};

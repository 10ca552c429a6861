use serde::{Deserialize, Serialize};

/// Knobs for one evaluation pass.
///
/// Deserializable so it can sit directly under `[eval]` in a config file;
/// every field defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Fail the pass when a `{"var": ...}` operand does not resolve,
    /// instead of treating the comparison as false.
    pub strict_references: bool,
}

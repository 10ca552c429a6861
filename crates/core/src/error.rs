use std::fmt;

use serde::{Deserialize, Serialize};

/// A structural problem in a rule document.
///
/// `path` locates the offending node from the document root `$`
/// (e.g. `$[2].when.all[1].op`); `message` is meant for template authors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Re-roots a rule-relative path (`$.when...`) under `prefix`
    /// (`$[3]` gives `$[3].when...`).
    pub fn rebased(self, prefix: &str) -> Self {
        let rest = self.path.strip_prefix('$').unwrap_or(&self.path);
        ValidationError {
            path: format!("{}{}", prefix, rest),
            message: self.message,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

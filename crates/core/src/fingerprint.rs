//! Content fingerprint of a rule set.
//!
//! The fingerprint identifies one template version: it is the SHA-256 of
//! the compact JSON form produced by [`RuleSet::to_json`], so formatting and
//! member order in the source file do not affect it.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::ast::RuleSet;

impl RuleSet {
    /// Lowercase hex SHA-256 of the canonical JSON form.
    pub fn fingerprint(&self) -> String {
        let mut canonical = String::new();
        write_canonical(&self.to_json(), &mut canonical);
        let digest = Sha256::digest(canonical.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Compact JSON with object members sorted by key, independent of
/// serde_json's map ordering features.
fn write_canonical(v: &Value, out: &mut String) {
    match v {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&obj[key], out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::ast::RuleSet;

    #[test]
    fn fingerprint_ignores_source_formatting() {
        let a = RuleSet::from_json(&serde_json::from_str::<serde_json::Value>(
            r#"[{"rule_id":"r1","severity":"info","when":{"var":"x","op":"exists"},"then":[{"action":"block","message":"m"}]}]"#,
        ).unwrap())
        .unwrap();
        let b = RuleSet::from_json(&json!({ "rules": [{
            "then": [{ "message": "m", "action": "block" }],
            "when": { "op": "exists", "var": "x" },
            "severity": "info",
            "rule_id": "r1"
        }] }))
        .unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let a = RuleSet::from_json(&json!([{
            "rule_id": "r1", "severity": "info",
            "when": { "var": "x", "op": "exists" },
            "then": [{ "action": "block", "message": "m" }]
        }]))
        .unwrap();
        let mut b = a.clone();
        b.rules[0].rule_id = "r2".to_string();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}

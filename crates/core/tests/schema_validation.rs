//! Checks the published JSON Schema at schema/rule-schema.json against the
//! conformance fixtures: every document the validator accepts must satisfy
//! the schema, and every rejected document must violate it.

use std::path::{Path, PathBuf};

fn read_json(path: &Path) -> serde_json::Value {
    let src = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&src).unwrap()
}

fn fixture_documents(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().is_some_and(|e| e == "json")
                && !p.to_string_lossy().contains("expected-errors")
        })
        .collect();
    paths.sort();
    paths
}

fn load_validator() -> jsonschema::Validator {
    let schema_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/rule-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

#[test]
fn accepted_documents_satisfy_schema() {
    let validator = load_validator();
    let conformance_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../conformance");

    let mut tested = 0usize;
    let mut failures = Vec::new();

    let mut paths = fixture_documents(&conformance_root.join("valid"));
    let eval_root = conformance_root.join("eval");
    let mut cases: Vec<_> = std::fs::read_dir(&eval_root)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path().join("rules.json"))
        .collect();
    cases.sort();
    paths.extend(cases);

    for path in paths {
        let instance = read_json(&path);
        if let Err(error) = validator.validate(&instance) {
            failures.push(format!("{}: {}", path.display(), error));
        }
        tested += 1;
    }

    assert!(tested > 0, "no fixtures found");
    assert!(
        failures.is_empty(),
        "{} of {} documents failed schema validation:\n{}",
        failures.len(),
        tested,
        failures.join("\n")
    );
}

#[test]
fn rejected_documents_violate_schema() {
    let validator = load_validator();
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../conformance/invalid");

    for path in fixture_documents(&dir) {
        let instance = read_json(&path);
        assert!(
            !validator.is_valid(&instance),
            "{} passed the schema but is rejected by the validator",
            path.display()
        );
    }
}

//! Structural diff between two version snapshots.
//!
//! Both snapshot shapes reduce to a keyed entry map before comparison:
//! collection payloads key field descriptors by field name, module payloads
//! use their top-level config keys. A payload that fails to parse as the
//! expected shape degrades to an empty entry set rather than failing the
//! whole comparison (lossy by contract, see DESIGN.md).

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::version::ResourceKind;

// ---------------------------------------------------------------------------
// Diff output types
// ---------------------------------------------------------------------------

/// One entry in a snapshot diff.
///
/// `old_value` is the entry from snapshot A, `new_value` from snapshot B;
/// whichever side lacks the key is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Structured delta between two snapshots, grouped by classification.
///
/// Entries present in both snapshots with identical values are omitted.
/// Each group is sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotDiff {
    pub added: Vec<DiffEntry>,
    pub removed: Vec<DiffEntry>,
    pub modified: Vec<DiffEntry>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Entry extraction
// ---------------------------------------------------------------------------

/// Reduce a snapshot payload to a name -> entry map for the given kind.
///
/// Collections: field descriptors keyed by their `name`, read from either
/// `{"fields": [...]}` or a bare array. Descriptors without a name are
/// skipped. Modules: the payload's top-level object keys.
///
/// Anything that does not match the expected shape yields an empty map.
pub fn entry_map(kind: ResourceKind, payload: &Value) -> BTreeMap<String, Value> {
    match kind {
        ResourceKind::Collection => {
            let fields = match payload {
                Value::Array(items) => items.as_slice(),
                Value::Object(obj) => match obj.get("fields").and_then(Value::as_array) {
                    Some(items) => items.as_slice(),
                    None => &[],
                },
                _ => &[],
            };
            fields
                .iter()
                .filter_map(|field| {
                    let name = field.get("name").and_then(Value::as_str)?;
                    Some((name.to_string(), field.clone()))
                })
                .collect()
        }
        ResourceKind::Module => match payload {
            Value::Object(obj) => obj
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => BTreeMap::new(),
        },
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Compare two snapshot payloads of the same resource kind.
///
/// Classification:
/// - `added`: key exists in `b` but not `a`
/// - `removed`: key exists in `a` but not `b`
/// - `modified`: key exists in both with structurally different values
///
/// Pure function: no side effects, no persistence.
pub fn compare_snapshots(kind: ResourceKind, a: &Value, b: &Value) -> SnapshotDiff {
    let entries_a = entry_map(kind, a);
    let entries_b = entry_map(kind, b);

    let mut diff = SnapshotDiff::default();

    for (key, old_value) in &entries_a {
        match entries_b.get(key) {
            Some(new_value) if new_value == old_value => {}
            Some(new_value) => diff.modified.push(DiffEntry {
                key: key.clone(),
                old_value: Some(old_value.clone()),
                new_value: Some(new_value.clone()),
            }),
            None => diff.removed.push(DiffEntry {
                key: key.clone(),
                old_value: Some(old_value.clone()),
                new_value: None,
            }),
        }
    }

    for (key, new_value) in &entries_b {
        if !entries_a.contains_key(key) {
            diff.added.push(DiffEntry {
                key: key.clone(),
                old_value: None,
                new_value: Some(new_value.clone()),
            });
        }
    }

    // BTreeMap iteration already yields key order; the groups inherit it.
    diff
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(entries: &[DiffEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn field_schemas_diff_by_field_name() {
        let a = json!({ "fields": [
            {"name": "name", "type": "string"},
            {"name": "age", "type": "number"}
        ]});
        let b = json!({ "fields": [
            {"name": "name", "type": "string"},
            {"name": "email", "type": "string"}
        ]});

        let diff = compare_snapshots(ResourceKind::Collection, &a, &b);
        assert_eq!(keys(&diff.added), vec!["email"]);
        assert_eq!(keys(&diff.removed), vec!["age"]);
        assert!(diff.modified.is_empty());
    }

    #[test]
    fn module_configs_diff_by_top_level_key() {
        let a = json!({ "retries": 3, "endpoint": "https://a.example" });
        let b = json!({ "retries": 5, "endpoint": "https://a.example", "timeout": 30 });

        let diff = compare_snapshots(ResourceKind::Module, &a, &b);
        assert_eq!(keys(&diff.added), vec!["timeout"]);
        assert!(diff.removed.is_empty());
        assert_eq!(keys(&diff.modified), vec!["retries"]);
        assert_eq!(diff.modified[0].old_value, Some(json!(3)));
        assert_eq!(diff.modified[0].new_value, Some(json!(5)));
    }

    #[test]
    fn identical_snapshots_yield_empty_diff() {
        let payload = json!({ "a": 1, "b": {"nested": true} });
        let diff = compare_snapshots(ResourceKind::Module, &payload, &payload);
        assert!(diff.is_empty());
    }

    #[test]
    fn diff_is_antisymmetric_for_added_and_removed() {
        let a = json!({ "x": 1, "shared": "v" });
        let b = json!({ "y": 2, "shared": "v" });

        let forward = compare_snapshots(ResourceKind::Module, &a, &b);
        let backward = compare_snapshots(ResourceKind::Module, &b, &a);

        assert_eq!(keys(&forward.added), keys(&backward.removed));
        assert_eq!(keys(&forward.removed), keys(&backward.added));
    }

    #[test]
    fn value_equality_is_structural() {
        let a = json!({ "cfg": {"a": 1, "b": 2} });
        // Same object, different key insertion order: still equal.
        let b = json!({ "cfg": {"b": 2, "a": 1} });
        let diff = compare_snapshots(ResourceKind::Module, &a, &b);
        assert!(diff.is_empty());
    }

    #[test]
    fn malformed_payload_degrades_to_empty_entry_set() {
        let good = json!({ "key": 1 });
        let bad = json!("not an object");

        let diff = compare_snapshots(ResourceKind::Module, &bad, &good);
        assert_eq!(keys(&diff.added), vec!["key"]);
        assert!(diff.removed.is_empty());

        let diff = compare_snapshots(ResourceKind::Module, &good, &bad);
        assert_eq!(keys(&diff.removed), vec!["key"]);
    }

    #[test]
    fn collection_payload_accepts_bare_field_array() {
        let a = json!([{"name": "title", "type": "string"}]);
        let b = json!({ "fields": [{"name": "title", "type": "string"}] });
        let diff = compare_snapshots(ResourceKind::Collection, &a, &b);
        assert!(diff.is_empty());
    }

    #[test]
    fn collection_fields_without_name_are_skipped() {
        let a = json!({ "fields": [] });
        let b = json!({ "fields": [{"type": "string"}] });
        let diff = compare_snapshots(ResourceKind::Collection, &a, &b);
        assert!(diff.is_empty());
    }

    #[test]
    fn modified_field_descriptor_is_reported_once() {
        let a = json!({ "fields": [{"name": "age", "type": "number", "required": false}] });
        let b = json!({ "fields": [{"name": "age", "type": "number", "required": true}] });
        let diff = compare_snapshots(ResourceKind::Collection, &a, &b);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(keys(&diff.modified), vec!["age"]);
    }

    #[test]
    fn output_groups_are_sorted_by_key() {
        let a = json!({});
        let b = json!({ "zeta": 1, "alpha": 2, "mid": 3 });
        let diff = compare_snapshots(ResourceKind::Module, &a, &b);
        assert_eq!(keys(&diff.added), vec!["alpha", "mid", "zeta"]);
    }
}

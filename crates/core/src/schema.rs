//! Collection field definitions and document validation.
//!
//! A collection's live definition is a list of field descriptors. Documents
//! written into a collection are validated against it: required fields,
//! primitive type checks, and (in the repository layer, since it needs a
//! query) per-field uniqueness.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Field definitions
// ---------------------------------------------------------------------------

/// A single field descriptor in a collection schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
}

impl FieldDefinition {
    /// Name shown in validation messages (display name when set).
    fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// Parse field definitions out of a collection's `fields` payload.
///
/// Accepts `{"fields": [...]}` or a bare array. A payload that does not
/// parse yields an empty list, which skips validation entirely (matching
/// the platform's lossy handling of malformed stored schemas).
pub fn parse_field_definitions(payload: &Value) -> Vec<FieldDefinition> {
    let items = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match obj.get("fields").and_then(Value::as_array) {
            Some(items) => items.as_slice(),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// Document validation
// ---------------------------------------------------------------------------

/// Check whether a value counts as "absent" for required-field purposes.
fn is_blank(value: &Value) -> bool {
    matches!(value, Value::Null) || value.as_str() == Some("")
}

/// Validate a document body against a collection's field definitions.
///
/// Checks `required` and primitive type constraints. Uniqueness needs a
/// database query and is enforced by the document repository.
pub fn validate_document(
    fields: &[FieldDefinition],
    data: &Map<String, Value>,
) -> Result<(), CoreError> {
    for field in fields {
        let value = data.get(&field.name);

        if field.required && value.map_or(true, is_blank) {
            return Err(CoreError::Validation(format!(
                "{}: must not be empty",
                field.label()
            )));
        }

        let Some(value) = value else { continue };
        if value.is_null() {
            continue;
        }

        let ok = match field.field_type.as_str() {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            // Unknown or unset types are not validated.
            _ => true,
        };

        if !ok {
            return Err(CoreError::Validation(format!(
                "{}: expected {} value",
                field.label(),
                field.field_type
            )));
        }
    }

    Ok(())
}

/// Fields whose uniqueness must be checked against existing documents.
///
/// Returns `(field_name, value)` pairs for unique fields that carry a
/// non-blank value in the document.
pub fn unique_field_values<'a>(
    fields: &'a [FieldDefinition],
    data: &'a Map<String, Value>,
) -> Vec<(&'a str, &'a Value)> {
    fields
        .iter()
        .filter(|f| f.unique)
        .filter_map(|f| {
            let value = data.get(&f.name)?;
            if is_blank(value) {
                None
            } else {
                Some((f.name.as_str(), value))
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Vec<FieldDefinition> {
        parse_field_definitions(&json!({ "fields": [
            {"name": "title", "display_name": "Title", "type": "string", "required": true},
            {"name": "count", "type": "number"},
            {"name": "active", "type": "boolean"},
            {"name": "tags", "type": "array"},
            {"name": "meta", "type": "object"},
            {"name": "slug", "type": "string", "unique": true}
        ]}))
    }

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn parses_wrapped_and_bare_field_lists() {
        assert_eq!(fields().len(), 6);
        let bare = parse_field_definitions(&json!([{"name": "a"}]));
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn malformed_schema_payload_yields_no_fields() {
        assert!(parse_field_definitions(&json!("oops")).is_empty());
        assert!(parse_field_definitions(&json!({ "other": 1 })).is_empty());
        assert!(parse_field_definitions(&json!(null)).is_empty());
    }

    #[test]
    fn valid_document_passes() {
        let data = doc(json!({
            "title": "hello", "count": 3, "active": true,
            "tags": ["a"], "meta": {"k": "v"}, "slug": "hello"
        }));
        assert!(validate_document(&fields(), &data).is_ok());
    }

    #[test]
    fn missing_required_field_rejects() {
        let data = doc(json!({ "count": 3 }));
        let err = validate_document(&fields(), &data).unwrap_err();
        assert!(err.to_string().contains("Title"));
    }

    #[test]
    fn empty_string_counts_as_missing_for_required() {
        let data = doc(json!({ "title": "" }));
        assert!(validate_document(&fields(), &data).is_err());
    }

    #[test]
    fn null_counts_as_missing_for_required() {
        let data = doc(json!({ "title": null }));
        assert!(validate_document(&fields(), &data).is_err());
    }

    #[test]
    fn type_mismatches_reject() {
        let base = json!({ "title": "t" });
        for (field, bad) in [
            ("count", json!("three")),
            ("active", json!(1)),
            ("tags", json!({"not": "array"})),
            ("meta", json!([1, 2])),
            ("slug", json!(9)),
        ] {
            let mut data = doc(base.clone());
            data.insert(field.to_string(), bad);
            assert!(
                validate_document(&fields(), &data).is_err(),
                "expected {field} to reject"
            );
        }
    }

    #[test]
    fn optional_fields_may_be_absent_or_null() {
        let data = doc(json!({ "title": "t", "count": null }));
        assert!(validate_document(&fields(), &data).is_ok());
    }

    #[test]
    fn unknown_field_type_is_not_validated() {
        let defs = parse_field_definitions(&json!([{"name": "x", "type": "geo"}]));
        let data = doc(json!({ "x": [1.0, 2.0] }));
        assert!(validate_document(&defs, &data).is_ok());
    }

    #[test]
    fn unique_field_values_picks_non_blank_unique_fields() {
        let data = doc(json!({ "title": "t", "slug": "abc" }));
        let fields = fields();
        let unique = unique_field_values(&fields, &data);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].0, "slug");
    }

    #[test]
    fn unique_field_values_skips_blank() {
        let data = doc(json!({ "title": "t", "slug": "" }));
        assert!(unique_field_values(&fields(), &data).is_empty());
    }
}

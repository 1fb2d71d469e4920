//! Consolidation of per-chunk results
//!
//! Partials are merged first-wins-if-nonempty: for each field, the first
//! partial (in chunk order) holding a non-empty value supplies it, and later
//! partials never replace it. List fields such as `subUpdates` are taken
//! whole from that first partial, not concatenated across chunks.

use serde_json::{Map, Value};

/// Whether a value counts as empty for consolidation
///
/// Empty means null, `false`, zero, the empty string, the empty list or
/// the empty object. `"n/a"` is not empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Merge partial field mappings, first non-empty value per field wins
///
/// A field whose every value is empty keeps the first value seen, so a
/// field that was present stays present.
pub fn merge_partials(partials: &[Map<String, Value>]) -> Map<String, Value> {
    let mut merged = Map::new();

    for partial in partials {
        for (key, value) in partial {
            match merged.get(key) {
                Some(existing) if !is_empty_value(existing) => {}
                _ => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_first_non_empty_wins() {
        let merged = merge_partials(&[map(json!({"a": null, "b": 5})), map(json!({"a": 3, "b": 7}))]);
        assert_eq!(Value::Object(merged), json!({"a": 3, "b": 5}));
    }

    #[test]
    fn test_lists_are_not_concatenated() {
        let merged = merge_partials(&[
            map(json!({"subUpdates": []})),
            map(json!({"subUpdates": [{"organization": "IFC"}]})),
            map(json!({"subUpdates": [{"organization": "Proparco"}]})),
        ]);
        assert_eq!(merged["subUpdates"], json!([{"organization": "IFC"}]));
    }

    #[test]
    fn test_empty_values_are_overridden() {
        let merged = merge_partials(&[
            map(json!({"title": "", "pvSize": 0, "flag": false, "obj": {}})),
            map(json!({"title": "Kenhardt", "pvSize": 540, "flag": true, "obj": {"k": 1}})),
        ]);
        assert_eq!(
            Value::Object(merged),
            json!({"title": "Kenhardt", "pvSize": 540, "flag": true, "obj": {"k": 1}})
        );
    }

    #[test]
    fn test_not_available_is_kept() {
        let merged = merge_partials(&[
            map(json!({"gridType": "n/a"})),
            map(json!({"gridType": "On-grid"})),
        ]);
        assert_eq!(merged["gridType"], json!("n/a"));
    }

    #[test]
    fn test_all_empty_field_stays_present() {
        let merged = merge_partials(&[map(json!({"organizationFinanced": null})), map(json!({}))]);
        assert_eq!(merged.get("organizationFinanced"), Some(&Value::Null));
    }

    #[test]
    fn test_fields_from_later_partials_are_added() {
        let merged = merge_partials(&[map(json!({"a": 1})), map(json!({"b": 2}))]);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_no_partials() {
        assert!(merge_partials(&[]).is_empty());
    }
}

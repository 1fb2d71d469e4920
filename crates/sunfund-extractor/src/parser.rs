//! Parse model output into a validated record
//!
//! Parsing is all-or-nothing: the text either becomes an [`ExtractedRecord`]
//! that passes deserialization and every cross-field rule, or the call fails
//! with [`ExtractorError::SchemaViolation`].

use crate::error::ExtractorError;
use serde_json::{Map, Value};
use sunfund_domain::ExtractedRecord;
use tracing::debug;

/// Parse a model response into a record
pub fn parse_llm_response(response: &str) -> Result<ExtractedRecord, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::SchemaViolation(format!("JSON parse error: {}", e)))?;

    let object = match json {
        Value::Object(map) => map,
        other => {
            return Err(ExtractorError::SchemaViolation(format!(
                "Expected JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    record_from_map(object)
}

/// Build and validate a record from a field mapping
pub fn record_from_map(map: Map<String, Value>) -> Result<ExtractedRecord, ExtractorError> {
    let record: ExtractedRecord = serde_json::from_value(Value::Object(map))?;
    record.validate().map_err(ExtractorError::SchemaViolation)?;
    debug!(title = %record.title, sub_updates = record.sub_updates.len(), "parsed record");
    Ok(record)
}

/// Convert a record back into its field mapping
pub fn record_to_map(record: &ExtractedRecord) -> Result<Map<String, Value>, ExtractorError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(ExtractorError::SchemaViolation(format!(
            "record serialized as {}",
            json_kind(&other)
        ))),
    }
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::SchemaViolation("Empty code block".to_string()));
        }

        // Drop the opening fence (with any language tag) and the closing fence
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunfund_domain::{Figure, Instrument, ReceiverCategory, SubUpdateRole};

    const PROJECT_JSON: &str = r#"{
        "newsUrl": "https://example.com/kenhardt",
        "title": "Scatec reaches financial close on Kenhardt",
        "newsUpdateType": "Funding Update",
        "receiverCategory": "Project",
        "textOfArticle": "Scatec has reached financial close for the Kenhardt project.",
        "receiverCountry": ["South Africa"],
        "date": "14/02/2023",
        "projectFinanced": {"id": "p-1", "name": "Kenhardt Solar Project"},
        "projectStatus": "Construction",
        "projectStatusDate": "n/a",
        "technologyAndGridSystem": "PV-Storage",
        "typeOfInstallation": "Utility",
        "gridType": "On-grid",
        "pvSize": 540,
        "organizationFinanced": null,
        "totalAmount": 1000000000,
        "subUpdates": [
            {"organization": "Standard Bank", "role": "Financier", "instrument": "Debt",
             "amount": "n/a", "financingStructure": "Senior debt"},
            {"organization": "PowerChina", "role": "EPC Contractor", "instrument": null,
             "amount": null, "financingStructure": null}
        ]
    }"#;

    #[test]
    fn test_parse_valid_record() {
        let record = parse_llm_response(PROJECT_JSON).unwrap();
        assert_eq!(record.receiver_category, ReceiverCategory::Project);
        assert_eq!(record.pv_size, Some(Figure::Value(540.0)));
        assert_eq!(record.sub_updates.len(), 2);
        assert_eq!(record.sub_updates[0].instrument, Some(Instrument::Debt));
        assert_eq!(record.sub_updates[0].amount, Some(Figure::NotAvailable));
        assert_eq!(record.sub_updates[1].role, SubUpdateRole::EpcContractor);
        assert_eq!(record.sub_updates[1].amount, None);
    }

    #[test]
    fn test_parse_record_with_markdown_wrapper() {
        let response = format!("```json\n{}\n```", PROJECT_JSON);
        let record = parse_llm_response(&response).unwrap();
        assert_eq!(record.title, "Scatec reaches financial close on Kenhardt");
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_llm_response("This is not JSON");
        assert!(matches!(result, Err(ExtractorError::SchemaViolation(_))));
    }

    #[test]
    fn test_parse_json_not_object() {
        let result = parse_llm_response("[]");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("an array"), "{}", err);
    }

    #[test]
    fn test_value_outside_enumeration() {
        let response = PROJECT_JSON.replace("\"On-grid\"", "\"Hybrid-grid\"");
        assert!(matches!(
            parse_llm_response(&response),
            Err(ExtractorError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let mut map: Map<String, Value> = serde_json::from_str(PROJECT_JSON).unwrap();
        map.remove("subUpdates");
        assert!(matches!(
            record_from_map(map),
            Err(ExtractorError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let response = PROJECT_JSON.replace("\"pvSize\": 540", "\"pvSize\": \"540 MW\"");
        assert!(parse_llm_response(&response).is_err());
    }

    #[test]
    fn test_cross_field_violation_rejected() {
        let response = PROJECT_JSON.replace(
            "\"organizationFinanced\": null",
            "\"organizationFinanced\": {\"id\": \"o-1\", \"name\": \"Scatec\", \"role\": \"Utility\"}",
        );
        let err = parse_llm_response(&response).unwrap_err().to_string();
        assert!(err.contains("both"), "{}", err);
    }

    #[test]
    fn test_non_financier_with_amount_rejected() {
        let mut map: Map<String, Value> = serde_json::from_str(PROJECT_JSON).unwrap();
        map["subUpdates"][1]["amount"] = Value::from(5_000_000);
        let err = record_from_map(map).unwrap_err().to_string();
        assert!(err.contains("PowerChina"), "{}", err);
    }

    #[test]
    fn test_record_map_round_trip_keeps_null_and_na() {
        let record = parse_llm_response(PROJECT_JSON).unwrap();
        let map = record_to_map(&record).unwrap();
        assert_eq!(map["organizationFinanced"], Value::Null);
        assert_eq!(map["projectStatusDate"], Value::from("n/a"));
        assert_eq!(record_from_map(map).unwrap(), record);
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_unclosed_fence() {
        let response = "```json\n{\"key\": \"value\"}";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }
}

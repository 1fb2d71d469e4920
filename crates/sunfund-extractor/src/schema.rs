//! Machine-readable description of the record the model must produce
//!
//! The description is JSON-Schema shaped and built from the domain
//! vocabularies, so the value sets the prompt advertises are the ones the
//! parser accepts.

use serde_json::{json, Value};
use sunfund_domain::{
    GridType, Instrument, NewsUpdateType, OrganizationRole, ProjectStatus, ReceiverCategory,
    SubUpdateRole, TechnologyAndGridSystem, TypeOfInstallation, NOT_AVAILABLE,
};

/// Top-level fields every record must carry
pub const REQUIRED_FIELDS: &[&str] = &[
    "newsUrl",
    "title",
    "newsUpdateType",
    "receiverCategory",
    "textOfArticle",
    "receiverCountry",
    "date",
    "subUpdates",
];

fn nullable_enum(values: Vec<&'static str>) -> Value {
    let mut allowed: Vec<Value> = values.into_iter().map(Value::from).collect();
    allowed.push(Value::Null);
    json!({ "type": ["string", "null"], "enum": allowed })
}

fn nullable_figure(description: &str) -> Value {
    json!({
        "anyOf": [{ "type": "number", "minimum": 0 }, { "const": NOT_AVAILABLE }, { "type": "null" }],
        "description": description,
    })
}

/// Schema of one sub-update entry
pub fn sub_update_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "organization": { "type": "string", "description": "Name of the party involved" },
            "role": { "type": "string", "enum": SubUpdateRole::spellings() },
            "instrument": nullable_enum(Instrument::spellings()),
            "amount": nullable_figure("Amount provided; financiers only"),
            "financingStructure": { "type": ["string", "null"] },
        },
        "required": ["organization", "role"],
    })
}

/// Schema of the full record
pub fn record_schema() -> Value {
    json!({
        "title": "ExtractedRecord",
        "type": "object",
        "properties": {
            "newsUrl": { "type": "string" },
            "title": { "type": "string", "minLength": 1 },
            "newsUpdateType": { "type": "string", "enum": NewsUpdateType::spellings() },
            "receiverCategory": { "type": "string", "enum": ReceiverCategory::spellings() },
            "textOfArticle": { "type": "string" },
            "receiverCountry": { "type": "array", "items": { "type": "string" } },
            "date": { "type": "string", "description": "dd/mm/yyyy or \"n/a\"" },
            "projectFinanced": {
                "type": ["object", "null"],
                "properties": { "id": { "type": "string" }, "name": { "type": "string" } },
                "required": ["name"],
            },
            "projectStatus": nullable_enum(ProjectStatus::spellings()),
            "projectStatusDate": { "type": ["string", "null"] },
            "technologyAndGridSystem": nullable_enum(TechnologyAndGridSystem::spellings()),
            "typeOfInstallation": nullable_enum(TypeOfInstallation::spellings()),
            "gridType": nullable_enum(GridType::spellings()),
            "pvSize": nullable_figure("Installed capacity; projects only"),
            "organizationFinanced": {
                "type": ["object", "null"],
                "properties": {
                    "id": { "type": "string" },
                    "name": { "type": "string" },
                    "role": { "type": "string", "enum": OrganizationRole::spellings() },
                },
                "required": ["name", "role"],
            },
            "totalAmount": nullable_figure("Total funding received, as a full figure"),
            "subUpdates": { "type": "array", "items": sub_update_schema() },
        },
        "required": REQUIRED_FIELDS,
    })
}

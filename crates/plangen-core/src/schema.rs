//! Response schemas handed to the generation service.
//!
//! Written in the service's OpenAPI-subset dialect (upper-case type names).
//! They constrain what the model emits; replies are not re-validated
//! against them locally.

use serde_json::{Value, json};

/// Procedure fields, in teaching order.
pub const PROCEDURE_FIELDS: [&str; 9] = [
    "activatingPriorKnowledge",
    "lessonPurpose",
    "lessonLanguagePractice",
    "readingKeyIdea",
    "developingUnderstanding",
    "deepeningUnderstanding",
    "makingGeneralizations",
    "evaluatingLearning",
    "additionalActivities",
];

/// Fields every generated day must carry.
pub const DAY_FIELDS: [&str; 9] = [
    "dayNumber",
    "topic",
    "objectives",
    "idfFeatures",
    "skills21st",
    "resources",
    "procedures",
    "remarks",
    "reflection",
];

/// Fields of an extraction reply.
pub const EXTRACTION_FIELDS: [&str; 3] =
    ["contentStandard", "performanceStandard", "learningCompetency"];

fn string_fields(names: &[&str]) -> serde_json::Map<String, Value> {
    names
        .iter()
        .map(|n| (n.to_string(), json!({ "type": "STRING" })))
        .collect()
}

/// Schema for pulling standards out of an exemplar document.
pub fn extraction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": string_fields(&EXTRACTION_FIELDS),
        "required": EXTRACTION_FIELDS,
    })
}

/// Schema for a single day's plan.
pub fn daily_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "dayNumber": { "type": "NUMBER" },
            "topic": { "type": "STRING" },
            "objectives": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Learning objectives for this day"
            },
            "idfFeatures": {
                "type": "STRING",
                "description": "Instructional Design framework (IDF) features applicable for this day"
            },
            "skills21st": {
                "type": "STRING",
                "description": "21st Century Skills targeted"
            },
            "resources": {
                "type": "OBJECT",
                "properties": string_fields(&["references", "otherResources"]),
                "required": ["references", "otherResources"]
            },
            "procedures": {
                "type": "OBJECT",
                "properties": string_fields(&PROCEDURE_FIELDS),
                "required": PROCEDURE_FIELDS
            },
            "remarks": { "type": "STRING" },
            "reflection": { "type": "STRING" }
        },
        "required": DAY_FIELDS,
    })
}

/// Schema for the five-day plan reply.
pub fn generation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "days": {
                "type": "ARRAY",
                "items": daily_plan_schema()
            }
        },
        "required": ["days"],
    })
}

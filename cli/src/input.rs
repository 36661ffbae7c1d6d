//! Parsing of the JSON-valued and list-valued flags.

use mochi_core::types::{
    CardField, CardFields, TemplateFieldType, TemplateFields, TemplateOptions, TemplateStyle,
};
use mochi_core::ApiError;
use serde_json::{Map, Value};

const TEXT_ALIGNMENTS: [&str; 3] = ["left", "center", "right"];

/// `--manual-tags a, b` -> `["a", "b"]`.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',').map(|tag| tag.trim().to_string()).collect()
}

/// The literal `null` clears a nullable key.
pub fn nullable(raw: String) -> Option<String> {
    (raw != "null").then_some(raw)
}

/// Required flag: missing or empty is an error naming the flag.
pub fn required(value: Option<String>, flag: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("--{flag} is required")))
}

/// Card `--fields`. A plain string value is shorthand for `{id: key, value}`.
pub fn parse_card_fields(raw: &str) -> Result<CardFields, ApiError> {
    let invalid = |msg: String| ApiError::validation(format!("Invalid fields JSON: {msg}"));

    let mut fields = CardFields::new();
    for (key, value) in json_object(raw).map_err(invalid)? {
        let field = match value {
            Value::String(value) => CardField {
                id: key.clone(),
                value,
            },
            Value::Object(ref map) if map.contains_key("id") && map.contains_key("value") => {
                serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => {
                return Err(invalid(format!(
                    "Field \"{key}\" must have \"id\" and \"value\" properties or be a string"
                )))
            }
        };
        fields.insert(key, field);
    }
    Ok(fields)
}

/// Template `--fields`. A missing `id` defaults to the key; `type` must be
/// a known field type.
pub fn parse_template_fields(raw: &str) -> Result<TemplateFields, ApiError> {
    let invalid = |msg: String| ApiError::validation(format!("Invalid fields JSON: {msg}"));

    let mut object = json_object(raw).map_err(invalid)?;
    for (key, field) in object.iter_mut() {
        let Value::Object(field) = field else {
            return Err(invalid(format!("Field \"{key}\" must be an object")));
        };
        if let Some(field_type) = field.get("type").and_then(Value::as_str) {
            if field_type.parse::<TemplateFieldType>().is_err() {
                let names: Vec<_> = TemplateFieldType::ALL.iter().map(|(name, _)| *name).collect();
                return Err(invalid(format!(
                    "Field \"{key}\" has invalid type: {field_type}. Must be one of: {}",
                    names.join(", ")
                )));
            }
        }
        let has_id = field.get("id").and_then(Value::as_str).is_some_and(|id| !id.is_empty());
        if !has_id {
            field.insert("id".to_string(), Value::String(key.clone()));
        }
    }
    serde_json::from_value(Value::Object(object)).map_err(|e| invalid(e.to_string()))
}

pub fn parse_style(raw: &str) -> Result<TemplateStyle, ApiError> {
    let invalid = |msg: String| ApiError::validation(format!("Invalid style JSON: {msg}"));

    let object = json_object(raw).map_err(invalid)?;
    if let Some(alignment) = object.get("text-alignment") {
        let alignment = alignment.as_str().unwrap_or_default();
        if !TEXT_ALIGNMENTS.contains(&alignment) {
            return Err(invalid(format!(
                "Invalid text-alignment: {alignment}. Must be one of: {}",
                TEXT_ALIGNMENTS.join(", ")
            )));
        }
    }
    serde_json::from_value(Value::Object(object)).map_err(|e| invalid(e.to_string()))
}

pub fn parse_options(raw: &str) -> Result<TemplateOptions, ApiError> {
    let invalid = |msg: String| ApiError::validation(format!("Invalid options JSON: {msg}"));
    let object = json_object(raw).map_err(invalid)?;
    serde_json::from_value(Value::Object(object)).map_err(|e| invalid(e.to_string()))
}

fn json_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str(raw).map_err(|e| e.to_string())? {
        Value::Object(map) => Ok(map),
        _ => Err("expected a JSON object".to_string()),
    }
}

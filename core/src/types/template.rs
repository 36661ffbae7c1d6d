use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{parse_choice, require};
use crate::error::ApiError;
use crate::http::Query;

/// Field definitions keyed by field id.
pub type TemplateFields = BTreeMap<String, TemplateField>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateFieldType {
    Text,
    Boolean,
    Number,
    Draw,
    Ai,
    Speech,
    Image,
    Translate,
    Transcription,
    Dictionary,
    Pinyin,
    Furigana,
}

impl TemplateFieldType {
    pub const ALL: [(&'static str, TemplateFieldType); 12] = [
        ("text", TemplateFieldType::Text),
        ("boolean", TemplateFieldType::Boolean),
        ("number", TemplateFieldType::Number),
        ("draw", TemplateFieldType::Draw),
        ("ai", TemplateFieldType::Ai),
        ("speech", TemplateFieldType::Speech),
        ("image", TemplateFieldType::Image),
        ("translate", TemplateFieldType::Translate),
        ("transcription", TemplateFieldType::Transcription),
        ("dictionary", TemplateFieldType::Dictionary),
        ("pinyin", TemplateFieldType::Pinyin),
        ("furigana", TemplateFieldType::Furigana),
    ];
}

impl FromStr for TemplateFieldType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, "field type", &Self::ALL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateField {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Kept as the wire string; `TemplateCreateInput::validate` checks it.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateStyle {
    #[serde(rename = "text-alignment", skip_serializing_if = "Option::is_none")]
    pub text_alignment: Option<TextAlignment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    #[serde(rename = "show-sides-separately?", skip_serializing_if = "Option::is_none")]
    pub show_sides_separately: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    pub fields: TemplateFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TemplateStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<TemplateOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateListParams {
    pub bookmark: Option<String>,
}

impl TemplateListParams {
    pub fn to_query(&self) -> Query {
        Query::new().set_opt("bookmark", self.bookmark.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateCreateInput {
    pub name: String,
    pub content: String,
    pub fields: TemplateFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TemplateStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<TemplateOptions>,
}

impl TemplateCreateInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&self.name, "name")?;
        require(&self.content, "content")?;
        if self.fields.is_empty() {
            return Err(ApiError::validation("fields is required"));
        }
        for (key, field) in &self.fields {
            let Some(field_type) = &field.field_type else {
                continue;
            };
            if field_type.parse::<TemplateFieldType>().is_err() {
                let names: Vec<_> = TemplateFieldType::ALL.iter().map(|(name, _)| *name).collect();
                return Err(ApiError::validation(format!(
                    "Field \"{key}\" has invalid type: {field_type}. Must be one of: {}",
                    names.join(", ")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field(id: &str, field_type: Option<&str>) -> TemplateField {
        TemplateField {
            id: id.to_string(),
            name: Some(id.to_uppercase()),
            field_type: field_type.map(str::to_string),
            ..TemplateField::default()
        }
    }

    fn input(fields: TemplateFields) -> TemplateCreateInput {
        TemplateCreateInput {
            name: "Vocab".to_string(),
            content: "<<front>>".to_string(),
            fields,
            ..TemplateCreateInput::default()
        }
    }

    #[test]
    fn validate_requires_fields() {
        let err = input(TemplateFields::new()).validate().unwrap_err();
        assert_eq!(err.to_string(), "fields is required");
    }

    #[test]
    fn validate_checks_field_types() {
        let mut fields = TemplateFields::new();
        fields.insert("front".to_string(), field("front", Some("text")));
        assert!(input(fields.clone()).validate().is_ok());

        fields.insert("back".to_string(), field("back", Some("video")));
        let err = input(fields).validate().unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Field \"back\" has invalid type: video. Must be one of: text, boolean"));
    }

    #[test]
    fn style_and_options_use_wire_names() {
        let style = TemplateStyle {
            text_alignment: Some(TextAlignment::Center),
            ..TemplateStyle::default()
        };
        let options = TemplateOptions {
            show_sides_separately: Some(true),
            ..TemplateOptions::default()
        };
        assert_eq!(serde_json::to_value(style).unwrap(), json!({"text-alignment": "center"}));
        assert_eq!(
            serde_json::to_value(options).unwrap(),
            json!({"show-sides-separately?": true})
        );
    }

    #[test]
    fn template_round_trips_fields() {
        let raw = json!({
            "id": "t1",
            "name": "Basic",
            "content": "<<front>>",
            "fields": {"front": {"id": "front", "name": "Front", "type": "text"}},
        });
        let template: Template = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(template.fields["front"].field_type.as_deref(), Some("text"));
        assert_eq!(serde_json::to_value(&template).unwrap(), raw);
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{require, Timestamp};
use crate::error::ApiError;
use crate::http::Query;

/// Field values keyed by template field id.
pub type CardFields = BTreeMap<String, CardField>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub date: Timestamp,
    pub due: Timestamp,
    #[serde(rename = "remembered?")]
    pub remembered: bool,
}

/// A card as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    pub id: String,
    #[serde(rename = "deck-id")]
    pub deck_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(rename = "template-id", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(rename = "archived?", skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(rename = "trashed?", skip_serializing_if = "Option::is_none")]
    pub trashed: Option<String>,
    #[serde(rename = "review-reverse?", skip_serializing_if = "Option::is_none")]
    pub review_reverse: Option<bool>,
    #[serde(rename = "new?", skip_serializing_if = "Option::is_none")]
    pub new: Option<bool>,
    #[serde(rename = "manual-tags", skip_serializing_if = "Option::is_none")]
    pub manual_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<CardFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Map<String, Value>>,
    #[serde(rename = "created-at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(rename = "updated-at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardListParams {
    pub deck_id: Option<String>,
    pub limit: Option<u32>,
    pub bookmark: Option<String>,
}

impl CardListParams {
    pub fn to_query(&self) -> Query {
        Query::new()
            .set_opt("deck-id", self.deck_id.as_deref())
            .set_opt("limit", self.limit)
            .set_opt("bookmark", self.bookmark.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCreateInput {
    pub content: String,
    #[serde(rename = "deck-id")]
    pub deck_id: String,
    #[serde(rename = "template-id", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(rename = "archived?", skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(rename = "review-reverse?", skip_serializing_if = "Option::is_none")]
    pub review_reverse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(rename = "manual-tags", skip_serializing_if = "Option::is_none")]
    pub manual_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<CardFields>,
}

impl CardCreateInput {
    pub fn new(content: impl Into<String>, deck_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            deck_id: deck_id.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        require(&self.content, "content")?;
        require(&self.deck_id, "deck-id")
    }
}

/// Partial update. `Some(None)` on a nullable key sends an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "deck-id", skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,
    #[serde(rename = "template-id", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Option<String>>,
    #[serde(rename = "archived?", skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(rename = "trashed?", skip_serializing_if = "Option::is_none")]
    pub trashed: Option<Option<String>>,
    #[serde(rename = "review-reverse?", skip_serializing_if = "Option::is_none")]
    pub review_reverse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(rename = "manual-tags", skip_serializing_if = "Option::is_none")]
    pub manual_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<CardFields>,
}

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::{parse_choice, require, Timestamp};
use crate::error::ApiError;
use crate::http::Query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeckSortBy {
    None,
    Lexigraphically,
    Lexicographically,
    CreatedAt,
    UpdatedAt,
    RetentionRateAsc,
    IntervalLength,
}

impl DeckSortBy {
    pub const ALL: [(&'static str, DeckSortBy); 7] = [
        ("none", DeckSortBy::None),
        ("lexigraphically", DeckSortBy::Lexigraphically),
        ("lexicographically", DeckSortBy::Lexicographically),
        ("created-at", DeckSortBy::CreatedAt),
        ("updated-at", DeckSortBy::UpdatedAt),
        ("retention-rate-asc", DeckSortBy::RetentionRateAsc),
        ("interval-length", DeckSortBy::IntervalLength),
    ];
}

impl FromStr for DeckSortBy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, "sort-by", &Self::ALL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeckCardsView {
    List,
    Grid,
    Note,
    Column,
}

impl DeckCardsView {
    pub const ALL: [(&'static str, DeckCardsView); 4] = [
        ("list", DeckCardsView::List),
        ("grid", DeckCardsView::Grid),
        ("note", DeckCardsView::Note),
        ("column", DeckCardsView::Column),
    ];
}

impl FromStr for DeckCardsView {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, "cards-view", &Self::ALL)
    }
}

/// A deck as returned by the server. Enumerated settings stay plain strings
/// here so a value this crate does not know yet still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deck {
    pub id: String,
    pub name: String,
    #[serde(rename = "parent-id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Number>,
    #[serde(rename = "trashed?", skip_serializing_if = "Option::is_none")]
    pub trashed: Option<String>,
    #[serde(rename = "archived?", skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(rename = "sort-by", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(rename = "cards-view", skip_serializing_if = "Option::is_none")]
    pub cards_view: Option<String>,
    #[serde(rename = "show-sides?", skip_serializing_if = "Option::is_none")]
    pub show_sides: Option<bool>,
    #[serde(rename = "sort-by-direction", skip_serializing_if = "Option::is_none")]
    pub sort_by_direction: Option<bool>,
    #[serde(rename = "review-reverse?", skip_serializing_if = "Option::is_none")]
    pub review_reverse: Option<bool>,
    #[serde(rename = "created-at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(rename = "updated-at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckListParams {
    pub bookmark: Option<String>,
}

impl DeckListParams {
    pub fn to_query(&self) -> Query {
        Query::new().set_opt("bookmark", self.bookmark.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCreateInput {
    pub name: String,
    #[serde(rename = "parent-id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(rename = "trashed?", skip_serializing_if = "Option::is_none")]
    pub trashed: Option<String>,
    #[serde(rename = "archived?", skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(rename = "sort-by", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<DeckSortBy>,
    #[serde(rename = "cards-view", skip_serializing_if = "Option::is_none")]
    pub cards_view: Option<DeckCardsView>,
    #[serde(rename = "show-sides?", skip_serializing_if = "Option::is_none")]
    pub show_sides: Option<bool>,
    #[serde(rename = "sort-by-direction", skip_serializing_if = "Option::is_none")]
    pub sort_by_direction: Option<bool>,
    #[serde(rename = "review-reverse?", skip_serializing_if = "Option::is_none")]
    pub review_reverse: Option<bool>,
}

impl DeckCreateInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        require(&self.name, "name")
    }
}

/// Partial update. `Some(None)` on a nullable key sends an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "parent-id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(rename = "trashed?", skip_serializing_if = "Option::is_none")]
    pub trashed: Option<Option<String>>,
    #[serde(rename = "archived?", skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(rename = "sort-by", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<DeckSortBy>,
    #[serde(rename = "cards-view", skip_serializing_if = "Option::is_none")]
    pub cards_view: Option<DeckCardsView>,
    #[serde(rename = "show-sides?", skip_serializing_if = "Option::is_none")]
    pub show_sides: Option<bool>,
    #[serde(rename = "sort-by-direction", skip_serializing_if = "Option::is_none")]
    pub sort_by_direction: Option<bool>,
    #[serde(rename = "review-reverse?", skip_serializing_if = "Option::is_none")]
    pub review_reverse: Option<bool>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sort_by_parses_wire_names() {
        assert_eq!("created-at".parse::<DeckSortBy>().unwrap(), DeckSortBy::CreatedAt);
        assert_eq!(
            serde_json::to_value(DeckSortBy::RetentionRateAsc).unwrap(),
            json!("retention-rate-asc")
        );
    }

    #[test]
    fn invalid_sort_by_lists_choices() {
        let err = "alphabetical".parse::<DeckSortBy>().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Invalid sort-by: alphabetical. Must be one of: none, lexigraphically, \
             lexicographically, created-at, updated-at, retention-rate-asc, interval-length"
        );
    }

    #[test]
    fn invalid_cards_view_is_rejected() {
        let err = "table".parse::<DeckCardsView>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid cards-view: table. Must be one of: list, grid, note, column"
        );
    }

    #[test]
    fn create_input_uses_wire_names() {
        let input = DeckCreateInput {
            parent_id: Some("p1".to_string()),
            show_sides: Some(true),
            sort_by: Some(DeckSortBy::None),
            ..DeckCreateInput::new("Spanish")
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"name": "Spanish", "parent-id": "p1", "show-sides?": true, "sort-by": "none"})
        );
    }

    #[test]
    fn create_input_requires_name() {
        assert!(DeckCreateInput::new("").validate().is_err());
        assert!(DeckCreateInput::new("Spanish").validate().is_ok());
    }

    #[test]
    fn update_input_can_unparent() {
        let input = DeckUpdateInput {
            parent_id: Some(None),
            ..DeckUpdateInput::default()
        };
        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"parent-id": null}));
    }

    #[test]
    fn deck_accepts_unknown_sort_value() {
        let deck: Deck =
            serde_json::from_value(json!({"id": "d1", "name": "A", "sort-by": "shuffled", "sort": 3}))
                .unwrap();
        assert_eq!(deck.sort_by.as_deref(), Some("shuffled"));
        assert_eq!(deck.sort, Some(Number::from(3)));
    }
}

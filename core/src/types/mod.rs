//! Domain DTOs for the Mochi API.
//!
//! # Design
//! Wire names use the API's kebab-case keys and its trailing `?` convention
//! for booleans (`archived?`, `review-reverse?`). Records returned by the
//! server keep any keys this crate does not model in `extra`, so printing a
//! record does not drop data. Input types are validated locally before a
//! request is built.

mod card;
mod deck;
mod template;

use serde::{Deserialize, Serialize};

pub use card::{Card, CardCreateInput, CardField, CardFields, CardListParams, CardUpdateInput, Review};
pub use deck::{Deck, DeckCardsView, DeckCreateInput, DeckListParams, DeckSortBy, DeckUpdateInput};
pub use template::{
    Template, TemplateCreateInput, TemplateField, TemplateFieldType, TemplateFields,
    TemplateListParams, TemplateOptions, TemplateStyle, TextAlignment,
};

use crate::error::ApiError;
use crate::http::Query;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub date: String,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub docs: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

/// Envelope of the due endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueCards {
    #[serde(default)]
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DueParams {
    /// ISO 8601 timestamp. The server defaults to today.
    pub date: Option<String>,
}

impl DueParams {
    pub fn to_query(&self) -> Query {
        Query::new().set_opt("date", self.date.as_deref())
    }
}

pub(crate) fn require(value: &str, what: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{what} is required")));
    }
    Ok(())
}

/// Parse one of a closed set of wire names, listing the valid ones on failure.
pub(crate) fn parse_choice<T: Copy>(
    value: &str,
    flag: &str,
    choices: &[(&'static str, T)],
) -> Result<T, ApiError> {
    choices
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, choice)| *choice)
        .ok_or_else(|| {
            let names: Vec<_> = choices.iter().map(|(name, _)| *name).collect();
            ApiError::validation(format!(
                "Invalid {flag}: {value}. Must be one of: {}",
                names.join(", ")
            ))
        })
}

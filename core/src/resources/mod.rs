//! Typed clients for the API's resources.
//!
//! Each resource borrows the `MochiClient` and exposes one method per domain
//! operation. As in the client itself, request construction (`build_*`) is
//! separate from execution so the produced requests can be checked without a
//! transport.

mod cards;
mod decks;
mod due;
mod templates;

pub use cards::Cards;
pub use decks::Decks;
pub use due::Due;
pub use templates::Templates;

use crate::client::MochiClient;
use crate::error::ApiError;
use crate::http::encode_segment;

impl MochiClient {
    pub fn cards(&self) -> Cards<'_> {
        Cards::new(self)
    }

    pub fn decks(&self) -> Decks<'_> {
        Decks::new(self)
    }

    pub fn templates(&self) -> Templates<'_> {
        Templates::new(self)
    }

    pub fn due(&self) -> Due<'_> {
        Due::new(self)
    }
}

/// `/{collection}/{id}` with the id percent-encoded. Empty ids are rejected.
fn entity_path(collection: &str, id: &str, what: &str) -> Result<String, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::validation(format!("{what} is required")));
    }
    Ok(format!("/{collection}/{}", encode_segment(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_path_encodes_the_id() {
        assert_eq!(entity_path("cards", "a b/c", "card id").unwrap(), "/cards/a%20b%2Fc");
    }

    #[test]
    fn entity_path_rejects_empty_ids() {
        let err = entity_path("decks", " ", "deck id").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "deck id is required");
    }
}

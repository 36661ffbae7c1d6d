use futures::Stream;

use super::entity_path;
use crate::client::MochiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Query, RequestBody};
use crate::types::{Deck, DeckCreateInput, DeckListParams, DeckUpdateInput, Page};

pub struct Decks<'a> {
    client: &'a MochiClient,
}

impl<'a> Decks<'a> {
    pub(crate) fn new(client: &'a MochiClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, params: &DeckListParams) -> HttpRequest {
        self.client
            .build_request(HttpMethod::Get, "/decks", &params.to_query(), RequestBody::Empty)
    }

    pub fn build_get(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let path = entity_path("decks", id, "deck id")?;
        Ok(self
            .client
            .build_request(HttpMethod::Get, &path, &Query::new(), RequestBody::Empty))
    }

    pub fn build_create(&self, input: &DeckCreateInput) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.client.build_json(HttpMethod::Post, "/decks", input)
    }

    pub fn build_update(&self, id: &str, input: &DeckUpdateInput) -> Result<HttpRequest, ApiError> {
        let path = entity_path("decks", id, "deck id")?;
        self.client.build_json(HttpMethod::Post, &path, input)
    }

    pub fn build_delete(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let path = entity_path("decks", id, "deck id")?;
        Ok(self
            .client
            .build_request(HttpMethod::Delete, &path, &Query::new(), RequestBody::Empty))
    }

    pub async fn list(&self, params: &DeckListParams) -> Result<Page<Deck>, ApiError> {
        self.client.send(self.build_list(params)).await
    }

    pub fn list_all(&self) -> impl Stream<Item = Result<Deck, ApiError>> + 'a {
        self.client.paginate("/decks", Query::new(), None)
    }

    pub async fn get(&self, id: &str) -> Result<Deck, ApiError> {
        self.client.send(self.build_get(id)?).await
    }

    pub async fn create(&self, input: &DeckCreateInput) -> Result<Deck, ApiError> {
        self.client.send(self.build_create(input)?).await
    }

    pub async fn update(&self, id: &str, input: &DeckUpdateInput) -> Result<Deck, ApiError> {
        self.client.send(self.build_update(id, input)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(self.build_delete(id)?).await
    }
}

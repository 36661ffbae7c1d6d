use super::entity_path;
use crate::client::MochiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, RequestBody};
use crate::types::{Card, DueCards, DueParams};

/// Cards due for review, across all decks or within one.
pub struct Due<'a> {
    client: &'a MochiClient,
}

impl<'a> Due<'a> {
    pub(crate) fn new(client: &'a MochiClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, params: &DueParams) -> HttpRequest {
        self.client
            .build_request(HttpMethod::Get, "/due", &params.to_query(), RequestBody::Empty)
    }

    pub fn build_list_by_deck(&self, deck_id: &str, params: &DueParams) -> Result<HttpRequest, ApiError> {
        let path = entity_path("due", deck_id, "deck-id")?;
        Ok(self
            .client
            .build_request(HttpMethod::Get, &path, &params.to_query(), RequestBody::Empty))
    }

    pub async fn list(&self, params: &DueParams) -> Result<Vec<Card>, ApiError> {
        let due: DueCards = self.client.send(self.build_list(params)).await?;
        Ok(due.cards)
    }

    pub async fn list_by_deck(&self, deck_id: &str, params: &DueParams) -> Result<Vec<Card>, ApiError> {
        let due: DueCards = self
            .client
            .send(self.build_list_by_deck(deck_id, params)?)
            .await?;
        Ok(due.cards)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::ClientConfig;
    use crate::credential::Credential;
    use crate::queue::RequestQueue;
    use crate::testing::{json_response, ScriptedTransport};

    fn client(transport: std::sync::Arc<ScriptedTransport>) -> MochiClient {
        MochiClient::with_transport(
            Credential::new("secret").unwrap(),
            ClientConfig::default().with_base_url("http://localhost:3000/api"),
            transport,
            RequestQueue::new(),
        )
    }

    #[test]
    fn build_requests_carry_optional_date() {
        let client = client(ScriptedTransport::new(vec![]));
        let req = client.due().build_list(&DueParams::default());
        assert_eq!(req.url, "http://localhost:3000/api/due");

        let params = DueParams {
            date: Some("2026-01-15T00:00:00.000Z".to_string()),
        };
        let req = client.due().build_list_by_deck("d1", &params).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/api/due/d1?date=2026-01-15T00%3A00%3A00.000Z"
        );
    }

    #[test]
    fn list_by_deck_requires_deck() {
        let client = client(ScriptedTransport::new(vec![]));
        let err = client.due().build_list_by_deck("", &DueParams::default()).unwrap_err();
        assert_eq!(err.to_string(), "deck-id is required");
    }

    #[tokio::test(start_paused = true)]
    async fn list_unwraps_envelope() {
        let transport = ScriptedTransport::new(vec![Ok(json_response(
            200,
            json!({"cards": [{"id": "c1", "deck-id": "d1"}, {"id": "c2", "deck-id": "d1"}]}),
        ))]);
        let client = client(transport);
        let cards = client.due().list(&DueParams::default()).await.unwrap();
        let ids: Vec<_> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }
}

use std::path::Path;

use futures::Stream;
use tracing::debug;

use super::entity_path;
use crate::client::MochiClient;
use crate::error::ApiError;
use crate::http::{encode_segment, FilePart, HttpMethod, HttpRequest, Query, RequestBody};
use crate::types::{Card, CardCreateInput, CardListParams, CardUpdateInput, Page};

/// Multipart field name the attachment endpoint expects.
const ATTACHMENT_FIELD: &str = "file";

pub struct Cards<'a> {
    client: &'a MochiClient,
}

impl<'a> Cards<'a> {
    pub(crate) fn new(client: &'a MochiClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, params: &CardListParams) -> HttpRequest {
        self.client
            .build_request(HttpMethod::Get, "/cards", &params.to_query(), RequestBody::Empty)
    }

    pub fn build_get(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let path = entity_path("cards", id, "card id")?;
        Ok(self
            .client
            .build_request(HttpMethod::Get, &path, &Query::new(), RequestBody::Empty))
    }

    pub fn build_create(&self, input: &CardCreateInput) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.client.build_json(HttpMethod::Post, "/cards", input)
    }

    /// Updates are a POST to the card's own URL.
    pub fn build_update(&self, id: &str, input: &CardUpdateInput) -> Result<HttpRequest, ApiError> {
        let path = entity_path("cards", id, "card id")?;
        self.client.build_json(HttpMethod::Post, &path, input)
    }

    pub fn build_delete(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let path = entity_path("cards", id, "card id")?;
        Ok(self
            .client
            .build_request(HttpMethod::Delete, &path, &Query::new(), RequestBody::Empty))
    }

    pub fn build_add_attachment(
        &self,
        id: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<HttpRequest, ApiError> {
        let path = attachment_path(id, filename)?;
        let part = FilePart {
            field: ATTACHMENT_FIELD.to_string(),
            file_name: filename.to_string(),
            content_type: content_type_for(filename).to_string(),
            bytes,
        };
        Ok(self
            .client
            .build_request(HttpMethod::Post, &path, &Query::new(), RequestBody::Multipart(part)))
    }

    pub fn build_delete_attachment(&self, id: &str, filename: &str) -> Result<HttpRequest, ApiError> {
        let path = attachment_path(id, filename)?;
        Ok(self
            .client
            .build_request(HttpMethod::Delete, &path, &Query::new(), RequestBody::Empty))
    }

    /// One page of cards.
    pub async fn list(&self, params: &CardListParams) -> Result<Page<Card>, ApiError> {
        self.client.send(self.build_list(params)).await
    }

    /// Every card matching `params`, fetched page by page. The bookmark in
    /// `params` is ignored.
    pub fn list_all(&self, params: &CardListParams) -> impl Stream<Item = Result<Card, ApiError>> + 'a {
        let query = Query::new().set_opt("deck-id", params.deck_id.as_deref());
        self.client.paginate("/cards", query, params.limit)
    }

    pub async fn get(&self, id: &str) -> Result<Card, ApiError> {
        self.client.send(self.build_get(id)?).await
    }

    pub async fn create(&self, input: &CardCreateInput) -> Result<Card, ApiError> {
        self.client.send(self.build_create(input)?).await
    }

    pub async fn update(&self, id: &str, input: &CardUpdateInput) -> Result<Card, ApiError> {
        self.client.send(self.build_update(id, input)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(self.build_delete(id)?).await
    }

    /// Upload the file at `path` as `filename`. Sent once, outside the
    /// request queue.
    pub async fn add_attachment(
        &self,
        id: &str,
        filename: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), ApiError> {
        // Reject bad arguments before touching the file system.
        attachment_path(id, filename)?;
        let bytes = tokio::fs::read(path.as_ref()).await?;
        debug!(card = id, filename, size = bytes.len(), "read attachment");
        self.client
            .upload(self.build_add_attachment(id, filename, bytes)?)
            .await
    }

    pub async fn delete_attachment(&self, id: &str, filename: &str) -> Result<(), ApiError> {
        self.client
            .delete(self.build_delete_attachment(id, filename)?)
            .await
    }
}

fn attachment_path(id: &str, filename: &str) -> Result<String, ApiError> {
    let card = entity_path("cards", id, "card id")?;
    if filename.trim().is_empty() {
        return Err(ApiError::validation("filename is required"));
    }
    Ok(format!("{card}/attachments/{}", encode_segment(filename)))
}

/// Content type from the file extension, `application/octet-stream` otherwise.
fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::client::ClientConfig;
    use crate::credential::Credential;
    use crate::queue::RequestQueue;
    use crate::testing::{json_response, ScriptedTransport};

    fn client(transport: Arc<ScriptedTransport>) -> MochiClient {
        MochiClient::with_transport(
            Credential::new("secret").unwrap(),
            ClientConfig::default().with_base_url("http://localhost:3000/api"),
            transport,
            RequestQueue::new(),
        )
    }

    fn offline() -> MochiClient {
        client(ScriptedTransport::new(vec![]))
    }

    fn json_body(req: &HttpRequest) -> Value {
        match &req.body {
            RequestBody::Json(body) => serde_json::from_str(body).unwrap(),
            other => panic!("expected json body, got {other:?}"),
        }
    }

    #[test]
    fn build_list_drops_unset_params() {
        let client = offline();
        let params = CardListParams {
            deck_id: Some("d1".to_string()),
            limit: None,
            bookmark: Some(String::new()),
        };
        let req = client.cards().build_list(&params);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/cards?deck-id=d1");
    }

    #[test]
    fn build_get_encodes_id() {
        let req = offline().cards().build_get("abc/1").unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/cards/abc%2F1");
        assert!(req.body.is_empty());
    }

    #[test]
    fn build_get_rejects_empty_id() {
        let err = offline().cards().build_get("").unwrap_err();
        assert_eq!(err.to_string(), "card id is required");
    }

    #[test]
    fn build_create_validates_before_building() {
        let client = offline();
        let err = client.cards().build_create(&CardCreateInput::new("", "d1")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let req = client
            .cards()
            .build_create(&CardCreateInput::new("# Hola", "d1"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/cards");
        assert_eq!(json_body(&req), json!({"content": "# Hola", "deck-id": "d1"}));
    }

    #[test]
    fn build_update_posts_to_card_url() {
        let input = CardUpdateInput {
            archived: Some(true),
            ..CardUpdateInput::default()
        };
        let req = offline().cards().build_update("c1", &input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/cards/c1");
        assert_eq!(json_body(&req), json!({"archived?": true}));
    }

    #[test]
    fn build_attachment_requests() {
        let client = offline();
        let req = client
            .cards()
            .build_add_attachment("c1", "my photo.PNG", vec![1, 2, 3])
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/cards/c1/attachments/my%20photo.PNG");
        assert_eq!(req.header("content-type"), None);
        match &req.body {
            RequestBody::Multipart(part) => {
                assert_eq!(part.field, "file");
                assert_eq!(part.file_name, "my photo.PNG");
                assert_eq!(part.content_type, "image/png");
                assert_eq!(part.bytes, vec![1, 2, 3]);
            }
            other => panic!("expected multipart, got {other:?}"),
        }

        let req = client.cards().build_delete_attachment("c1", "a.png").unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/api/cards/c1/attachments/a.png");

        let err = client.cards().build_delete_attachment("c1", "").unwrap_err();
        assert_eq!(err.to_string(), "filename is required");
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[tokio::test(start_paused = true)]
    async fn get_decodes_card() {
        let transport = ScriptedTransport::new(vec![Ok(json_response(
            200,
            json!({"id": "c1", "deck-id": "d1", "content": "front"}),
        ))]);
        let client = client(transport.clone());
        let card = client.cards().get("c1").await.unwrap();
        assert_eq!(card.id, "c1");
        assert_eq!(card.content.as_deref(), Some("front"));
    }

    #[tokio::test(start_paused = true)]
    async fn list_all_ignores_caller_bookmark() {
        let transport = ScriptedTransport::new(vec![Ok(json_response(
            200,
            json!({"docs": [{"id": "c1", "deck-id": "d1"}]}),
        ))]);
        let client = client(transport.clone());
        let params = CardListParams {
            deck_id: Some("d1".to_string()),
            limit: Some(10),
            bookmark: Some("stale".to_string()),
        };

        let cards: Vec<Card> = futures::TryStreamExt::try_collect(client.cards().list_all(&params))
            .await
            .unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(
            transport.requests()[0].url,
            "http://localhost:3000/api/cards?deck-id=d1&limit=10"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn add_attachment_reads_file_and_uploads_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"png bytes").unwrap();
        let transport = ScriptedTransport::new(vec![Ok(json_response(200, json!({})))]);
        let client = client(transport.clone());

        client
            .cards()
            .add_attachment("c1", "image.png", file.path())
            .await
            .unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        match &sent[0].body {
            RequestBody::Multipart(part) => assert_eq!(part.bytes, b"png bytes".to_vec()),
            other => panic!("expected multipart, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn add_attachment_missing_file_is_io_error() {
        let transport = ScriptedTransport::new(vec![]);
        let client = client(transport.clone());
        let err = client
            .cards()
            .add_attachment("c1", "a.png", "/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
        assert_eq!(transport.request_count(), 0);
    }
}

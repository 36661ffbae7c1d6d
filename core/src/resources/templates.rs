use futures::Stream;

use super::entity_path;
use crate::client::MochiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Query, RequestBody};
use crate::types::{Page, Template, TemplateCreateInput, TemplateListParams};

pub struct Templates<'a> {
    client: &'a MochiClient,
}

impl<'a> Templates<'a> {
    pub(crate) fn new(client: &'a MochiClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, params: &TemplateListParams) -> HttpRequest {
        self.client.build_request(
            HttpMethod::Get,
            "/templates",
            &params.to_query(),
            RequestBody::Empty,
        )
    }

    pub fn build_get(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let path = entity_path("templates", id, "template id")?;
        Ok(self
            .client
            .build_request(HttpMethod::Get, &path, &Query::new(), RequestBody::Empty))
    }

    pub fn build_create(&self, input: &TemplateCreateInput) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.client.build_json(HttpMethod::Post, "/templates", input)
    }

    pub async fn list(&self, params: &TemplateListParams) -> Result<Page<Template>, ApiError> {
        self.client.send(self.build_list(params)).await
    }

    pub fn list_all(&self) -> impl Stream<Item = Result<Template, ApiError>> + 'a {
        self.client.paginate("/templates", Query::new(), None)
    }

    pub async fn get(&self, id: &str) -> Result<Template, ApiError> {
        self.client.send(self.build_get(id)?).await
    }

    pub async fn create(&self, input: &TemplateCreateInput) -> Result<Template, ApiError> {
        self.client.send(self.build_create(input)?).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::client::ClientConfig;
    use crate::credential::Credential;
    use crate::queue::RequestQueue;
    use crate::testing::ScriptedTransport;
    use crate::types::{TemplateField, TemplateFields};

    fn client() -> MochiClient {
        MochiClient::with_transport(
            Credential::new("secret").unwrap(),
            ClientConfig::default().with_base_url("http://localhost:3000/api"),
            ScriptedTransport::new(vec![]),
            RequestQueue::new(),
        )
    }

    #[test]
    fn build_get_targets_template() {
        let req = client().templates().build_get("t1").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/templates/t1");
    }

    #[test]
    fn build_create_serializes_fields() {
        let mut fields = TemplateFields::new();
        fields.insert(
            "name".to_string(),
            TemplateField {
                id: "name".to_string(),
                name: Some("Name".to_string()),
                field_type: Some("text".to_string()),
                ..TemplateField::default()
            },
        );
        let input = TemplateCreateInput {
            name: "Vocab".to_string(),
            content: "<< Name >>".to_string(),
            fields,
            ..TemplateCreateInput::default()
        };

        let req = client().templates().build_create(&input).unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/templates");
        let body: Value = match &req.body {
            RequestBody::Json(body) => serde_json::from_str(body).unwrap(),
            other => panic!("expected json body, got {other:?}"),
        };
        assert_eq!(
            body,
            json!({
                "name": "Vocab",
                "content": "<< Name >>",
                "fields": {"name": {"id": "name", "name": "Name", "type": "text"}},
            })
        );
    }

    #[test]
    fn build_create_rejects_missing_fields() {
        let input = TemplateCreateInput {
            name: "Vocab".to_string(),
            content: "x".to_string(),
            ..TemplateCreateInput::default()
        };
        let err = client().templates().build_create(&input).unwrap_err();
        assert_eq!(err.to_string(), "fields is required");
    }
}

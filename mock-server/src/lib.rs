//! In-memory stand-in for the Mochi REST API.
//!
//! Serves `/api/cards`, `/api/decks`, `/api/templates` and `/api/due` with the
//! same wire shapes as the real service: kebab-case keys, basic auth with the
//! API key as username, bookmark pagination, `errors` payloads on failure and
//! `POST` for updates. `AppState::inject_fault` queues canned failures for
//! exercising client retries.

pub mod store;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

use store::{new_id, timestamp, Record, Store};

#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Key expected as the basic-auth username.
    pub api_key: String,
    /// Page size used when a list request has no `limit`.
    pub page_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_key: "test-key".to_string(),
            page_size: 10,
        }
    }
}

/// A canned failure returned instead of routing the next request.
#[derive(Debug, Clone)]
pub struct Fault {
    pub status: u16,
    pub retry_after: Option<String>,
}

#[derive(Clone, Default)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    faults: Arc<Mutex<VecDeque<Fault>>>,
    config: Arc<MockConfig>,
    requests: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(config),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Fail the next request with `status`, optionally sending `Retry-After`.
    /// Faults queue up and are consumed one per request.
    pub fn inject_fault(&self, status: u16, retry_after: Option<&str>) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Fault {
                status,
                retry_after: retry_after.map(str::to_string),
            });
    }

    /// Requests received so far, faulted and unauthorized ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn next_fault(&self) -> Option<Fault> {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/cards", get(list_cards).post(create_card))
        .route("/cards/{id}", get(get_card).post(update_card).delete(delete_card))
        .route(
            "/cards/{id}/attachments/{filename}",
            post(add_attachment).delete(delete_attachment),
        )
        .route("/decks", get(list_decks).post(create_deck))
        .route("/decks/{id}", get(get_deck).post(update_deck).delete(delete_deck))
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/{id}", get(get_template))
        .route("/due", get(list_due))
        .route("/due/{deck_id}", get(list_due_by_deck))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(middleware::from_fn_with_state(state.clone(), count_and_fault));

    Router::new().nest("/api", api).with_state(state)
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

// --- errors ---

/// Failure response carrying an `errors` payload.
#[derive(Debug)]
pub struct MockError {
    status: StatusCode,
    errors: Value,
}

impl MockError {
    fn not_found(what: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            errors: json!([format!("{what} not found")]),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            errors: json!([message.into()]),
        }
    }

    /// 422 with a field -> message mapping.
    fn invalid(fields: Map<String, Value>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            errors: Value::Object(fields),
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "errors": self.errors }))).into_response()
    }
}

impl From<JsonRejection> for MockError {
    fn from(rejection: JsonRejection) -> Self {
        MockError::bad_request(rejection.body_text())
    }
}

type ApiResult = Result<Response, MockError>;

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(rename = "deck-id")]
    deck_id: Option<String>,
    limit: Option<String>,
    bookmark: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DueParams {
    date: Option<String>,
}

// --- middleware ---

async fn count_and_fault(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some(fault) = state.next_fault() else {
        return next.run(request).await;
    };

    let status = StatusCode::from_u16(fault.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let reason = status.canonical_reason().unwrap_or("Injected fault");
    let mut response = (status, Json(json!({ "errors": [reason] }))).into_response();
    if let Some(value) = fault.retry_after.and_then(|v| HeaderValue::from_str(&v).ok()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if basic_auth_user(request.headers()).as_deref() == Some(state.config.api_key.as_str()) {
        return next.run(request).await;
    }
    (StatusCode::UNAUTHORIZED, Json(json!({ "errors": "Unauthorized" }))).into_response()
}

/// Username of a `Basic` authorization header.
fn basic_auth_user(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
    let (user, _password) = decoded.split_once(':')?;
    Some(user.to_string())
}

// --- helpers ---

fn object(body: Result<Json<Value>, JsonRejection>) -> Result<Record, MockError> {
    let Json(value) = body?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(MockError::bad_request("Request body must be a JSON object")),
    }
}

/// 422 unless every key in `fields` holds a non-empty value.
fn require(record: &Record, fields: &[&str]) -> Result<(), MockError> {
    let missing: Map<String, Value> = fields
        .iter()
        .filter(|key| match record.get(**key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Object(o)) => o.is_empty(),
            Some(_) => false,
        })
        .map(|key| (key.to_string(), json!("is required")))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MockError::invalid(missing))
    }
}

fn stamp_new(mut record: Record) -> Record {
    record.insert("id".to_string(), json!(new_id()));
    record.insert("created-at".to_string(), timestamp());
    record
}

fn page_of(state: &AppState, records: Vec<Record>, params: &ListParams) -> ApiResult {
    let limit = match &params.limit {
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if (1..=100).contains(&n) => n,
            _ => return Err(MockError::bad_request(format!("Invalid limit: {raw}"))),
        },
        None => state.config.page_size,
    };
    let body = store::page(records, params.bookmark.as_deref(), limit)
        .map_err(MockError::bad_request)?;
    Ok(Json(body).into_response())
}

fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

// --- cards ---

async fn list_cards(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    let db = state.store.read().await;
    let deck = params.deck_id.as_deref();
    let cards = db
        .cards
        .iter()
        .filter(|card| deck.is_none_or(|d| card.get("deck-id").and_then(Value::as_str) == Some(d)))
        .cloned()
        .collect();
    page_of(&state, cards, &params)
}

async fn create_card(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let input = object(body)?;
    require(&input, &["content", "deck-id"])?;

    let mut card = stamp_new(input);
    card.entry("new?").or_insert(json!(true));
    card.entry("reviews").or_insert(json!([]));
    card.entry("references").or_insert(json!([]));
    card.entry("tags").or_insert(json!([]));
    state.store.write().await.cards.insert(card.clone());
    Ok(Json(card).into_response())
}

async fn get_card(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let db = state.store.read().await;
    let card = db.cards.get(&id).ok_or_else(|| MockError::not_found("Card"))?;
    Ok(Json(card.clone()).into_response())
}

async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let patch = object(body)?;
    let mut db = state.store.write().await;
    let card = db.cards.get_mut(&id).ok_or_else(|| MockError::not_found("Card"))?;
    store::merge(card, patch);
    Ok(Json(card.clone()).into_response())
}

async fn delete_card(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let mut db = state.store.write().await;
    db.cards.remove(&id).ok_or_else(|| MockError::not_found("Card"))?;
    Ok(no_content())
}

async fn add_attachment(
    State(state): State<AppState>,
    Path((id, filename)): Path<(String, String)>,
    mut multipart: Multipart,
) -> ApiResult {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MockError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| MockError::bad_request(e.body_text()))?;
        upload = Some((content_type, bytes.len()));
    }
    let (content_type, size) = upload.ok_or_else(|| {
        let mut fields = Map::new();
        fields.insert("file".to_string(), json!("is required"));
        MockError::invalid(fields)
    })?;

    let mut db = state.store.write().await;
    let card = db.cards.get_mut(&id).ok_or_else(|| MockError::not_found("Card"))?;
    let attachments = card
        .entry("attachments")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| MockError::bad_request("Corrupt attachments"))?;
    attachments.insert(
        filename.clone(),
        json!({ "file-name": filename, "content-type": content_type, "size": size }),
    );
    Ok(Json(json!({})).into_response())
}

async fn delete_attachment(
    State(state): State<AppState>,
    Path((id, filename)): Path<(String, String)>,
) -> ApiResult {
    let mut db = state.store.write().await;
    let card = db.cards.get_mut(&id).ok_or_else(|| MockError::not_found("Card"))?;
    card.get_mut("attachments")
        .and_then(Value::as_object_mut)
        .and_then(|attachments| attachments.remove(&filename))
        .ok_or_else(|| MockError::not_found("Attachment"))?;
    Ok(no_content())
}

// --- decks ---

async fn list_decks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    let decks = state.store.read().await.decks.iter().cloned().collect();
    page_of(&state, decks, &params)
}

async fn create_deck(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let input = object(body)?;
    require(&input, &["name"])?;

    let deck = stamp_new(input);
    state.store.write().await.decks.insert(deck.clone());
    Ok(Json(deck).into_response())
}

async fn get_deck(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let db = state.store.read().await;
    let deck = db.decks.get(&id).ok_or_else(|| MockError::not_found("Deck"))?;
    Ok(Json(deck.clone()).into_response())
}

async fn update_deck(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let patch = object(body)?;
    let mut db = state.store.write().await;
    let deck = db.decks.get_mut(&id).ok_or_else(|| MockError::not_found("Deck"))?;
    store::merge(deck, patch);
    Ok(Json(deck.clone()).into_response())
}

async fn delete_deck(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let mut db = state.store.write().await;
    db.decks.remove(&id).ok_or_else(|| MockError::not_found("Deck"))?;
    Ok(no_content())
}

// --- templates ---

async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    let templates = state.store.read().await.templates.iter().cloned().collect();
    page_of(&state, templates, &params)
}

async fn create_template(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let input = object(body)?;
    require(&input, &["name", "content", "fields"])?;

    let template = stamp_new(input);
    state.store.write().await.templates.insert(template.clone());
    Ok(Json(template).into_response())
}

async fn get_template(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let db = state.store.read().await;
    let template = db
        .templates
        .get(&id)
        .ok_or_else(|| MockError::not_found("Template"))?;
    Ok(Json(template.clone()).into_response())
}

// --- due ---

async fn list_due(
    State(state): State<AppState>,
    Query(params): Query<DueParams>,
) -> ApiResult {
    due_cards(&state, None, &params).await
}

async fn list_due_by_deck(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
    Query(params): Query<DueParams>,
) -> ApiResult {
    due_cards(&state, Some(&deck_id), &params).await
}

async fn due_cards(
    state: &AppState,
    deck_id: Option<&str>,
    params: &DueParams,
) -> ApiResult {
    let date = params
        .date
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    let db = state.store.read().await;
    if let Some(deck_id) = deck_id {
        db.decks.get(deck_id).ok_or_else(|| MockError::not_found("Deck"))?;
    }
    let cards: Vec<Value> = db
        .cards
        .iter()
        .filter(|card| {
            deck_id.is_none_or(|d| card.get("deck-id").and_then(Value::as_str) == Some(d))
        })
        .filter(|card| store::is_due(card, &date))
        .cloned()
        .map(Value::Object)
        .collect();
    Ok(Json(json!({ "cards": cards })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn basic_auth_user_is_the_key() {
        // base64("test-key:")
        assert_eq!(
            basic_auth_user(&headers("Basic dGVzdC1rZXk6")).as_deref(),
            Some("test-key")
        );
        assert_eq!(basic_auth_user(&headers("Bearer dGVzdC1rZXk6")), None);
        assert_eq!(basic_auth_user(&HeaderMap::new()), None);
    }

    #[test]
    fn require_reports_each_missing_field() {
        let record = json!({"content": "  ", "deck-id": "d1"});
        let err = require(record.as_object().unwrap(), &["content", "deck-id", "name"]).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.errors, json!({"content": "is required", "name": "is required"}));
    }

    #[test]
    fn faults_are_consumed_in_order() {
        let state = AppState::default();
        state.inject_fault(503, None);
        state.inject_fault(429, Some("1"));
        assert_eq!(state.next_fault().map(|f| f.status), Some(503));
        let second = state.next_fault().unwrap();
        assert_eq!(second.status, 429);
        assert_eq!(second.retry_after.as_deref(), Some("1"));
        assert!(state.next_fault().is_none());
    }
}

//! Authenticated request executor for the Mochi API.
//!
//! # Design
//! `MochiClient` owns the credential, the configuration, a `Transport` and a
//! handle to the shared `RequestQueue`. Request construction (`build_*`) is
//! pure and returns an `HttpRequest` with URL, auth and content headers
//! resolved. `execute` runs one request through the queue and the retry loop
//! and returns the parsed payload or a typed error.
//!
//! Attachment upload is the exception: `upload` sends once, outside the queue
//! and without retries.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Query, RequestBody};
use crate::queue::RequestQueue;
use crate::response::{Payload, ResponseOutcome};
use crate::retry::RetryPolicy;
use crate::transport::{ReqwestTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "https://app.mochi.cards/api";

/// Environment variable overriding `DEFAULT_BASE_URL`.
pub const BASE_URL_ENV: &str = "MOCHI_BASE_URL";

/// Courtesy pause between successive page fetches.
pub const PAGE_DELAY: Duration = Duration::from_millis(75);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub retry: RetryPolicy,
    pub page_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            page_delay: PAGE_DELAY,
        }
    }
}

impl ClientConfig {
    /// Defaults, with the base URL taken from `MOCHI_BASE_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = std::env::var(BASE_URL_ENV).ok().filter(|url| !url.is_empty()) {
            config = config.with_base_url(&url);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

pub struct MochiClient {
    credential: Credential,
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    queue: RequestQueue,
}

impl MochiClient {
    /// Client using reqwest and the process-wide request queue.
    pub fn new(credential: Credential, config: ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(
            credential,
            config,
            Arc::new(transport),
            RequestQueue::global(),
        ))
    }

    pub fn with_transport(
        credential: Credential,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        queue: RequestQueue,
    ) -> Self {
        Self {
            credential,
            config: config.clone().with_base_url(&config.base_url),
            transport,
            queue,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn url(&self, path: &str, query: &Query) -> String {
        let mut url = format!("{}{path}", self.config.base_url);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.encode());
        }
        url
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Query,
        body: RequestBody,
    ) -> HttpRequest {
        let mut headers = vec![
            ("authorization".to_string(), self.credential.basic_auth_header()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        if let RequestBody::Json(_) = body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: self.url(path, query),
            headers,
            body,
        }
    }

    pub fn build_json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let json =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.build_request(method, path, &Query::new(), RequestBody::Json(json)))
    }

    /// Run `request` in its queue slot, retrying transient failures.
    pub async fn execute(&self, request: HttpRequest) -> Result<Payload, ApiError> {
        self.queue.run(|| self.execute_with_retry(&request)).await
    }

    async fn execute_with_retry(&self, request: &HttpRequest) -> Result<Payload, ApiError> {
        let policy = &self.config.retry;
        let mut attempt = 0;
        loop {
            let retries_left = attempt < policy.max_retries;
            debug!(attempt = attempt + 1, method = %request.method, url = %request.url, "sending request");

            let result = self.transport.send(request).await;
            match ResponseOutcome::classify(result, retries_left) {
                ResponseOutcome::Success(payload) => return Ok(payload),
                ResponseOutcome::Terminal(err) => {
                    debug!(attempt = attempt + 1, url = %request.url, error = %err, "request failed");
                    return Err(err);
                }
                ResponseOutcome::Retryable(response) => {
                    let delay = policy.delay(attempt, Some(&response));
                    warn!(
                        attempt = attempt + 1,
                        status = response.status,
                        delay_ms = delay.as_millis() as u64,
                        url = %request.url,
                        "retryable status, backing off"
                    );
                    sleep(delay).await;
                }
                ResponseOutcome::Network(err) if retries_left => {
                    let delay = policy.delay(attempt, None);
                    warn!(
                        attempt = attempt + 1,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        url = %request.url,
                        "network error, backing off"
                    );
                    sleep(delay).await;
                }
                ResponseOutcome::Network(err) => {
                    return Err(ApiError::Network {
                        message: err.message,
                    });
                }
            }
            attempt += 1;
        }
    }

    /// Execute and decode the payload into `R`.
    pub async fn send<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        self.execute(request).await?.decode()
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<R, ApiError> {
        let request = self.build_request(HttpMethod::Get, path, query, RequestBody::Empty);
        self.send(request).await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_json(HttpMethod::Post, path, body)?;
        self.send(request).await
    }

    /// Execute a DELETE, ignoring any response body.
    pub async fn delete(&self, request: HttpRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    /// Single authenticated attempt: no queue slot, no retries.
    pub async fn upload(&self, request: HttpRequest) -> Result<(), ApiError> {
        debug!(url = %request.url, "uploading attachment");
        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| ApiError::Network { message: e.message })?;
        if response.is_success() {
            return Ok(());
        }
        Err(ApiError::Upload(format!(
            "{} {}",
            response.status, response.status_text
        )))
    }
}

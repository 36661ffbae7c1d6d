//! Lazily built, process-lifetime client.
//!
//! A `Session` remembers an explicitly set API key and builds the
//! `MochiClient` on first use. Setting a new key drops the cached client so the
//! next call picks the key up. Without an explicit key the environment
//! variable `MOCHI_API_KEY` is consulted at build time.

use std::sync::Arc;

use tracing::debug;

use crate::client::{ClientConfig, MochiClient};
use crate::credential::{Credential, API_KEY_ENV};
use crate::error::ApiError;
use crate::queue::RequestQueue;
use crate::transport::{ReqwestTransport, Transport};

pub struct Session {
    api_key: Option<String>,
    env_var: String,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    queue: RequestQueue,
    client: Option<Arc<MochiClient>>,
}

impl Session {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api_key: None,
            env_var: API_KEY_ENV.to_string(),
            config,
            transport: None,
            queue: RequestQueue::global(),
            client: None,
        }
    }

    /// Use `transport` and `queue` instead of reqwest and the global queue.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>, queue: RequestQueue) -> Self {
        self.transport = Some(transport);
        self.queue = queue;
        self.client = None;
        self
    }

    /// Read the fallback key from `name` instead of `MOCHI_API_KEY`.
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self.client = None;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Remember `key` and invalidate the cached client.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.api_key = Some(key.into());
        self.client = None;
    }

    /// Forget the explicit key and the cached client.
    pub fn reset(&mut self) {
        self.api_key = None;
        self.client = None;
    }

    /// The cached client, building it on first use.
    pub fn client(&mut self) -> Result<Arc<MochiClient>, ApiError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }

        let credential =
            Credential::resolve(self.api_key.as_deref(), std::env::var(&self.env_var).ok())?;
        let transport: Arc<dyn Transport> = match &self.transport {
            Some(transport) => transport.clone(),
            None => Arc::new(ReqwestTransport::new()?),
        };
        debug!(base_url = %self.config.base_url, "building client");

        let client = Arc::new(MochiClient::with_transport(
            credential,
            self.config.clone(),
            transport,
            self.queue.clone(),
        ));
        self.client = Some(client.clone());
        Ok(client)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ClientConfig::from_env())
    }
}

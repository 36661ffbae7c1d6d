//! API key handling.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;

/// Environment variable consulted when no key is given explicitly.
pub const API_KEY_ENV: &str = "MOCHI_API_KEY";

const MISSING_KEY: &str =
    "API key is required. Set MOCHI_API_KEY environment variable or provide --api-key option.";

/// An API key. The value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Rejects empty and whitespace-only keys.
    pub fn new(key: impl Into<String>) -> Result<Self, ApiError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ApiError::Config("API key is required".to_string()));
        }
        Ok(Self(key))
    }

    /// Pick the explicit key if it is non-empty, otherwise the environment
    /// value. Fails with a configuration error when neither is usable.
    pub fn resolve(explicit: Option<&str>, env: Option<String>) -> Result<Self, ApiError> {
        let key = explicit
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| env.filter(|key| !key.is_empty()))
            .ok_or_else(|| ApiError::Config(MISSING_KEY.to_string()))?;
        Self::new(key)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Basic base64(key:)`. The key is the username; the password is empty.
    pub fn basic_auth_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.0)))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

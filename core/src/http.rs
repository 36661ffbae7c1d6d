//! HTTP transport types.
//!
//! # Design
//! Requests and responses are plain data. `MochiClient` builds `HttpRequest`
//! values with the URL, auth and content headers already resolved, and a
//! `Transport` turns them into `HttpResponse` values. Keeping the exchange as
//! data lets the retry loop and the tests work without a socket.

use std::fmt;

/// HTTP method for a request. The API only uses these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file sent as one part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    /// Serialized JSON document.
    Json(String),
    /// The transport chooses the boundary and sets its own content type.
    Multipart(FilePart),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including the encoded query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty when unknown.
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Header lookup, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Query parameters for list endpoints.
///
/// Keys keep insertion order. `None` and empty values are never stored, so an
/// unset filter does not reach the wire as `?deck-id=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an earlier value. Empty values remove the key.
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.retain(|(k, _)| k != key);
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    /// Like `set`, but `None` removes the key.
    pub fn set_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self.remove(key),
        }
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.pairs.retain(|(k, _)| k != key);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` rendering, without the leading `?`.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Percent-encode one path segment such as an entity id or file name.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_drops_missing_and_empty_values() {
        let query = Query::new()
            .set("deck-id", "abc")
            .set_opt::<u32>("limit", None)
            .set("bookmark", "");
        assert_eq!(query.encode(), "deck-id=abc");
    }

    #[test]
    fn query_set_replaces_existing_key() {
        let query = Query::new().set("bookmark", "b1").set("bookmark", "b2");
        assert_eq!(query.get("bookmark"), Some("b2"));
        assert_eq!(query.encode(), "bookmark=b2");
    }

    #[test]
    fn query_encodes_reserved_characters() {
        let query = Query::new().set("date", "2026-01-15T00:00:00.000Z");
        assert_eq!(query.encode(), "date=2026-01-15T00%3A00%3A00.000Z");
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(encode_segment("my file.png"), "my%20file.png");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
        assert_eq!(encode_segment("abc123"), "abc123");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 429,
            status_text: "Too Many Requests".to_string(),
            headers: vec![("Retry-After".to_string(), "2".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("retry-after"), Some("2"));
        assert_eq!(response.header("content-type"), None);
        assert!(!response.is_success());
    }
}

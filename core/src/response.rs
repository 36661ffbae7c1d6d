//! Classification of a single attempt.
//!
//! `ResponseOutcome::classify` turns the result of one `Transport::send` into
//! the executor's next step. A retryable status only counts as retryable while
//! attempts remain; on the last attempt it is processed like any other
//! response so the caller sees the server's real answer.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::retry::RetryPolicy;
use crate::transport::TransportError;

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 204, or an explicit `Content-Length: 0`.
    Empty,
    /// JSON body. A body that failed to parse is `Value::Null`.
    Json(Value),
    /// Any non-JSON content type.
    Text(String),
}

impl Payload {
    pub fn into_value(self) -> Value {
        match self {
            Payload::Empty => Value::Null,
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
        }
    }

    /// Decode into the caller's type. `Empty` decodes as JSON `null`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.into_value())
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

#[derive(Debug)]
pub enum ResponseOutcome {
    Success(Payload),
    Retryable(HttpResponse),
    Terminal(ApiError),
    Network(TransportError),
}

impl ResponseOutcome {
    pub fn classify(
        result: Result<HttpResponse, TransportError>,
        retries_left: bool,
    ) -> ResponseOutcome {
        let response = match result {
            Ok(response) => response,
            Err(err) => return ResponseOutcome::Network(err),
        };

        if retries_left && RetryPolicy::is_retryable_status(response.status) {
            return ResponseOutcome::Retryable(response);
        }

        if is_empty_body(&response) {
            return ResponseOutcome::Success(Payload::Empty);
        }

        let payload = read_payload(&response);
        if response.is_success() {
            ResponseOutcome::Success(payload)
        } else {
            ResponseOutcome::Terminal(terminal_error(&response, payload))
        }
    }
}

/// 204, or an explicit `Content-Length: 0`, whatever the status.
fn is_empty_body(response: &HttpResponse) -> bool {
    response.status == 204 || response.header("content-length").map(str::trim) == Some("0")
}

/// Interpret the body according to the status and declared content type.
pub fn read_payload(response: &HttpResponse) -> Payload {
    if is_empty_body(response) {
        return Payload::Empty;
    }

    let content_type = response.header("content-type").unwrap_or_default();
    if content_type.contains("application/json") {
        Payload::Json(serde_json::from_str(&response.body).unwrap_or(Value::Null))
    } else {
        Payload::Text(response.body.clone())
    }
}

fn terminal_error(response: &HttpResponse, payload: Payload) -> ApiError {
    let errors = match payload {
        Payload::Json(Value::Object(mut body)) => body.remove("errors").filter(|e| !e.is_null()),
        _ => None,
    };

    let message = match &errors {
        Some(errors) => error_message(errors),
        None => format!("HTTP {}: {}", response.status, response.status_text),
    };
    let message = if message.is_empty() {
        format!("Request failed with status {}", response.status)
    } else {
        message
    };

    ApiError::Api {
        status: response.status,
        message,
        errors,
    }
}

/// Human-readable rendering of an `errors` payload: a string verbatim, an
/// array joined with `, `, a mapping as `key: value` pairs joined with `, `.
pub fn error_message(errors: &Value) -> String {
    match errors {
        Value::String(message) => message.clone(),
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(", "),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| format!("{key}: {}", plain(value)))
            .collect::<Vec<_>>()
            .join(", "),
        other => plain(other),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
        let mut headers = Vec::new();
        if let Some(content_type) = content_type {
            headers.push(("content-type".to_string(), content_type.to_string()));
        }
        HttpResponse {
            status,
            status_text: match status {
                200 => "OK",
                204 => "No Content",
                404 => "Not Found",
                422 => "Unprocessable Entity",
                503 => "Service Unavailable",
                _ => "",
            }
            .to_string(),
            headers,
            body: body.to_string(),
        }
    }

    fn terminal(outcome: ResponseOutcome) -> ApiError {
        match outcome {
            ResponseOutcome::Terminal(err) => err,
            other => panic!("expected terminal outcome, got {other:?}"),
        }
    }

    #[test]
    fn no_content_is_empty() {
        let outcome = ResponseOutcome::classify(Ok(response(204, None, "")), true);
        assert!(matches!(outcome, ResponseOutcome::Success(Payload::Empty)));
    }

    #[test]
    fn zero_content_length_is_empty() {
        let mut resp = response(200, Some("application/json"), "");
        resp.headers.push(("Content-Length".to_string(), "0".to_string()));
        assert_eq!(read_payload(&resp), Payload::Empty);
    }

    #[test]
    fn zero_length_error_response_is_empty_success() {
        let mut resp = response(404, None, "");
        resp.headers.push(("content-length".to_string(), "0".to_string()));
        let outcome = ResponseOutcome::classify(Ok(resp), true);
        assert!(matches!(outcome, ResponseOutcome::Success(Payload::Empty)));
    }

    #[test]
    fn zero_length_retryable_status_still_retries_while_attempts_remain() {
        let mut resp = response(503, None, "");
        resp.headers.push(("content-length".to_string(), "0".to_string()));
        let outcome = ResponseOutcome::classify(Ok(resp.clone()), true);
        assert!(matches!(outcome, ResponseOutcome::Retryable(_)));

        let outcome = ResponseOutcome::classify(Ok(resp), false);
        assert!(matches!(outcome, ResponseOutcome::Success(Payload::Empty)));
    }

    #[test]
    fn malformed_json_is_null() {
        let resp = response(200, Some("application/json; charset=utf-8"), "{not json");
        assert_eq!(read_payload(&resp), Payload::Json(Value::Null));
    }

    #[test]
    fn non_json_is_text() {
        let resp = response(200, Some("text/plain"), "hello");
        assert_eq!(read_payload(&resp), Payload::Text("hello".to_string()));
    }

    #[test]
    fn retryable_status_with_attempts_left() {
        let outcome = ResponseOutcome::classify(Ok(response(503, None, "")), true);
        assert!(matches!(outcome, ResponseOutcome::Retryable(r) if r.status == 503));
    }

    #[test]
    fn retryable_status_on_last_attempt_is_processed_normally() {
        let body = r#"{"errors":"overloaded"}"#;
        let outcome =
            ResponseOutcome::classify(Ok(response(503, Some("application/json"), body)), false);
        let err = terminal(outcome);
        assert!(matches!(err, ApiError::Api { status: 503, ref message, .. } if message == "overloaded"));
    }

    #[test]
    fn transport_failure_is_network_outcome() {
        let outcome = ResponseOutcome::classify(Err(TransportError::new("refused")), true);
        assert!(matches!(outcome, ResponseOutcome::Network(_)));
    }

    #[test]
    fn mapping_errors_render_as_pairs() {
        let body = r#"{"errors":{"deck-id":"required"}}"#;
        let outcome =
            ResponseOutcome::classify(Ok(response(422, Some("application/json"), body)), true);
        match terminal(outcome) {
            ApiError::Api {
                status,
                message,
                errors,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "deck-id: required");
                assert_eq!(errors, Some(json!({"deck-id": "required"})));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn array_errors_are_joined() {
        assert_eq!(error_message(&json!(["a is bad", "b is bad"])), "a is bad, b is bad");
        assert_eq!(
            error_message(&json!({"name": "required", "sort": "must be a number"})),
            "name: required, sort: must be a number"
        );
    }

    #[test]
    fn missing_errors_fall_back_to_status_line() {
        let outcome = ResponseOutcome::classify(Ok(response(404, Some("text/html"), "<h1>")), true);
        match terminal(outcome) {
            ApiError::Api { message, errors, .. } => {
                assert_eq!(message, "HTTP 404: Not Found");
                assert!(errors.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_errors_fall_back_to_generic_message() {
        let outcome =
            ResponseOutcome::classify(Ok(response(400, Some("application/json"), r#"{"errors":[]}"#)), true);
        match terminal(outcome) {
            ApiError::Api { message, .. } => assert_eq!(message, "Request failed with status 400"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_payload_decodes_as_unit_and_option() {
        Payload::Empty.decode::<()>().unwrap();
        assert_eq!(Payload::Empty.decode::<Option<String>>().unwrap(), None);
    }
}

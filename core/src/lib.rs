//! Async client core for the Mochi flashcard API.
//!
//! # Overview
//! Builds authenticated `HttpRequest` values, runs them through a shared FIFO
//! queue and a retry loop, and decodes the results into typed records. The
//! network round-trip sits behind the `Transport` trait, so everything above
//! it runs the same against reqwest, the mock server, or a scripted test
//! double.
//!
//! # Design
//! - `MochiClient` owns the credential, configuration, transport and queue
//!   handle. Resource clients (`cards()`, `decks()`, `templates()`, `due()`)
//!   borrow it and split each operation into `build_*` and an async call.
//! - Every generic request waits for its turn in `RequestQueue`; retries and
//!   backoff sleeps happen inside that turn.
//! - List endpoints are also exposed as lazy `Stream`s following the server's
//!   bookmarks.
//! - `Session` builds the client on first use and rebuilds it when the API key
//!   changes.

pub mod client;
pub mod credential;
pub mod error;
pub mod http;
pub mod pagination;
pub mod queue;
pub mod resources;
pub mod response;
pub mod retry;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{ClientConfig, MochiClient};
pub use credential::Credential;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Query};
pub use queue::RequestQueue;
pub use response::Payload;
pub use retry::RetryPolicy;
pub use session::Session;
pub use transport::{ReqwestTransport, Transport, TransportError};

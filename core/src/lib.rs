//! Synchronous client core for Firebase-style JSON tree REST APIs.
//!
//! # Overview
//! Maps get/put/post/patch/delete calls onto hierarchical `.json` resource
//! URLs. Caller-supplied data fields and raw JSON fragments are merged into a
//! single JSON body, the URL is composed from a base URL, a relative path and
//! query parameters, and each HTTP response is classified into a per-verb
//! success verdict.
//!
//! # Design
//! - `FirebaseClient` is immutable: it holds only the base URL and token.
//! - Each call takes its own `Request`, so there is no shared mutable state.
//!   `Firebase` wraps the same pipeline in a fluent handle that drains its
//!   pending request on every verb call.
//! - The network sits behind the `Transport` trait (host-does-IO). A blocking
//!   `ureq` implementation ships behind the default `ureq` feature.
//! - Malformed JSON degrades to an empty object and is reported through
//!   `tracing`, never as an error.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod merge;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;

pub use client::FirebaseClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::Request;
pub use response::FirebaseResponse;
pub use session::Firebase;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;

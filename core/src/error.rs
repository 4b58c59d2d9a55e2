//! Error types for the JSON tree client.
//!
//! # Design
//! A non-2xx status is not an error here: the API reports outcomes through
//! `FirebaseResponse::success`, so callers must check that flag even on `Ok`.
//! `ApiError` is reserved for failures that prevent a request from being
//! built or an exchange from completing. Malformed JSON never lands here;
//! it degrades to an empty object (see `merge`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL was empty or whitespace-only.
    #[error("base URL cannot be null or empty; was: '{0}'")]
    BaseUrlError(String),

    /// A query parameter value was not valid in the request encoding (UTF-8).
    #[error("query parameter '{name}' could not be encoded: {reason}")]
    EncodingError { name: String, reason: String },

    /// The transport failed below the HTTP response layer.
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// A typed data value could not be converted to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized into the requested type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

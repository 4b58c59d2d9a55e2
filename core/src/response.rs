//! Response classification.
//!
//! # Design
//! Success is decided per verb from a fixed lookup table rather than from
//! general HTTP rules: the JSON tree API answers a successful DELETE with
//! `204` and every other successful call with `200`. Any status outside the
//! table is reported as `success == false`, never as an error.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse};
use crate::merge;

/// Status code that marks each verb's call as successful.
const SUCCESS_STATUS: [(HttpMethod, u16); 5] = [
    (HttpMethod::Delete, 204),
    (HttpMethod::Get, 200),
    (HttpMethod::Put, 200),
    (HttpMethod::Post, 200),
    (HttpMethod::Patch, 200),
];

pub fn is_success(method: HttpMethod, status: u16) -> bool {
    SUCCESS_STATUS
        .iter()
        .any(|&(m, code)| m == method && code == status)
}

/// Normalized outcome of one completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct FirebaseResponse {
    success: bool,
    code: u16,
    raw_body: String,
    body: Map<String, Value>,
    url: String,
}

impl FirebaseResponse {
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// Trimmed response text; empty when the server sent nothing.
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Best-effort parse of the body. Empty when the body was blank, malformed
    /// or not a JSON object.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// The resolved request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Decode the raw body into `T`.
    ///
    /// Unlike [`body`](Self::body) this is strict: it works for any JSON
    /// shape, including arrays and scalars, and reports malformed input.
    pub fn deserialize_body<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.raw_body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

impl fmt::Display for FirebaseResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FirebaseResponse(success={}, code={}, raw_body={}, url={}, body={})",
            self.success,
            self.code,
            self.raw_body,
            self.url,
            Value::Object(self.body.clone())
        )
    }
}

/// Turn a raw response into a `FirebaseResponse` for `method`.
pub fn classify(method: HttpMethod, response: &HttpResponse, url: &str) -> FirebaseResponse {
    let success = is_success(method, response.status);
    let raw_body = response.body.trim().to_string();
    let body = if raw_body.is_empty() {
        Map::new()
    } else {
        merge::parse_object(&raw_body)
    };

    debug!(%method, status = response.status, success, "classified response");

    FirebaseResponse {
        success,
        code: response.status,
        raw_body,
        body,
        url: url.to_string(),
    }
}

//! Request building and dispatch for the JSON tree REST API.
//!
//! # Design
//! `FirebaseClient` holds only the normalized base URL and the optional secure
//! token; it never changes after construction and can be shared freely.
//! Every call takes its own [`Request`], so the client carries no mutable
//! state between calls. `build` turns a `Request` into an `HttpRequest`,
//! `parse` classifies the matching `HttpResponse`, and `send` runs both around
//! a [`Transport`].

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::{encode_query_value, Request};
use crate::response::{self, FirebaseResponse};
use crate::transport::Transport;

/// Suffix the API requires on every resource path.
pub const JSON_EXTENSION: &str = ".json";

/// Query parameter carrying the secure token.
pub const AUTH_PARAM: &str = "auth";

const REDACTED: &str = "<redacted>";

#[derive(Clone)]
pub struct FirebaseClient {
    base_url: String,
    auth: Option<String>,
}

impl FirebaseClient {
    /// Create a client for `base_url`. The URL is trimmed and normalized to
    /// end with exactly one `/`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::build_client(base_url, None)
    }

    /// Create a client whose requests all carry `auth=<token>`.
    pub fn with_auth(base_url: &str, token: &str) -> Result<Self, ApiError> {
        Self::build_client(base_url, Some(token.to_string()))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::build_client(&config.base_url, config.auth.clone())
    }

    fn build_client(base_url: &str, auth: Option<String>) -> Result<Self, ApiError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ApiError::BaseUrlError(base_url.to_string()));
        }
        let base_url = format!("{}/", trimmed.trim_end_matches('/'));
        debug!(base_url = %base_url, auth = auth.is_some(), "initialized client");
        Ok(Self { base_url, auth })
    }

    /// The normalized base URL, always ending with `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Compose the full URL for `path` and the query parameters of `request`.
    ///
    /// An empty path addresses the base node itself:
    /// `http://host/team/` becomes `http://host/team.json?`. Otherwise one
    /// leading `/` is dropped from `path` and the rest is appended to the base
    /// URL, so `"/"` on `http://host/` gives `http://host/.json?`. The `?` is
    /// always present, even with no query parameters.
    pub fn resolve_url(&self, path: &str, request: &Request) -> String {
        let url = self.compose(path, request, false);
        debug!(url = %self.compose(path, request, true), path, "built full url");
        url
    }

    fn compose(&self, path: &str, request: &Request, redact: bool) -> String {
        let path = path.trim();
        let target = if path.is_empty() {
            self.base_url.trim_end_matches('/').to_string()
        } else {
            let relative = path.strip_prefix('/').unwrap_or(path);
            format!("{}{}", self.base_url, relative)
        };
        format!("{target}{JSON_EXTENSION}?{}", self.query_string(request, redact))
    }

    /// Query pairs joined as `key=value` with `&`. The token comes first; a
    /// request-level `auth` parameter replaces its value in place. With
    /// `redact`, the value of the `auth` pair is masked.
    fn query_string(&self, request: &Request, redact: bool) -> String {
        let mut query: IndexMap<&str, String> = IndexMap::new();
        if let Some(token) = &self.auth {
            query.insert(AUTH_PARAM, encode_query_value(token));
        }
        for (name, value) in request.query_pairs() {
            query.insert(name, value.to_string());
        }
        if redact {
            if let Some(value) = query.get_mut(AUTH_PARAM) {
                *value = REDACTED.to_string();
            }
        }
        query
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build the HTTP request for `method` on `path`.
    ///
    /// PUT, POST and PATCH carry the merged JSON body of `request`; GET and
    /// DELETE carry none.
    pub fn build(&self, method: HttpMethod, path: &str, request: &Request) -> HttpRequest {
        let url = self.resolve_url(path, request);
        if method.carries_body() {
            HttpRequest {
                method,
                url,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: Some(request.merged_body()),
            }
        } else {
            HttpRequest {
                method,
                url,
                headers: Vec::new(),
                body: None,
            }
        }
    }

    pub fn parse(&self, method: HttpMethod, url: &str, response: &HttpResponse) -> FirebaseResponse {
        response::classify(method, response, url)
    }

    /// Build, dispatch through `transport`, and classify one call.
    ///
    /// `request` is consumed; the only error is a transport failure.
    pub fn send<T: Transport + ?Sized>(
        &self,
        transport: &T,
        method: HttpMethod,
        path: &str,
        request: Request,
    ) -> Result<FirebaseResponse, ApiError> {
        let http_request = self.build(method, path, &request);
        let http_response = transport.execute(&http_request)?;
        Ok(self.parse(method, &http_request.url, &http_response))
    }
}

impl fmt::Debug for FirebaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth.as_ref().map(|_| REDACTED))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn client() -> FirebaseClient {
        FirebaseClient::new("http://localhost").unwrap()
    }

    #[test]
    fn blank_base_url_is_rejected() {
        for url in ["", "   ", "\t\n"] {
            let err = FirebaseClient::new(url).unwrap_err();
            assert!(matches!(err, ApiError::BaseUrlError(_)), "{url:?}");
        }
    }

    #[test]
    fn base_url_gets_exactly_one_trailing_slash() {
        assert_eq!(client().base_url(), "http://localhost/");
        let c = FirebaseClient::new("  http://host/team//  ").unwrap();
        assert_eq!(c.base_url(), "http://host/team/");
    }

    #[test]
    fn resolve_url_uses_all_query_params() {
        let req = Request::new()
            .with_query("query1", "parameter1")
            .with_query("query2", "parameter2");
        assert_eq!(
            client().resolve_url("", &req),
            "http://localhost.json?query1=parameter1&query2=parameter2"
        );
    }

    #[test]
    fn resolve_url_puts_token_first() {
        let c = FirebaseClient::with_auth("http://localhost", "token123").unwrap();
        assert_eq!(
            c.resolve_url("", &Request::new()),
            "http://localhost.json?auth=token123"
        );
        let req = Request::new().with_query("query1", "parameter1");
        assert_eq!(
            c.resolve_url("", &req),
            "http://localhost.json?auth=token123&query1=parameter1"
        );
    }

    #[test]
    fn request_auth_overrides_token_in_place() {
        let c = FirebaseClient::with_auth("http://localhost", "token123").unwrap();
        let req = Request::new()
            .with_query("print", "pretty")
            .with_query("auth", "other");
        assert_eq!(
            c.resolve_url("", &req),
            "http://localhost.json?auth=other&print=pretty"
        );
    }

    #[test]
    fn resolve_url_appends_relative_path() {
        let c = FirebaseClient::with_auth("http://host/team/", "TOKEN").unwrap();
        assert_eq!(
            c.resolve_url("management", &Request::new()),
            "http://host/team/management.json?auth=TOKEN"
        );
        assert_eq!(
            c.resolve_url("/personal/ages", &Request::new()),
            "http://host/team/personal/ages.json?auth=TOKEN"
        );
    }

    #[test]
    fn resolve_url_keeps_trailing_question_mark() {
        assert_eq!(
            client().resolve_url("  ", &Request::new()),
            "http://localhost.json?"
        );
    }

    #[test]
    fn single_slash_addresses_root_of_base() {
        assert_eq!(
            client().resolve_url("/", &Request::new()),
            "http://localhost/.json?"
        );
    }

    #[test]
    fn redaction_masks_only_the_auth_value() {
        let c = FirebaseClient::with_auth("http://localhost/team", "team").unwrap();
        let req = Request::new().with_query("orderBy", "team");
        assert_eq!(
            c.compose("team/members", &req, true),
            "http://localhost/team/team/members.json?auth=<redacted>&orderBy=team"
        );
        assert_eq!(
            c.compose("team/members", &req, false),
            "http://localhost/team/team/members.json?auth=team&orderBy=team"
        );
        assert_eq!(
            client().compose("", &req, true),
            "http://localhost.json?orderBy=team"
        );
    }

    #[test]
    fn build_get_and_delete_have_no_body() {
        let req = Request::new().with_data("ignored", 1);
        for method in [HttpMethod::Get, HttpMethod::Delete] {
            let http = client().build(method, "team", &req);
            assert_eq!(http.method, method);
            assert_eq!(http.url, "http://localhost/team.json?");
            assert!(http.body.is_none());
            assert!(http.headers.is_empty());
        }
    }

    #[test]
    fn build_put_post_patch_carry_merged_body() {
        let req = Request::new()
            .with_raw_json(r#"{"a":1,"b":true}"#)
            .with_data("a", 2);
        for method in [HttpMethod::Put, HttpMethod::Post, HttpMethod::Patch] {
            let http = client().build(method, "", &req);
            assert_eq!(
                http.headers,
                vec![("content-type".to_string(), "application/json".to_string())]
            );
            let body: Value = serde_json::from_str(http.body.as_deref().unwrap()).unwrap();
            assert_eq!(body, json!({"a": 2, "b": true}), "{method}");
        }
    }

    #[test]
    fn build_empty_request_sends_empty_object() {
        let http = client().build(HttpMethod::Put, "", &Request::new());
        assert_eq!(http.body.as_deref(), Some("{}"));
    }

    #[test]
    fn debug_hides_token() {
        let c = FirebaseClient::with_auth("http://localhost", "s3cret").unwrap();
        let printed = format!("{c:?}");
        assert!(printed.contains("http://localhost/"));
        assert!(!printed.contains("s3cret"));
    }

    #[test]
    fn from_config_applies_token() {
        let mut config = ClientConfig::new("http://localhost/team");
        config.auth = Some("token123".to_string());
        let c = FirebaseClient::from_config(&config).unwrap();
        assert!(c.has_auth());
        assert_eq!(
            c.resolve_url("members", &Request::new()),
            "http://localhost/team/members.json?auth=token123"
        );
    }
}

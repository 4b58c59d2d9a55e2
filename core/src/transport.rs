//! The I/O boundary.
//!
//! # Design
//! The core never opens sockets. A `Transport` executes one `HttpRequest` and
//! hands back the `HttpResponse` as data. Every HTTP status, 4xx and 5xx
//! included, is a response; only failures below the HTTP layer (connection
//! refused, timeout, unreadable body) become `ApiError::IoFailure`.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use std::fmt;
    use std::time::Duration;

    use tracing::debug;
    use ureq::typestate::{WithBody, WithoutBody};
    use ureq::{Agent, Body, RequestBuilder};

    use super::Transport;
    use crate::config::ClientConfig;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    type UreqResult = Result<ureq::http::Response<Body>, ureq::Error>;

    /// Blocking transport backed by a `ureq` agent.
    ///
    /// The agent is configured with `http_status_as_error(false)` so error
    /// statuses come back as responses for the classifier to judge.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("UreqTransport").finish_non_exhaustive()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::with_timeout(None)
        }

        pub fn with_timeout(timeout: Option<Duration>) -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent }
        }

        pub fn from_config(config: &ClientConfig) -> Self {
            Self::with_timeout(config.timeout())
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    fn send_without_body(
        mut builder: RequestBuilder<WithoutBody>,
        request: &HttpRequest,
    ) -> UreqResult {
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.call()
    }

    fn send_with_body(mut builder: RequestBuilder<WithBody>, request: &HttpRequest) -> UreqResult {
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        match &request.body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            debug!(method = %request.method, "sending request");

            let url = request.url.as_str();
            let result = match request.method {
                HttpMethod::Get => send_without_body(self.agent.get(url), request),
                HttpMethod::Delete => send_without_body(self.agent.delete(url), request),
                HttpMethod::Put => send_with_body(self.agent.put(url), request),
                HttpMethod::Post => send_with_body(self.agent.post(url), request),
                HttpMethod::Patch => send_with_body(self.agent.patch(url), request),
            };
            let mut response = result.map_err(|e| ApiError::IoFailure(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            // No size cap: ureq defaults to 10 MiB.
            let body = response
                .body_mut()
                .with_config()
                .limit(u64::MAX)
                .read_to_string()
                .map_err(|e| ApiError::IoFailure(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

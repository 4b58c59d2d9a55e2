//! Fluent, stateful handle over a `FirebaseClient` and a `Transport`.
//!
//! # Design
//! `Firebase` accumulates one pending [`Request`] through chained `add_*`
//! calls, and each verb method drains it. The pending request is taken out
//! before dispatch, so it is empty afterwards whether the call succeeded,
//! returned a failure status, or hit a transport error. Verb methods borrow
//! the handle mutably, so one handle serves one call at a time; for
//! concurrent use, share a `FirebaseClient` and build a `Request` per call.

use serde::Serialize;
use serde_json::Value;

use crate::client::FirebaseClient;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::request::Request;
use crate::response::FirebaseResponse;
use crate::transport::Transport;

#[derive(Debug)]
pub struct Firebase<T> {
    client: FirebaseClient,
    transport: T,
    pending: Request,
}

#[cfg(feature = "ureq")]
impl Firebase<crate::transport::UreqTransport> {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = FirebaseClient::new(base_url)?;
        Ok(Self::with_transport(client, Default::default()))
    }

    pub fn with_auth(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let client = FirebaseClient::with_auth(base_url, token)?;
        Ok(Self::with_transport(client, Default::default()))
    }

    pub fn from_config(config: &crate::config::ClientConfig) -> Result<Self, ApiError> {
        let client = FirebaseClient::from_config(config)?;
        let transport = crate::transport::UreqTransport::from_config(config);
        Ok(Self::with_transport(client, transport))
    }
}

impl<T: Transport> Firebase<T> {
    pub fn with_transport(client: FirebaseClient, transport: T) -> Self {
        Self {
            client,
            transport,
            pending: Request::new(),
        }
    }

    pub fn client(&self) -> &FirebaseClient {
        &self.client
    }

    /// State accumulated since the last verb call.
    pub fn pending(&self) -> &Request {
        &self.pending
    }

    pub fn add_query(&mut self, name: impl Into<String>, value: &str) -> &mut Self {
        self.pending.add_query(name, value);
        self
    }

    pub fn try_add_query(
        &mut self,
        name: impl Into<String>,
        value: &[u8],
    ) -> Result<&mut Self, ApiError> {
        self.pending.try_add_query(name, value)?;
        Ok(self)
    }

    pub fn add_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.pending.add_data(key, value);
        self
    }

    pub fn add_serialized<S: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &S,
    ) -> Result<&mut Self, ApiError> {
        self.pending.add_serialized(key, value)?;
        Ok(self)
    }

    pub fn add_raw_json(&mut self, text: &str) -> &mut Self {
        self.pending.add_raw_json(text);
        self
    }

    /// Read the node at `path` (empty for the base node).
    pub fn get(&mut self, path: &str) -> Result<FirebaseResponse, ApiError> {
        self.dispatch(HttpMethod::Get, path)
    }

    /// Create or overwrite the node at `path` with the pending data.
    pub fn put(&mut self, path: &str) -> Result<FirebaseResponse, ApiError> {
        self.dispatch(HttpMethod::Put, path)
    }

    /// Push the pending data under a server-generated child key of `path`.
    /// Every call inserts a new child, even for identical data.
    pub fn post(&mut self, path: &str) -> Result<FirebaseResponse, ApiError> {
        self.dispatch(HttpMethod::Post, path)
    }

    /// Update only the children named in the pending data.
    pub fn patch(&mut self, path: &str) -> Result<FirebaseResponse, ApiError> {
        self.dispatch(HttpMethod::Patch, path)
    }

    pub fn delete(&mut self, path: &str) -> Result<FirebaseResponse, ApiError> {
        self.dispatch(HttpMethod::Delete, path)
    }

    fn dispatch(&mut self, method: HttpMethod, path: &str) -> Result<FirebaseResponse, ApiError> {
        let request = std::mem::take(&mut self.pending);
        self.client.send(&self.transport, method, path, request)
    }
}

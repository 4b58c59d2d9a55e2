//! Per-request configuration: query parameters, data fields and raw JSON.
//!
//! # Design
//! A `Request` is an owned value handed to a single terminal call, so two
//! in-flight requests never share accumulation state. It can be built in two
//! styles:
//! - by value, chaining `with_*` methods on a fresh `Request`;
//! - in place, through the `add_*` methods taking `&mut self` (this is what
//!   the fluent `session::Firebase` handle uses).
//!
//! Query parameters keep insertion order; re-adding a name replaces its value
//! in place.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::merge;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    query: IndexMap<String, String>,
    data: Map<String, Value>,
    raw_json: String,
}

/// Form-encode a query value (UTF-8, space as `+`).
pub(crate) fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL-encode `value` and store it under `name`.
    pub fn add_query(&mut self, name: impl Into<String>, value: &str) -> &mut Self {
        self.query.insert(name.into(), encode_query_value(value));
        self
    }

    /// Like [`add_query`](Self::add_query) for raw bytes. Fails with
    /// `EncodingError` when `value` is not valid UTF-8, leaving the request
    /// unchanged.
    pub fn try_add_query(
        &mut self,
        name: impl Into<String>,
        value: &[u8],
    ) -> Result<&mut Self, ApiError> {
        let name = name.into();
        let value = std::str::from_utf8(value).map_err(|e| ApiError::EncodingError {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(self.add_query(name, value))
    }

    pub fn add_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Store any serializable value as a data field.
    pub fn add_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, ApiError> {
        let value =
            serde_json::to_value(value).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.add_data(key, value))
    }

    /// Append a raw JSON fragment. Not validated until the body is merged.
    pub fn add_raw_json(&mut self, text: &str) -> &mut Self {
        self.raw_json.push_str(text);
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: &str) -> Self {
        self.add_query(name, value);
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_data(key, value);
        self
    }

    pub fn with_raw_json(mut self, text: &str) -> Self {
        self.add_raw_json(text);
        self
    }

    /// Encoded query parameters in insertion order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn raw_json(&self) -> &str {
        &self.raw_json
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.data.is_empty() && self.raw_json.is_empty()
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.data.clear();
        self.raw_json.clear();
    }

    /// The JSON entity for body-carrying verbs: raw fragments overlaid with
    /// data fields.
    pub fn merged_body(&self) -> String {
        merge::merge_to_string(&self.raw_json, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_values_are_form_encoded() {
        let req = Request::new()
            .with_query("orderBy", "\"$key\"")
            .with_query("q", "a b&c=d/é");
        let pairs: Vec<_> = req.query_pairs().collect();
        assert_eq!(
            pairs,
            vec![("orderBy", "%22%24key%22"), ("q", "a+b%26c%3Dd%2F%C3%A9")]
        );
    }

    #[test]
    fn query_keeps_insertion_order_and_last_write() {
        let req = Request::new()
            .with_query("b", "1")
            .with_query("a", "2")
            .with_query("b", "3");
        let pairs: Vec<_> = req.query_pairs().collect();
        assert_eq!(pairs, vec![("b", "3"), ("a", "2")]);
    }

    #[test]
    fn invalid_utf8_query_is_an_encoding_error() {
        let mut req = Request::new().with_query("kept", "yes");
        let err = req.try_add_query("bad", &[0x66, 0xff, 0x6f]).unwrap_err();
        assert!(matches!(err, ApiError::EncodingError { ref name, .. } if name == "bad"));
        let pairs: Vec<_> = req.query_pairs().collect();
        assert_eq!(pairs, vec![("kept", "yes")]);
    }

    #[test]
    fn valid_utf8_bytes_are_accepted() {
        let mut req = Request::new();
        req.try_add_query("limitToFirst", b"10").unwrap();
        assert_eq!(req.query_pairs().next(), Some(("limitToFirst", "10")));
    }

    #[test]
    fn data_overwrites_previous_value() {
        let req = Request::new().with_data("a", 1).with_data("a", "two");
        assert_eq!(req.data()["a"], json!("two"));
        assert_eq!(req.data().len(), 1);
    }

    #[test]
    fn serialized_data_is_stored_as_json() {
        #[derive(Serialize)]
        struct Member {
            name: &'static str,
            age: u32,
        }
        let mut req = Request::new();
        req.add_serialized("director", &Member { name: "Joshua", age: 41 })
            .unwrap();
        assert_eq!(req.data()["director"], json!({"name": "Joshua", "age": 41}));
    }

    #[test]
    fn raw_fragments_are_concatenated() {
        let req = Request::new()
            .with_raw_json(r#"{"a":"#)
            .with_raw_json(r#"1}"#);
        assert_eq!(req.raw_json(), r#"{"a":1}"#);
        assert_eq!(req.merged_body(), r#"{"a":1}"#);
    }

    #[test]
    fn merged_body_prefers_data_fields() {
        let req = Request::new()
            .with_raw_json(r#"{"a":1,"b":1}"#)
            .with_data("a", 2);
        let body: Value = serde_json::from_str(&req.merged_body()).unwrap();
        assert_eq!(body, json!({"a": 2, "b": 1}));
    }

    #[test]
    fn clear_empties_everything() {
        let mut req = Request::new()
            .with_query("q", "1")
            .with_data("d", true)
            .with_raw_json("{}");
        assert!(!req.is_empty());
        req.clear();
        assert!(req.is_empty());
        assert_eq!(req, Request::default());
        assert_eq!(req.merged_body(), "{}");
    }
}

//! Client configuration.
//!
//! `ClientConfig` is plain data so it can be embedded in whatever
//! configuration source the host application already uses; the library itself
//! never reads files or environment variables.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the JSON tree, e.g. `https://example.firebaseio.com/team`.
    pub base_url: String,

    /// Secure token attached to every request as the `auth` query parameter.
    #[serde(default)]
    pub auth: Option<String>,

    /// Overall timeout for one HTTP exchange. No timeout when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: None,
            timeout_secs: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_to_none() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("http://localhost"));
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn all_fields_deserialize() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"base_url":"http://localhost/team","auth":"token123","timeout_secs":5}"#,
        )
        .unwrap();
        assert_eq!(config.auth.as_deref(), Some("token123"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }
}

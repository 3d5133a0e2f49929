//! Configuration types for the engine client.

use std::time::Duration;

/// Default engine URL.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:7700";

/// Connection settings for the search engine.
///
/// Built once at startup and never changed afterwards.
#[derive(Clone)]
pub struct EngineConfig {
    /// Base URL of the engine (e.g. "http://localhost:7700").
    pub url: String,
    /// Key sent as a bearer token. No `Authorization` header when `None`.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    /// Create a config for the given URL with default timeout and no key.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// The key must never end up in logs.
impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

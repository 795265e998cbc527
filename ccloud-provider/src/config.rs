//! Provider configuration.

use std::fmt;
use std::time::Duration;

/// Default control-plane endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.confluent.cloud";

/// How often cluster provisioning status is polled.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// User agent sent with every request.
pub fn default_user_agent() -> String {
    format!("ccloud-provider/{}", env!("CARGO_PKG_VERSION"))
}

/// Provider-level settings shared by every reconciler.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL for the org, iam, mds and cmk APIs.
    pub endpoint: String,
    /// Organization-scoped API key.
    pub api_key: String,
    /// Organization-scoped API secret.
    pub api_secret: String,
    pub user_agent: String,
    pub poll_interval: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            user_agent: default_user_agent(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

//! Per-family request authentication.
//!
//! Each backend subsystem authenticates with its own basic-auth slot. A
//! context carrying credentials for one family does not authenticate calls
//! made through another family's client.

use std::collections::BTreeMap;
use std::fmt;

/// Backend subsystem an API client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiFamily {
    /// Cluster metadata (`/cmk/v2`).
    Cmk,
    /// Identity (`/iam/v2`).
    Iam,
    /// Metadata server (role bindings).
    Mds,
    /// Organization (`/org/v2`).
    Org,
    /// Kafka REST proxy (`/kafka/v3`), authenticated per cluster.
    KafkaRest,
}

impl ApiFamily {
    pub const ALL: [ApiFamily; 5] = [
        ApiFamily::Cmk,
        ApiFamily::Iam,
        ApiFamily::Mds,
        ApiFamily::Org,
        ApiFamily::KafkaRest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiFamily::Cmk => "cmk",
            ApiFamily::Iam => "iam",
            ApiFamily::Mds => "mds",
            ApiFamily::Org => "org",
            ApiFamily::KafkaRest => "kafka-rest",
        }
    }
}

impl fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic-auth credentials attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Request context passed to every API call.
///
/// Holds at most one [`BasicAuth`] per [`ApiFamily`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiContext {
    basic_auth: BTreeMap<ApiFamily, BasicAuth>,
}

impl ApiContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this context with `auth` stored in `family`'s slot.
    pub fn with_basic_auth(mut self, family: ApiFamily, auth: BasicAuth) -> Self {
        self.basic_auth.insert(family, auth);
        self
    }

    /// Credentials for `family`, if any.
    pub fn basic_auth(&self, family: ApiFamily) -> Option<&BasicAuth> {
        self.basic_auth.get(&family)
    }
}

//! Credential context builder.
//!
//! Turns a (key, secret) pair into an [`ApiContext`] that authenticates one
//! API family. Missing credentials are not an error here: the call proceeds
//! unauthenticated and the remote answers with its own auth failure.

use std::fmt;

use ccloud_sdk::{ApiContext, ApiFamily, BasicAuth};
use tracing::warn;

/// An API key/secret pair, either organization- or cluster-scoped.
#[derive(Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// True when both halves are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty()
    }

    /// Basic auth for these credentials, if complete.
    pub fn basic_auth(&self) -> Option<BasicAuth> {
        self.is_complete()
            .then(|| BasicAuth::new(self.key.clone(), self.secret.clone()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Derive a context authenticating `family` with `credentials`.
///
/// Returns `ctx` unchanged, after logging a warning, when either half of the
/// pair is empty.
pub fn api_context(family: ApiFamily, credentials: &Credentials, ctx: ApiContext) -> ApiContext {
    with_credentials(family, credentials, ctx).unwrap_or_else(|ctx| {
        warn!(family = %family, "Could not find credentials for Confluent Cloud");
        ctx
    })
}

/// Fill `family`'s slot of `ctx`, or hand `ctx` back untouched when either
/// half of the pair is empty. Callers choose how to report the miss.
pub fn with_credentials(
    family: ApiFamily,
    credentials: &Credentials,
    ctx: ApiContext,
) -> Result<ApiContext, ApiContext> {
    match credentials.basic_auth() {
        Some(auth) => Ok(ctx.with_basic_auth(family, auth)),
        None => Err(ctx),
    }
}

//! Confluent Cloud control-plane client library.
//!
//! One client per backend subsystem ([`ApiFamily`]), all sharing a pluggable
//! [`Transport`]. Credentials travel in an [`ApiContext`] that holds a
//! separate basic-auth slot per family.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use ccloud_sdk::{ApiContext, ApiFamily, BasicAuth, Configuration, HttpTransport};
//! use ccloud_sdk::org::{Environment, EnvironmentsApi};
//!
//! let config = Configuration::new("https://api.confluent.cloud", Arc::new(HttpTransport::new()));
//! let api = EnvironmentsApi::new(config);
//! let ctx = ApiContext::new().with_basic_auth(ApiFamily::Org, BasicAuth::new(key, secret));
//! let env = api.create(&ctx, &Environment::with_display_name("prod")).await?;
//! ```

pub mod auth;
pub mod client;
pub mod cmk;
pub mod error;
pub mod iam;
pub mod kafka_rest;
pub mod mds;
pub mod org;
pub mod transport;

pub use auth::{ApiContext, ApiFamily, BasicAuth};
pub use client::{ApiClient, Configuration};
pub use error::{ApiError, Result};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

pub use reqwest::Method;

/// Enum whose values travel over the wire as fixed upper-case tokens.
pub trait WireEnum: Copy + Sized + 'static {
    /// Human-readable name of the enum domain, used in error messages.
    const DOMAIN: &'static str;
    /// Every value of the domain.
    const ALL: &'static [Self];

    /// The wire token for this value.
    fn as_str(&self) -> &'static str;
}

/// Declare a wire enum: serde renames, [`WireEnum`] and `Display` all come
/// from the same token table.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $domain:literal {
            $( $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $crate::WireEnum for $name {
            const DOMAIN: &'static str = $domain;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::WireEnum::as_str(self))
            }
        }
    };
}

pub(crate) use wire_enum;

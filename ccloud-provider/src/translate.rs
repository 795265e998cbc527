//! Enum translator: upper-case string tokens to wire enum codes.
//!
//! Matching is exact and case-sensitive. A token the remote API would reject
//! is rejected here too, with the token echoed verbatim in the error.

use ccloud_sdk::WireEnum;
use ccloud_sdk::cmk::{Availability, Cloud};
use ccloud_sdk::kafka_rest::{AclOperation, AclPatternType, AclPermission, AclResourceType};

use crate::error::{ProviderError, Result};

/// Look `token` up in `E`'s token table.
pub fn string_to<E: WireEnum>(token: &str) -> Result<E> {
    E::ALL
        .iter()
        .copied()
        .find(|value| value.as_str() == token)
        .ok_or_else(|| ProviderError::UnknownEnumToken {
            domain: E::DOMAIN,
            token: token.to_string(),
        })
}

pub fn string_to_acl_resource_type(token: &str) -> Result<AclResourceType> {
    string_to(token)
}

pub fn string_to_acl_pattern_type(token: &str) -> Result<AclPatternType> {
    string_to(token)
}

pub fn string_to_acl_operation(token: &str) -> Result<AclOperation> {
    string_to(token)
}

pub fn string_to_acl_permission(token: &str) -> Result<AclPermission> {
    string_to(token)
}

pub fn string_to_availability(token: &str) -> Result<Availability> {
    string_to(token)
}

pub fn string_to_cloud(token: &str) -> Result<Cloud> {
    string_to(token)
}

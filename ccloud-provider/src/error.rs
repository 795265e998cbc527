//! Provider error types.

use std::fmt;
use std::time::Duration;

use ccloud_sdk::ApiError;
use thiserror::Error;

/// Reconciler lifecycle operation, used to give errors context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "creating",
            Operation::Read => "reading",
            Operation::Update => "updating",
            Operation::Delete => "deleting",
            Operation::Import => "importing",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Errors surfaced by reconcilers.
///
/// Everything except [`ProviderError::Api`], [`ProviderError::Timeout`] and
/// [`ProviderError::ProvisioningFailed`] is detected before any remote call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A string token did not name a value of its enum domain.
    #[error("unknown {domain} was found: {token}")]
    UnknownEnumToken { domain: &'static str, token: String },

    /// Update touched fields outside the resource's mutable set.
    #[error("{}", immutable_message(.resource, .fields, .mutable))]
    ImmutableFieldChange {
        resource: &'static str,
        fields: Vec<String>,
        mutable: &'static [&'static str],
    },

    /// The import environment bundle is incomplete.
    #[error(
        "KAFKA_API_KEY, KAFKA_API_SECRET, and KAFKA_HTTP_ENDPOINT must be set for kafka topic / ACL import"
    )]
    MissingImportEnvironment,

    #[error("invalid import id {id:?} for {resource}: expected {expected}")]
    InvalidImportId {
        resource: &'static str,
        id: String,
        expected: &'static str,
    },

    /// A required attribute of a nested block is missing or empty.
    #[error("could not find {attribute} attribute in {block} block")]
    MissingBlockAttribute {
        attribute: &'static str,
        block: &'static str,
    },

    /// The record failed validation at the schema boundary.
    #[error("invalid {resource}: {reason}")]
    InvalidState {
        resource: &'static str,
        reason: String,
    },

    #[error("{resource} {id} does not exist")]
    NotFound { resource: &'static str, id: String },

    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    #[error("{operation} requires {what}")]
    MissingInput {
        operation: Operation,
        what: &'static str,
    },

    /// The remote API rejected the call or could not be reached.
    #[error("error {operation} {resource} ({id}): {source}")]
    Api {
        operation: Operation,
        resource: &'static str,
        id: String,
        #[source]
        source: ApiError,
    },

    #[error("timed out after {after:?} {operation} {resource} ({id})")]
    Timeout {
        operation: Operation,
        resource: &'static str,
        id: String,
        after: Duration,
    },

    #[error("remote did not return an id for the created {resource}")]
    MissingRemoteId { resource: &'static str },

    #[error("kafka cluster {id} provisioning ended in phase {phase}")]
    ProvisioningFailed { id: String, phase: String },

    #[error("failed to decode {resource} state: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {resource} state: {source}")]
    Encode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn immutable_message(resource: &str, fields: &[String], mutable: &[&str]) -> String {
    match mutable {
        [] => format!(
            "{} does not support in-place updates (changed: {})",
            resource,
            fields.join(", ")
        ),
        [only] => format!(
            "only {} field can be updated for {} (changed: {})",
            only,
            with_article(resource),
            fields.join(", ")
        ),
        _ => format!(
            "only {} fields can be updated for {} (changed: {})",
            mutable.join(", "),
            with_article(resource),
            fields.join(", ")
        ),
    }
}

fn with_article(noun: &str) -> String {
    let article = match noun.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };
    format!("{} {}", article, noun)
}

impl ProviderError {
    /// Wrap a remote failure with the operation and resource id.
    pub fn api(operation: Operation, resource: &'static str, id: &str, source: ApiError) -> Self {
        ProviderError::Api {
            operation,
            resource,
            id: id.to_string(),
            source,
        }
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_message_single_field() {
        let err = ProviderError::ImmutableFieldChange {
            resource: "environment",
            fields: vec!["id".to_string()],
            mutable: &["display_name"],
        };
        assert_eq!(
            err.to_string(),
            "only display_name field can be updated for an environment (changed: id)"
        );
    }

    #[test]
    fn test_immutable_message_no_mutable_fields() {
        let err = ProviderError::ImmutableFieldChange {
            resource: "role binding",
            fields: vec!["principal".to_string(), "role_name".to_string()],
            mutable: &[],
        };
        assert_eq!(
            err.to_string(),
            "role binding does not support in-place updates (changed: principal, role_name)"
        );
    }

    #[test]
    fn test_immutable_message_several_fields() {
        let err = ProviderError::ImmutableFieldChange {
            resource: "kafka cluster",
            fields: vec!["region".to_string()],
            mutable: &["display_name", "cku"],
        };
        assert_eq!(
            err.to_string(),
            "only display_name, cku fields can be updated for a kafka cluster (changed: region)"
        );
    }

    #[test]
    fn test_missing_block_attribute_message() {
        let err = ProviderError::MissingBlockAttribute {
            attribute: "secret",
            block: "credentials",
        };
        assert_eq!(err.to_string(), "could not find secret attribute in credentials block");
    }

    #[test]
    fn test_api_error_carries_id() {
        let err = ProviderError::api(
            Operation::Delete,
            "environment",
            "env-123",
            ApiError::Transport {
                url: "https://api.confluent.cloud/org/v2/environments/env-123".into(),
                message: "connection reset".into(),
            },
        );
        let msg = err.to_string();
        assert!(msg.starts_with("error deleting environment (env-123)"), "{}", msg);
    }
}

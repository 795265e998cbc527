//! Resource reconcilers.
//!
//! Every resource type implements [`Resource`]: the same five lifecycle
//! operations over its own typed state record. The shared rules live here:
//!
//! - Read treats HTTP 404 as drift and clears the id instead of failing.
//! - Update rejects changes outside the mutable allow-list before calling out.
//! - Import passes the id through; the following Read fills in the rest.

pub mod environment;
pub mod kafka_acl;
pub mod kafka_cluster;
pub mod kafka_topic;
pub mod role_binding;
pub mod service_account;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::credentials::Credentials;
use crate::error::{Operation, ProviderError, Result};
use crate::import_env::{
    KafkaImportEnvVars, check_environment_variables_for_kafka_import, check_with,
};
use crate::timeouts::DEFAULT_TIMEOUT;

pub use environment::EnvironmentResource;
pub use kafka_acl::KafkaAclResource;
pub use kafka_cluster::KafkaClusterResource;
pub use kafka_topic::KafkaTopicResource;
pub use role_binding::RoleBindingResource;
pub use service_account::ServiceAccountResource;

/// Environment lookup used by imports that need cluster credentials.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Run the import gate through `env`, or the process environment when unset.
pub fn import_bundle(env: Option<&EnvLookup>) -> Result<KafkaImportEnvVars> {
    match env {
        Some(lookup) => check_with(|name: &str| lookup(name)),
        None => check_environment_variables_for_kafka_import(),
    }
}

/// Typed desired-state record for one resource instance.
pub trait StateRecord:
    Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static
{
    /// Fields filled in from the remote and never compared on update.
    const COMPUTED_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: Option<String>);

    /// Reject records the schema would not accept.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Lifecycle contract shared by every resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    type State: StateRecord;

    /// Type name the host uses, e.g. `confluent_environment`.
    const TYPE_NAME: &'static str;
    /// Name used in messages, e.g. `environment`.
    const DISPLAY_NAME: &'static str;
    /// Fields Update may change in place.
    const MUTABLE_FIELDS: &'static [&'static str];

    /// Deadline for one operation on `state`.
    fn timeout(&self, _state: &Self::State) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Create the remote object and record its id.
    async fn create(&self, state: &mut Self::State) -> Result<()>;

    /// Refresh `state` from the remote. Clears the id if the object is gone.
    async fn read(&self, state: &mut Self::State) -> Result<()>;

    /// Apply changes between `prior` and `planned` to the remote object.
    async fn update(&self, prior: &Self::State, planned: &mut Self::State) -> Result<()>;

    async fn delete(&self, state: &Self::State) -> Result<()>;

    /// Build a state record for an existing remote object.
    async fn import(&self, id: &str) -> Result<Self::State> {
        let mut state = Self::State::default();
        state.set_id(Some(id.to_string()));
        Ok(state)
    }
}

fn fields<S: StateRecord>(
    resource: &'static str,
    state: &S,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    match serde_json::to_value(state) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(ProviderError::Encode {
            resource,
            source: serde::ser::Error::custom("state is not a JSON object"),
        }),
        Err(source) => Err(ProviderError::Encode { resource, source }),
    }
}

/// Top-level fields whose serialized values differ between two records.
pub fn changed_fields<S: StateRecord>(
    resource: &'static str,
    prior: &S,
    planned: &S,
) -> Result<Vec<String>> {
    let prior = fields(resource, prior)?;
    let planned = fields(resource, planned)?;

    let mut fields: Vec<String> = prior
        .keys()
        .chain(planned.keys())
        .filter(|k| !S::COMPUTED_FIELDS.contains(&k.as_str()))
        .filter(|k| prior.get(k.as_str()) != planned.get(k.as_str()))
        .cloned()
        .collect();
    fields.sort();
    fields.dedup();
    Ok(fields)
}

/// Fail if anything outside `R::MUTABLE_FIELDS` changed.
pub fn check_update<R: Resource + ?Sized>(prior: &R::State, planned: &R::State) -> Result<()> {
    let violations: Vec<String> = changed_fields(R::DISPLAY_NAME, prior, planned)?
        .into_iter()
        .filter(|f| !R::MUTABLE_FIELDS.contains(&f.as_str()))
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::ImmutableFieldChange {
            resource: R::DISPLAY_NAME,
            fields: violations,
            mutable: R::MUTABLE_FIELDS,
        })
    }
}

/// The record's id, or an error naming the operation that needed it.
pub fn require_id<S: StateRecord>(operation: Operation, state: &S) -> Result<String> {
    state
        .id()
        .map(str::to_string)
        .ok_or(ProviderError::MissingInput {
            operation,
            what: "a resource id",
        })
}

/// Apply the read contract to a fetch result.
///
/// A 404 clears the id and yields `Ok(None)`. Any other failure is wrapped
/// and the record is left untouched.
pub fn observe<T, S: StateRecord>(
    resource: &'static str,
    state: &mut S,
    id: &str,
    result: ccloud_sdk::Result<T>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            warn!("{} {} not found, removing from state", resource, id);
            state.set_id(None);
            Ok(None)
        }
        Err(e) => Err(ProviderError::api(Operation::Read, resource, id, e)),
    }
}

/// Reject an empty required string.
pub fn require_non_empty(resource: &'static str, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ProviderError::InvalidState {
            resource,
            reason: format!("{} must not be empty", field),
        });
    }
    Ok(())
}

/// Reject a `credentials` block with an empty key or secret.
pub fn require_credentials(credentials: &Credentials) -> Result<()> {
    for (attribute, value) in [("key", &credentials.key), ("secret", &credentials.secret)] {
        if value.is_empty() {
            return Err(ProviderError::MissingBlockAttribute {
                attribute,
                block: "credentials",
            });
        }
    }
    Ok(())
}

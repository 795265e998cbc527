//! Host bridge: dispatches one lifecycle request to the matching reconciler.
//!
//! The planning engine talks JSON. A request names the resource type, the
//! operation and the records it applies to; the response carries the state the
//! engine should store afterwards plus any diagnostics.
//!
//! Each operation runs under its resource class deadline. When it expires the
//! operation future is dropped, which cancels any in-flight remote call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::client::Client;
use crate::error::{Operation, ProviderError, Result};
use crate::resource::{
    EnvLookup, EnvironmentResource, KafkaAclResource, KafkaClusterResource, KafkaTopicResource,
    Resource, RoleBindingResource, ServiceAccountResource, StateRecord,
};

#[derive(Debug, Clone, Deserialize)]
pub struct OperationRequest {
    /// Resource type name, e.g. `confluent_environment`.
    pub resource: String,
    pub operation: Operation,
    /// Stored state: required by read, update and delete.
    #[serde(default)]
    pub prior: Option<Value>,
    /// Desired state: required by create and update.
    #[serde(default)]
    pub planned: Option<Value>,
    /// Import id.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
}

impl Diagnostic {
    fn warning(summary: String) -> Self {
        Self {
            severity: Severity::Warning,
            summary,
        }
    }
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        Self {
            severity: Severity::Error,
            summary: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    /// State to store, `null` when the object no longer exists.
    pub state: Option<Value>,
    pub diagnostics: Vec<Diagnostic>,
}

impl OperationResponse {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Result of one operation before encoding: the state to hand back, which is
/// present even on failure when the remote object exists, and the error.
struct Outcome<S> {
    state: Option<S>,
    error: Option<ProviderError>,
    warnings: Vec<String>,
}

impl<S: StateRecord> Outcome<S> {
    fn ok(state: Option<S>) -> Self {
        Self {
            state,
            error: None,
            warnings: Vec::new(),
        }
    }

    fn failed(state: Option<S>, error: ProviderError) -> Self {
        Self {
            state,
            error: Some(error),
            warnings: Vec::new(),
        }
    }

    fn with_warning(mut self, summary: String) -> Self {
        self.warnings.push(summary);
        self
    }

    /// `Ok` keeps `state`; `Err` falls back to `fallback`.
    fn from_result(result: Result<()>, state: Option<S>, fallback: Option<S>) -> Self {
        match result {
            Ok(()) => Self::ok(state),
            Err(e) => Self::failed(fallback, e),
        }
    }
}

/// Every reconciler, keyed by resource type name.
pub struct Provider {
    environment: EnvironmentResource,
    service_account: ServiceAccountResource,
    kafka_cluster: KafkaClusterResource,
    kafka_topic: KafkaTopicResource,
    kafka_acl: KafkaAclResource,
    role_binding: RoleBindingResource,
}

impl Provider {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            environment: EnvironmentResource::new(Arc::clone(&client)),
            service_account: ServiceAccountResource::new(Arc::clone(&client)),
            kafka_cluster: KafkaClusterResource::new(Arc::clone(&client)),
            kafka_topic: KafkaTopicResource::new(Arc::clone(&client)),
            kafka_acl: KafkaAclResource::new(Arc::clone(&client)),
            role_binding: RoleBindingResource::new(client),
        }
    }

    /// Provider whose topic and ACL imports read `env` instead of the process
    /// environment.
    pub fn with_env_lookup(client: Arc<Client>, env: EnvLookup) -> Self {
        let mut provider = Self::new(Arc::clone(&client));
        provider.kafka_topic =
            KafkaTopicResource::new(Arc::clone(&client)).with_env_lookup(Arc::clone(&env));
        provider.kafka_acl = KafkaAclResource::new(client).with_env_lookup(env);
        provider
    }

    pub async fn execute(&self, request: OperationRequest) -> OperationResponse {
        info!(resource = %request.resource, operation = ?request.operation, "Executing request");

        let resource_type = request.resource.clone();
        let response = match resource_type.as_str() {
            t if t == EnvironmentResource::TYPE_NAME => run(&self.environment, request).await,
            t if t == ServiceAccountResource::TYPE_NAME => run(&self.service_account, request).await,
            t if t == KafkaClusterResource::TYPE_NAME => run(&self.kafka_cluster, request).await,
            t if t == KafkaTopicResource::TYPE_NAME => run(&self.kafka_topic, request).await,
            t if t == KafkaAclResource::TYPE_NAME => run(&self.kafka_acl, request).await,
            t if t == RoleBindingResource::TYPE_NAME => run(&self.role_binding, request).await,
            other => OperationResponse {
                state: None,
                diagnostics: vec![Diagnostic::from(&ProviderError::UnknownResource(
                    other.to_string(),
                ))],
            },
        };

        for diagnostic in &response.diagnostics {
            match diagnostic.severity {
                Severity::Error => error!("{}", diagnostic.summary),
                Severity::Warning => warn!("{}", diagnostic.summary),
            }
        }
        response
    }
}

async fn run<R: Resource>(resource: &R, request: OperationRequest) -> OperationResponse {
    let outcome = match request.operation {
        Operation::Create => create(resource, request.planned).await,
        Operation::Read => read(resource, request.prior).await,
        Operation::Update => update(resource, request.prior, request.planned).await,
        Operation::Delete => delete(resource, request.prior).await,
        Operation::Import => import(resource, request.id).await,
    };

    let mut response = OperationResponse {
        state: None,
        diagnostics: outcome.warnings.into_iter().map(Diagnostic::warning).collect(),
    };
    if let Some(state) = outcome.state {
        match serde_json::to_value(&state) {
            Ok(value) => response.state = Some(value),
            Err(source) => response.diagnostics.push(Diagnostic::from(&ProviderError::Encode {
                resource: R::DISPLAY_NAME,
                source,
            })),
        }
    }
    if let Some(err) = outcome.error {
        response.diagnostics.push(Diagnostic::from(&err));
    }
    response
}

/// Decode a record handed over by the host.
fn decode<R: Resource>(
    operation: Operation,
    what: &'static str,
    value: Option<Value>,
) -> Result<R::State> {
    let value = value.ok_or(ProviderError::MissingInput { operation, what })?;
    serde_json::from_value(value).map_err(|source| ProviderError::Decode {
        resource: R::DISPLAY_NAME,
        source,
    })
}

/// Decode a desired-state record and check it against the schema rules.
fn decode_planned<R: Resource>(operation: Operation, value: Option<Value>) -> Result<R::State> {
    let state = decode::<R>(operation, "a planned state", value)?;
    state.validate()?;
    Ok(state)
}

async fn with_deadline<R: Resource>(
    operation: Operation,
    id: String,
    after: Duration,
    fut: impl Future<Output = Result<()>>,
) -> Result<()> {
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            operation,
            resource: R::DISPLAY_NAME,
            id,
            after,
        }),
    }
}

fn label<S: StateRecord>(state: &S) -> String {
    state.id().unwrap_or("<new>").to_string()
}

async fn create<R: Resource>(resource: &R, planned: Option<Value>) -> Outcome<R::State> {
    let mut state = match decode_planned::<R>(Operation::Create, planned) {
        Ok(state) => state,
        Err(e) => return Outcome::failed(None, e),
    };

    let (id, after) = (label(&state), resource.timeout(&state));
    let result = with_deadline::<R>(Operation::Create, id, after, resource.create(&mut state)).await;

    // An id means the remote object exists, even if the operation failed after
    // creating it
    let kept = state.id().is_some().then_some(state);
    match result {
        Ok(()) => Outcome::ok(kept),
        Err(e) => Outcome::failed(kept, e),
    }
}

async fn read<R: Resource>(resource: &R, prior: Option<Value>) -> Outcome<R::State> {
    let mut state = match decode::<R>(Operation::Read, "a prior state", prior) {
        Ok(state) => state,
        Err(e) => return Outcome::failed(None, e),
    };
    let original = state.clone();

    let (id, after) = (label(&state), resource.timeout(&state));
    let result = with_deadline::<R>(Operation::Read, id, after, resource.read(&mut state)).await;

    let refreshed = state.id().is_some().then_some(state);
    let drifted = result.is_ok() && refreshed.is_none();
    let outcome = Outcome::from_result(result, refreshed, Some(original.clone()));
    match original.id() {
        Some(id) if drifted => outcome.with_warning(format!(
            "{} {} no longer exists and was removed from state",
            R::DISPLAY_NAME,
            id
        )),
        _ => outcome,
    }
}

async fn update<R: Resource>(
    resource: &R,
    prior: Option<Value>,
    planned: Option<Value>,
) -> Outcome<R::State> {
    let prior = match decode::<R>(Operation::Update, "a prior state", prior) {
        Ok(state) => state,
        Err(e) => return Outcome::failed(None, e),
    };
    let mut planned = match decode_planned::<R>(Operation::Update, planned) {
        Ok(state) => state,
        Err(e) => return Outcome::failed(Some(prior), e),
    };

    let (id, after) = (label(&prior), resource.timeout(&planned));
    let result = with_deadline::<R>(
        Operation::Update,
        id,
        after,
        resource.update(&prior, &mut planned),
    )
    .await;
    Outcome::from_result(result, Some(planned), Some(prior))
}

async fn delete<R: Resource>(resource: &R, prior: Option<Value>) -> Outcome<R::State> {
    let state = match decode::<R>(Operation::Delete, "a prior state", prior) {
        Ok(state) => state,
        Err(e) => return Outcome::failed(None, e),
    };

    let (id, after) = (label(&state), resource.timeout(&state));
    let result = with_deadline::<R>(Operation::Delete, id, after, resource.delete(&state)).await;
    Outcome::from_result(result, None, Some(state))
}

async fn import<R: Resource>(resource: &R, id: Option<String>) -> Outcome<R::State> {
    let Some(id) = id else {
        return Outcome::failed(
            None,
            ProviderError::MissingInput {
                operation: Operation::Import,
                what: "an import id",
            },
        );
    };

    let mut state = match resource.import(&id).await {
        Ok(state) => state,
        Err(e) => return Outcome::failed(None, e),
    };

    let after = resource.timeout(&state);
    if let Err(e) = with_deadline::<R>(Operation::Import, id.clone(), after, resource.read(&mut state)).await
    {
        return Outcome::failed(None, e);
    }

    if state.id().is_none() {
        return Outcome::failed(
            None,
            ProviderError::NotFound {
                resource: R::DISPLAY_NAME,
                id,
            },
        );
    }
    Outcome::ok(Some(state))
}

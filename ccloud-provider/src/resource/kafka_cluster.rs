//! Kafka cluster reconciler (cmk API).
//!
//! Clusters are scoped to an environment: every call except create carries the
//! environment id as a query parameter, and the import id names both.
//! Create blocks until the cluster reports `PROVISIONED`, which for dedicated
//! clusters can take hours; the dispatcher bounds the wait with the
//! class timeout from [`ClusterType::timeout`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ccloud_sdk::cmk::{
    ClusterConfig, ClusterSpec, EnvironmentReference, KafkaCluster, PHASE_FAILED, PHASE_PROVISIONED,
};
use ccloud_sdk::{ApiFamily, WireEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{Resource, StateRecord, check_update, observe, require_id, require_non_empty};
use crate::client::Client;
use crate::error::{Operation, ProviderError, Result};
use crate::timeouts::ClusterType;
use crate::translate::{string_to_availability, string_to_cloud};

pub const PARAM_DISPLAY_NAME: &str = "display_name";
pub const PARAM_CKU: &str = "cku";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KafkaClusterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: String,
    /// `SINGLE_ZONE` or `MULTI_ZONE`.
    #[serde(default)]
    pub availability: String,
    /// `AWS`, `GCP` or `AZURE`.
    #[serde(default)]
    pub cloud: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub cluster_type: ClusterType,
    /// Confluent units. Dedicated clusters only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cku: Option<u32>,
    #[serde(default)]
    pub environment_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbac_crn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl KafkaClusterState {
    fn config(&self) -> Result<ClusterConfig> {
        Ok(match self.cluster_type {
            ClusterType::Basic => ClusterConfig::Basic,
            ClusterType::Standard => ClusterConfig::Standard,
            ClusterType::Dedicated => ClusterConfig::Dedicated {
                cku: self.cku.ok_or_else(|| invalid("dedicated clusters require cku"))?,
            },
        })
    }

    fn environment(&self) -> EnvironmentReference {
        EnvironmentReference {
            id: self.environment_id.clone(),
        }
    }

    /// Copy the remote-computed fields.
    fn apply_status(&mut self, cluster: &KafkaCluster) {
        if let Some(spec) = &cluster.spec {
            self.http_endpoint = spec.http_endpoint.clone();
            self.bootstrap_endpoint = spec.kafka_bootstrap_endpoint.clone();
        }
        self.rbac_crn = cluster
            .metadata
            .as_ref()
            .and_then(|m| m.resource_name.clone());
        self.phase = cluster.phase().map(str::to_string);
    }

    /// Copy everything the remote reports back into the record.
    fn apply_observed(&mut self, cluster: &KafkaCluster) {
        self.apply_status(cluster);
        let Some(spec) = &cluster.spec else {
            return;
        };

        if let Some(name) = &spec.display_name {
            self.display_name = name.clone();
        }
        if let Some(availability) = spec.availability {
            self.availability = availability.as_str().to_string();
        }
        if let Some(cloud) = spec.cloud {
            self.cloud = cloud.as_str().to_string();
        }
        if let Some(region) = &spec.region {
            self.region = region.clone();
        }
        if let Some(environment) = &spec.environment {
            self.environment_id = environment.id.clone();
        }
        match &spec.config {
            Some(ClusterConfig::Basic) => {
                self.cluster_type = ClusterType::Basic;
                self.cku = None;
            }
            Some(ClusterConfig::Standard) => {
                self.cluster_type = ClusterType::Standard;
                self.cku = None;
            }
            Some(ClusterConfig::Dedicated { cku }) => {
                self.cluster_type = ClusterType::Dedicated;
                self.cku = Some(*cku);
            }
            None => {}
        }
    }
}

fn invalid(reason: impl Into<String>) -> ProviderError {
    ProviderError::InvalidState {
        resource: KafkaClusterResource::DISPLAY_NAME,
        reason: reason.into(),
    }
}

impl StateRecord for KafkaClusterState {
    const COMPUTED_FIELDS: &'static [&'static str] =
        &["http_endpoint", "bootstrap_endpoint", "rbac_crn", "phase"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        let resource = KafkaClusterResource::DISPLAY_NAME;
        require_non_empty(resource, PARAM_DISPLAY_NAME, &self.display_name)?;
        require_non_empty(resource, "region", &self.region)?;
        require_non_empty(resource, "environment_id", &self.environment_id)?;
        string_to_availability(&self.availability)?;
        string_to_cloud(&self.cloud)?;

        match (self.cluster_type, self.cku) {
            (ClusterType::Dedicated, None) => Err(invalid("dedicated clusters require cku")),
            (ClusterType::Dedicated, Some(0)) => Err(invalid("cku must be at least 1")),
            (ClusterType::Dedicated, Some(_)) => Ok(()),
            (other, Some(_)) => Err(invalid(format!(
                "cku can only be set for dedicated clusters, not {}",
                other
            ))),
            (_, None) => Ok(()),
        }
    }
}

pub struct KafkaClusterResource {
    client: Arc<Client>,
}

impl KafkaClusterResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Poll until the cluster leaves its provisioning phases.
    async fn wait_for_provisioning(&self, state: &mut KafkaClusterState, id: &str) -> Result<()> {
        let ctx = self.client.api_context(ApiFamily::Cmk);
        let interval: Duration = self.client.poll_interval;

        loop {
            match state.phase.as_deref() {
                Some(PHASE_PROVISIONED) => {
                    info!("Kafka cluster {} is provisioned", id);
                    return Ok(());
                }
                Some(PHASE_FAILED) => {
                    error!("Kafka cluster {} failed to provision", id);
                    return Err(ProviderError::ProvisioningFailed {
                        id: id.to_string(),
                        phase: PHASE_FAILED.to_string(),
                    });
                }
                phase => debug!("Waiting for kafka cluster {} (phase {:?})", id, phase),
            }

            tokio::time::sleep(interval).await;
            let cluster = self
                .client
                .clusters
                .get(&ctx, &state.environment_id, id)
                .await
                .map_err(|e| ProviderError::api(Operation::Create, Self::DISPLAY_NAME, id, e))?;
            state.apply_status(&cluster);
        }
    }
}

#[async_trait]
impl Resource for KafkaClusterResource {
    type State = KafkaClusterState;

    const TYPE_NAME: &'static str = "confluent_kafka_cluster";
    const DISPLAY_NAME: &'static str = "kafka cluster";
    const MUTABLE_FIELDS: &'static [&'static str] = &[PARAM_DISPLAY_NAME, PARAM_CKU];

    fn timeout(&self, state: &KafkaClusterState) -> Duration {
        state.cluster_type.timeout()
    }

    async fn create(&self, state: &mut KafkaClusterState) -> Result<()> {
        let cluster = KafkaCluster {
            spec: Some(ClusterSpec {
                display_name: Some(state.display_name.clone()),
                availability: Some(string_to_availability(&state.availability)?),
                cloud: Some(string_to_cloud(&state.cloud)?),
                region: Some(state.region.clone()),
                config: Some(state.config()?),
                environment: Some(state.environment()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let ctx = self.client.api_context(ApiFamily::Cmk);

        let created = self
            .client
            .clusters
            .create(&ctx, &cluster)
            .await
            .map_err(|e| {
                error!("Kafka cluster create failed {:?}: {}", cluster, e);
                ProviderError::api(Operation::Create, Self::DISPLAY_NAME, &state.display_name, e)
            })?;

        let id = created.id.clone().ok_or(ProviderError::MissingRemoteId {
            resource: Self::DISPLAY_NAME,
        })?;
        info!(
            "Created {} kafka cluster {} in {}",
            state.cluster_type, id, state.environment_id
        );
        state.set_id(Some(id.clone()));
        state.apply_status(&created);

        self.wait_for_provisioning(state, &id).await
    }

    async fn read(&self, state: &mut KafkaClusterState) -> Result<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };
        info!("Kafka cluster read for {}", id);

        let ctx = self.client.api_context(ApiFamily::Cmk);
        let result = self.client.clusters.get(&ctx, &state.environment_id, &id).await;
        if let Some(cluster) = observe(Self::DISPLAY_NAME, state, &id, result)? {
            state.apply_observed(&cluster);
        }
        Ok(())
    }

    async fn update(&self, prior: &KafkaClusterState, planned: &mut KafkaClusterState) -> Result<()> {
        check_update::<Self>(prior, planned)?;
        let id = require_id(Operation::Update, prior)?;

        let rename = prior.display_name != planned.display_name;
        let resize = prior.cku != planned.cku;
        if !rename && !resize {
            return Ok(());
        }

        let patch = KafkaCluster {
            spec: Some(ClusterSpec {
                display_name: rename.then(|| planned.display_name.clone()),
                config: if resize { Some(planned.config()?) } else { None },
                environment: Some(planned.environment()),
                ..Default::default()
            }),
            ..Default::default()
        };
        info!("Updating kafka cluster {}", id);

        let ctx = self.client.api_context(ApiFamily::Cmk);
        let updated = self
            .client
            .clusters
            .update(&ctx, &id, &patch)
            .await
            .map_err(|e| ProviderError::api(Operation::Update, Self::DISPLAY_NAME, &id, e))?;
        planned.apply_status(&updated);
        Ok(())
    }

    async fn delete(&self, state: &KafkaClusterState) -> Result<()> {
        let id = require_id(Operation::Delete, state)?;
        info!("Deleting kafka cluster {}", id);

        let ctx = self.client.api_context(ApiFamily::Cmk);
        self.client
            .clusters
            .delete(&ctx, &state.environment_id, &id)
            .await
            .map_err(|e| ProviderError::api(Operation::Delete, Self::DISPLAY_NAME, &id, e))
    }

    async fn import(&self, id: &str) -> Result<KafkaClusterState> {
        let (environment_id, cluster_id) = id
            .split_once('/')
            .filter(|(env, lkc)| !env.is_empty() && !lkc.is_empty())
            .ok_or_else(|| ProviderError::InvalidImportId {
                resource: Self::DISPLAY_NAME,
                id: id.to_string(),
                expected: "<environment id>/<cluster id>",
            })?;

        Ok(KafkaClusterState {
            id: Some(cluster_id.to_string()),
            environment_id: environment_id.to_string(),
            ..Default::default()
        })
    }
}

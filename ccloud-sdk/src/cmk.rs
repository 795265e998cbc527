//! Cluster metadata API (`/cmk/v2`): Kafka clusters.

use serde::{Deserialize, Serialize};

use crate::auth::{ApiContext, ApiFamily};
use crate::client::{ApiClient, Configuration};
use crate::error::Result;
use crate::wire_enum;

const CLUSTERS_PATH: &str = "/cmk/v2/clusters";

/// Phase reported once a cluster is ready for use.
pub const PHASE_PROVISIONED: &str = "PROVISIONED";
/// Phase reported when provisioning gave up.
pub const PHASE_FAILED: &str = "FAILED";

wire_enum! {
    /// Zone redundancy of a cluster.
    Availability, "availability" {
        SingleZone => "SINGLE_ZONE",
        MultiZone => "MULTI_ZONE",
    }
}

wire_enum! {
    /// Cloud provider hosting a cluster.
    Cloud, "cloud" {
        Aws => "AWS",
        Gcp => "GCP",
        Azure => "AZURE",
    }
}

/// Cluster type and its type-specific settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClusterConfig {
    Basic,
    Standard,
    Dedicated { cku: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentReference {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Cloud>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ClusterConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kafka_bootstrap_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cku: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ClusterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,
}

impl KafkaCluster {
    pub fn phase(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.phase.as_str())
    }
}

/// Client for `/cmk/v2/clusters`. Every call except create is scoped to an
/// environment.
#[derive(Clone)]
pub struct ClustersApi {
    client: ApiClient,
}

impl ClustersApi {
    pub fn new(config: Configuration) -> Self {
        Self {
            client: ApiClient::new(ApiFamily::Cmk, config),
        }
    }

    pub async fn create(&self, ctx: &ApiContext, cluster: &KafkaCluster) -> Result<KafkaCluster> {
        self.client.post(ctx, CLUSTERS_PATH, cluster).await
    }

    pub async fn get(&self, ctx: &ApiContext, environment_id: &str, id: &str) -> Result<KafkaCluster> {
        self.client
            .get(
                ctx,
                &format!("{}/{}", CLUSTERS_PATH, id),
                &[("environment", environment_id)],
            )
            .await
    }

    pub async fn update(
        &self,
        ctx: &ApiContext,
        id: &str,
        cluster: &KafkaCluster,
    ) -> Result<KafkaCluster> {
        self.client
            .patch(ctx, &format!("{}/{}", CLUSTERS_PATH, id), &[], cluster)
            .await
    }

    pub async fn delete(&self, ctx: &ApiContext, environment_id: &str, id: &str) -> Result<()> {
        self.client
            .delete(
                ctx,
                &format!("{}/{}", CLUSTERS_PATH, id),
                &[("environment", environment_id)],
            )
            .await
    }
}

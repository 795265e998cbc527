//! Kafka topic reconciler (kafka-rest API).
//!
//! Topics are served by the cluster's own REST endpoint, so the record carries
//! the endpoint and cluster credentials, and every operation builds a fresh
//! [`KafkaRestClient`](crate::kafka_rest::KafkaRestClient) from them.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ccloud_sdk::kafka_rest::{AlterConfigEntry, ConfigEntry, CreateTopicRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{
    EnvLookup, Resource, StateRecord, check_update, import_bundle, observe, require_credentials, require_id,
    require_non_empty,
};
use crate::client::Client;
use crate::credentials::Credentials;
use crate::error::{Operation, ProviderError, Result};
use crate::kafka_rest::KafkaRestClient;

pub const PARAM_CONFIG: &str = "config";
pub const PARAM_CREDENTIALS: &str = "credentials";

pub const DEFAULT_PARTITIONS_COUNT: u32 = 6;

fn default_partitions_count() -> u32 {
    DEFAULT_PARTITIONS_COUNT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KafkaTopicState {
    /// `<cluster id>/<topic name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub kafka_cluster_id: String,
    #[serde(default)]
    pub topic_name: String,
    #[serde(default = "default_partitions_count")]
    pub partitions_count: u32,
    /// REST endpoint of the owning cluster.
    #[serde(default)]
    pub http_endpoint: String,
    /// Topic settings that differ from the cluster defaults.
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    #[serde(default)]
    pub credentials: Credentials,
}

impl Default for KafkaTopicState {
    fn default() -> Self {
        Self {
            id: None,
            kafka_cluster_id: String::new(),
            topic_name: String::new(),
            partitions_count: DEFAULT_PARTITIONS_COUNT,
            http_endpoint: String::new(),
            config: BTreeMap::new(),
            credentials: Credentials::default(),
        }
    }
}

impl StateRecord for KafkaTopicState {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        let resource = KafkaTopicResource::DISPLAY_NAME;
        require_non_empty(resource, "kafka_cluster_id", &self.kafka_cluster_id)?;
        require_non_empty(resource, "topic_name", &self.topic_name)?;
        require_non_empty(resource, "http_endpoint", &self.http_endpoint)?;
        require_credentials(&self.credentials)?;
        if self.partitions_count == 0 {
            return Err(ProviderError::InvalidState {
                resource,
                reason: "partitions_count must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Alter entries turning `prior` into `planned`: changed or new keys are set,
/// keys missing from `planned` are deleted.
fn config_changes(
    prior: &BTreeMap<String, String>,
    planned: &BTreeMap<String, String>,
) -> Vec<AlterConfigEntry> {
    let set = planned
        .iter()
        .filter(|(name, value)| prior.get(*name) != Some(*value))
        .map(|(name, value)| AlterConfigEntry::set(name.as_str(), value.as_str()));
    let delete = prior
        .keys()
        .filter(|name| !planned.contains_key(*name))
        .map(|name| AlterConfigEntry::delete(name.as_str()));
    set.chain(delete).collect()
}

pub struct KafkaTopicResource {
    client: Arc<Client>,
    env: Option<EnvLookup>,
}

impl KafkaTopicResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            env: None,
        }
    }

    /// Replace the environment used by import.
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = Some(env);
        self
    }

    fn rest_client(&self, state: &KafkaTopicState) -> KafkaRestClient {
        self.client.kafka_rest_factory.create_kafka_rest_client(
            &state.http_endpoint,
            &state.kafka_cluster_id,
            &state.credentials.key,
            &state.credentials.secret,
        )
    }
}

#[async_trait]
impl Resource for KafkaTopicResource {
    type State = KafkaTopicState;

    const TYPE_NAME: &'static str = "confluent_kafka_topic";
    const DISPLAY_NAME: &'static str = "kafka topic";
    const MUTABLE_FIELDS: &'static [&'static str] = &[PARAM_CONFIG, PARAM_CREDENTIALS];

    async fn create(&self, state: &mut KafkaTopicState) -> Result<()> {
        let request = CreateTopicRequest {
            topic_name: state.topic_name.clone(),
            partitions_count: state.partitions_count,
            configs: state
                .config
                .iter()
                .map(|(name, value)| ConfigEntry {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
        };
        let rest = self.rest_client(state);

        rest.api
            .create_topic(&rest.api_context(), &rest.cluster_id, &request)
            .await
            .map_err(|e| {
                error!("Kafka topic create failed {:?}: {}", request, e);
                ProviderError::api(Operation::Create, Self::DISPLAY_NAME, &state.topic_name, e)
            })?;

        let id = format!("{}/{}", state.kafka_cluster_id, state.topic_name);
        debug!("Created kafka topic {}", id);
        state.set_id(Some(id));
        Ok(())
    }

    async fn read(&self, state: &mut KafkaTopicState) -> Result<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };
        info!("Kafka topic read for {}", id);

        let rest = self.rest_client(state);
        let ctx = rest.api_context();

        let result = rest.api.get_topic(&ctx, &rest.cluster_id, &state.topic_name).await;
        let Some(topic) = observe(Self::DISPLAY_NAME, state, &id, result)? else {
            return Ok(());
        };
        let result = rest
            .api
            .list_topic_configs(&ctx, &rest.cluster_id, &state.topic_name)
            .await;
        let Some(configs) = observe(Self::DISPLAY_NAME, state, &id, result)? else {
            return Ok(());
        };

        state.kafka_cluster_id = topic.cluster_id;
        state.topic_name = topic.topic_name;
        state.partitions_count = topic.partitions_count;
        state.config = configs
            .into_iter()
            .filter(|c| !c.is_default)
            .filter_map(|c| c.value.map(|value| (c.name, value)))
            .collect();
        Ok(())
    }

    async fn update(&self, prior: &KafkaTopicState, planned: &mut KafkaTopicState) -> Result<()> {
        check_update::<Self>(prior, planned)?;
        let id = require_id(Operation::Update, prior)?;

        let changes = config_changes(&prior.config, &planned.config);
        if changes.is_empty() {
            debug!("No config changes for kafka topic {}", id);
            return Ok(());
        }
        info!("Updating {} config entries of kafka topic {}", changes.len(), id);

        // Rotated credentials take effect for this call
        let rest = self.rest_client(planned);
        rest.api
            .alter_topic_configs(&rest.api_context(), &rest.cluster_id, &planned.topic_name, &changes)
            .await
            .map_err(|e| ProviderError::api(Operation::Update, Self::DISPLAY_NAME, &id, e))
    }

    async fn delete(&self, state: &KafkaTopicState) -> Result<()> {
        let id = require_id(Operation::Delete, state)?;
        info!("Deleting kafka topic {}", id);

        let rest = self.rest_client(state);
        rest.api
            .delete_topic(&rest.api_context(), &rest.cluster_id, &state.topic_name)
            .await
            .map_err(|e| ProviderError::api(Operation::Delete, Self::DISPLAY_NAME, &id, e))
    }

    async fn import(&self, id: &str) -> Result<KafkaTopicState> {
        let env = import_bundle(self.env.as_ref())?;

        let (cluster_id, topic_name) = id
            .split_once('/')
            .filter(|(cluster, topic)| !cluster.is_empty() && !topic.is_empty())
            .ok_or_else(|| ProviderError::InvalidImportId {
                resource: Self::DISPLAY_NAME,
                id: id.to_string(),
                expected: "<cluster id>/<topic name>",
            })?;

        Ok(KafkaTopicState {
            id: Some(id.to_string()),
            kafka_cluster_id: cluster_id.to_string(),
            topic_name: topic_name.to_string(),
            http_endpoint: env.kafka_http_endpoint.clone(),
            credentials: env.credentials(),
            ..Default::default()
        })
    }
}

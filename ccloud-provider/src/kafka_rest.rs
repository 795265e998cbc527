//! REST client factory for cluster-scoped Kafka REST calls.
//!
//! Every topic or ACL operation builds its own [`KafkaRestClient`] from the
//! endpoint and credentials stored in the resource record, uses it, and drops
//! it. The factory keeps only the user agent and the shared transport.

use std::sync::Arc;

use ccloud_sdk::kafka_rest::KafkaRestApi;
use ccloud_sdk::{ApiContext, ApiFamily, Configuration, Transport};
use tracing::warn;

use crate::credentials::{Credentials, with_credentials};

/// Client bound to one cluster's REST endpoint.
pub struct KafkaRestClient {
    pub api: KafkaRestApi,
    pub cluster_id: String,
    pub http_endpoint: String,
    credentials: Credentials,
}

impl KafkaRestClient {
    /// Context authenticated with this client's cluster credentials.
    pub fn api_context(&self) -> ApiContext {
        with_credentials(ApiFamily::KafkaRest, &self.credentials, ApiContext::new()).unwrap_or_else(
            |ctx| {
                warn!(
                    cluster_id = %self.cluster_id,
                    "Could not find cluster credentials for Confluent Cloud for clusterId={}",
                    self.cluster_id
                );
                ctx
            },
        )
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Builds [`KafkaRestClient`]s. Clients are not cached.
#[derive(Clone)]
pub struct KafkaRestClientFactory {
    user_agent: String,
    transport: Arc<dyn Transport>,
}

impl KafkaRestClientFactory {
    pub fn new(user_agent: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            user_agent: user_agent.into(),
            transport,
        }
    }

    pub fn create_kafka_rest_client(
        &self,
        http_endpoint: &str,
        cluster_id: &str,
        cluster_api_key: &str,
        cluster_api_secret: &str,
    ) -> KafkaRestClient {
        let config = Configuration::new(http_endpoint, Arc::clone(&self.transport))
            .with_user_agent(self.user_agent.clone());
        KafkaRestClient {
            api: KafkaRestApi::new(config),
            cluster_id: cluster_id.to_string(),
            http_endpoint: http_endpoint.to_string(),
            credentials: Credentials::new(cluster_api_key, cluster_api_secret),
        }
    }
}

//! Provider-level client.
//!
//! Built once from [`ProviderConfig`] and handed to every reconciler through
//! its constructor. Holds the organization credentials read-only.

use std::sync::Arc;
use std::time::Duration;

use ccloud_sdk::cmk::ClustersApi;
use ccloud_sdk::iam::ServiceAccountsApi;
use ccloud_sdk::mds::RoleBindingsApi;
use ccloud_sdk::org::EnvironmentsApi;
use ccloud_sdk::{ApiContext, ApiFamily, Configuration, HttpTransport, Transport};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::credentials::{self, Credentials};
use crate::kafka_rest::KafkaRestClientFactory;

pub struct Client {
    credentials: Arc<Credentials>,
    pub environments: EnvironmentsApi,
    pub service_accounts: ServiceAccountsApi,
    pub clusters: ClustersApi,
    pub role_bindings: RoleBindingsApi,
    pub kafka_rest_factory: KafkaRestClientFactory,
    pub poll_interval: Duration,
}

impl Client {
    /// Client talking HTTP through `reqwest`.
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(config: &ProviderConfig, transport: Arc<dyn Transport>) -> Self {
        debug!(endpoint = %config.endpoint, "Configuring Confluent Cloud client");

        let api_config = Configuration::new(config.endpoint.clone(), Arc::clone(&transport))
            .with_user_agent(config.user_agent.clone());

        Self {
            credentials: Arc::new(Credentials::new(
                config.api_key.clone(),
                config.api_secret.clone(),
            )),
            environments: EnvironmentsApi::new(api_config.clone()),
            service_accounts: ServiceAccountsApi::new(api_config.clone()),
            clusters: ClustersApi::new(api_config.clone()),
            role_bindings: RoleBindingsApi::new(api_config),
            kafka_rest_factory: KafkaRestClientFactory::new(config.user_agent.clone(), transport),
            poll_interval: config.poll_interval,
        }
    }

    /// Context authenticating `family` with the organization credentials.
    pub fn api_context(&self, family: ApiFamily) -> ApiContext {
        credentials::api_context(family, &self.credentials, ApiContext::new())
    }
}

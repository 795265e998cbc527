//! Environment reconciler (org API).

use std::sync::Arc;

use async_trait::async_trait;
use ccloud_sdk::ApiFamily;
use ccloud_sdk::org::Environment;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{Resource, StateRecord, check_update, observe, require_id, require_non_empty};
use crate::client::Client;
use crate::error::{Operation, ProviderError, Result};

pub const PARAM_DISPLAY_NAME: &str = "display_name";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// A human-readable name for the environment.
    #[serde(default)]
    pub display_name: String,
}

impl StateRecord for EnvironmentState {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        require_non_empty(EnvironmentResource::DISPLAY_NAME, PARAM_DISPLAY_NAME, &self.display_name)
    }
}

pub struct EnvironmentResource {
    client: Arc<Client>,
}

impl EnvironmentResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for EnvironmentResource {
    type State = EnvironmentState;

    const TYPE_NAME: &'static str = "confluent_environment";
    const DISPLAY_NAME: &'static str = "environment";
    const MUTABLE_FIELDS: &'static [&'static str] = &[PARAM_DISPLAY_NAME];

    async fn create(&self, state: &mut EnvironmentState) -> Result<()> {
        let env = Environment::with_display_name(&state.display_name);
        let ctx = self.client.api_context(ApiFamily::Org);

        let created = self
            .client
            .environments
            .create(&ctx, &env)
            .await
            .map_err(|e| {
                error!("Environment create failed {:?}: {}", env, e);
                ProviderError::api(Operation::Create, Self::DISPLAY_NAME, &state.display_name, e)
            })?;

        let id = created.id.ok_or(ProviderError::MissingRemoteId {
            resource: Self::DISPLAY_NAME,
        })?;
        debug!("Created environment {}", id);
        state.set_id(Some(id));
        Ok(())
    }

    async fn read(&self, state: &mut EnvironmentState) -> Result<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };
        info!("Environment read for {}", id);

        let ctx = self.client.api_context(ApiFamily::Org);
        let result = self.client.environments.get(&ctx, &id).await;
        if let Some(environment) = observe(Self::DISPLAY_NAME, state, &id, result)? {
            state.display_name = environment.display_name.unwrap_or_default();
        }
        Ok(())
    }

    async fn update(&self, prior: &EnvironmentState, planned: &mut EnvironmentState) -> Result<()> {
        check_update::<Self>(prior, planned)?;
        let id = require_id(Operation::Update, prior)?;

        if prior.display_name != planned.display_name {
            info!("Updating environment {} display name", id);
            let patch = Environment::with_display_name(&planned.display_name);
            let ctx = self.client.api_context(ApiFamily::Org);
            self.client
                .environments
                .update(&ctx, &id, &patch)
                .await
                .map_err(|e| ProviderError::api(Operation::Update, Self::DISPLAY_NAME, &id, e))?;
        }
        Ok(())
    }

    async fn delete(&self, state: &EnvironmentState) -> Result<()> {
        let id = require_id(Operation::Delete, state)?;
        info!("Deleting environment {}", id);

        let ctx = self.client.api_context(ApiFamily::Org);
        self.client
            .environments
            .delete(&ctx, &id)
            .await
            .map_err(|e| ProviderError::api(Operation::Delete, Self::DISPLAY_NAME, &id, e))
    }
}

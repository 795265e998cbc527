//! Role binding reconciler (mds API). Role bindings are immutable; any change
//! needs a replacement, which the planning engine schedules as delete+create.

use std::sync::Arc;

use async_trait::async_trait;
use ccloud_sdk::ApiFamily;
use ccloud_sdk::mds::RoleBinding;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{Resource, StateRecord, check_update, observe, require_id, require_non_empty};
use crate::client::Client;
use crate::error::{Operation, ProviderError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleBindingState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// e.g. `User:sa-abc123`
    #[serde(default)]
    pub principal: String,
    #[serde(default)]
    pub role_name: String,
    #[serde(default)]
    pub crn_pattern: String,
}

impl StateRecord for RoleBindingState {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        let resource = RoleBindingResource::DISPLAY_NAME;
        require_non_empty(resource, "principal", &self.principal)?;
        require_non_empty(resource, "role_name", &self.role_name)?;
        require_non_empty(resource, "crn_pattern", &self.crn_pattern)
    }
}

pub struct RoleBindingResource {
    client: Arc<Client>,
}

impl RoleBindingResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for RoleBindingResource {
    type State = RoleBindingState;

    const TYPE_NAME: &'static str = "confluent_role_binding";
    const DISPLAY_NAME: &'static str = "role binding";
    const MUTABLE_FIELDS: &'static [&'static str] = &[];

    async fn create(&self, state: &mut RoleBindingState) -> Result<()> {
        let binding = RoleBinding {
            id: None,
            principal: Some(state.principal.clone()),
            role_name: Some(state.role_name.clone()),
            crn_pattern: Some(state.crn_pattern.clone()),
        };
        let ctx = self.client.api_context(ApiFamily::Mds);

        let created = self
            .client
            .role_bindings
            .create(&ctx, &binding)
            .await
            .map_err(|e| {
                error!("Role binding create failed {:?}: {}", binding, e);
                ProviderError::api(Operation::Create, Self::DISPLAY_NAME, &state.principal, e)
            })?;

        let id = created.id.ok_or(ProviderError::MissingRemoteId {
            resource: Self::DISPLAY_NAME,
        })?;
        debug!("Created role binding {}", id);
        state.set_id(Some(id));
        Ok(())
    }

    async fn read(&self, state: &mut RoleBindingState) -> Result<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };
        info!("Role binding read for {}", id);

        let ctx = self.client.api_context(ApiFamily::Mds);
        let result = self.client.role_bindings.get(&ctx, &id).await;
        if let Some(binding) = observe(Self::DISPLAY_NAME, state, &id, result)? {
            state.principal = binding.principal.unwrap_or_default();
            state.role_name = binding.role_name.unwrap_or_default();
            state.crn_pattern = binding.crn_pattern.unwrap_or_default();
        }
        Ok(())
    }

    async fn update(&self, prior: &RoleBindingState, planned: &mut RoleBindingState) -> Result<()> {
        check_update::<Self>(prior, planned)
    }

    async fn delete(&self, state: &RoleBindingState) -> Result<()> {
        let id = require_id(Operation::Delete, state)?;
        info!("Deleting role binding {}", id);

        let ctx = self.client.api_context(ApiFamily::Mds);
        self.client
            .role_bindings
            .delete(&ctx, &id)
            .await
            .map_err(|e| ProviderError::api(Operation::Delete, Self::DISPLAY_NAME, &id, e))
    }
}

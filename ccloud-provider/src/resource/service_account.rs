//! Service account reconciler (iam API).

use std::sync::Arc;

use async_trait::async_trait;
use ccloud_sdk::ApiFamily;
use ccloud_sdk::iam::ServiceAccount;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{Resource, StateRecord, check_update, observe, require_id, require_non_empty};
use crate::client::Client;
use crate::error::{Operation, ProviderError, Result};

pub const PARAM_DESCRIPTION: &str = "description";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceAccountState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

impl StateRecord for ServiceAccountState {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        require_non_empty(ServiceAccountResource::DISPLAY_NAME, "display_name", &self.display_name)
    }
}

pub struct ServiceAccountResource {
    client: Arc<Client>,
}

impl ServiceAccountResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ServiceAccountResource {
    type State = ServiceAccountState;

    const TYPE_NAME: &'static str = "confluent_service_account";
    const DISPLAY_NAME: &'static str = "service account";
    const MUTABLE_FIELDS: &'static [&'static str] = &[PARAM_DESCRIPTION];

    async fn create(&self, state: &mut ServiceAccountState) -> Result<()> {
        let account = ServiceAccount {
            id: None,
            display_name: Some(state.display_name.clone()),
            description: Some(state.description.clone()),
        };
        let ctx = self.client.api_context(ApiFamily::Iam);

        let created = self
            .client
            .service_accounts
            .create(&ctx, &account)
            .await
            .map_err(|e| {
                error!("Service account create failed {:?}: {}", account, e);
                ProviderError::api(Operation::Create, Self::DISPLAY_NAME, &state.display_name, e)
            })?;

        let id = created.id.ok_or(ProviderError::MissingRemoteId {
            resource: Self::DISPLAY_NAME,
        })?;
        debug!("Created service account {}", id);
        state.set_id(Some(id));
        Ok(())
    }

    async fn read(&self, state: &mut ServiceAccountState) -> Result<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };
        info!("Service account read for {}", id);

        let ctx = self.client.api_context(ApiFamily::Iam);
        let result = self.client.service_accounts.get(&ctx, &id).await;
        if let Some(account) = observe(Self::DISPLAY_NAME, state, &id, result)? {
            state.display_name = account.display_name.unwrap_or_default();
            state.description = account.description.unwrap_or_default();
        }
        Ok(())
    }

    async fn update(
        &self,
        prior: &ServiceAccountState,
        planned: &mut ServiceAccountState,
    ) -> Result<()> {
        check_update::<Self>(prior, planned)?;
        let id = require_id(Operation::Update, prior)?;

        if prior.description != planned.description {
            let patch = ServiceAccount {
                description: Some(planned.description.clone()),
                ..Default::default()
            };
            let ctx = self.client.api_context(ApiFamily::Iam);
            self.client
                .service_accounts
                .update(&ctx, &id, &patch)
                .await
                .map_err(|e| ProviderError::api(Operation::Update, Self::DISPLAY_NAME, &id, e))?;
            debug!("Updated service account {}", id);
        }
        Ok(())
    }

    async fn delete(&self, state: &ServiceAccountState) -> Result<()> {
        let id = require_id(Operation::Delete, state)?;
        info!("Deleting service account {}", id);

        let ctx = self.client.api_context(ApiFamily::Iam);
        self.client
            .service_accounts
            .delete(&ctx, &id)
            .await
            .map_err(|e| ProviderError::api(Operation::Delete, Self::DISPLAY_NAME, &id, e))
    }
}

//! Identity API (`/iam/v2`): service accounts.

use serde::{Deserialize, Serialize};

use crate::auth::{ApiContext, ApiFamily};
use crate::client::{ApiClient, Configuration};
use crate::error::Result;

const SERVICE_ACCOUNTS_PATH: &str = "/iam/v2/service-accounts";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Client for `/iam/v2/service-accounts`.
#[derive(Clone)]
pub struct ServiceAccountsApi {
    client: ApiClient,
}

impl ServiceAccountsApi {
    pub fn new(config: Configuration) -> Self {
        Self {
            client: ApiClient::new(ApiFamily::Iam, config),
        }
    }

    pub async fn create(&self, ctx: &ApiContext, account: &ServiceAccount) -> Result<ServiceAccount> {
        self.client.post(ctx, SERVICE_ACCOUNTS_PATH, account).await
    }

    pub async fn get(&self, ctx: &ApiContext, id: &str) -> Result<ServiceAccount> {
        self.client
            .get(ctx, &format!("{}/{}", SERVICE_ACCOUNTS_PATH, id), &[])
            .await
    }

    pub async fn update(
        &self,
        ctx: &ApiContext,
        id: &str,
        account: &ServiceAccount,
    ) -> Result<ServiceAccount> {
        self.client
            .patch(ctx, &format!("{}/{}", SERVICE_ACCOUNTS_PATH, id), &[], account)
            .await
    }

    pub async fn delete(&self, ctx: &ApiContext, id: &str) -> Result<()> {
        self.client
            .delete(ctx, &format!("{}/{}", SERVICE_ACCOUNTS_PATH, id), &[])
            .await
    }
}

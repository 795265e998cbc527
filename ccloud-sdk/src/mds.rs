//! Metadata server API: role bindings.

use serde::{Deserialize, Serialize};

use crate::auth::{ApiContext, ApiFamily};
use crate::client::{ApiClient, Configuration};
use crate::error::Result;

const ROLE_BINDINGS_PATH: &str = "/iam/v2/role-bindings";

/// A role binding. Role bindings cannot be modified after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn_pattern: Option<String>,
}

#[derive(Clone)]
pub struct RoleBindingsApi {
    client: ApiClient,
}

impl RoleBindingsApi {
    pub fn new(config: Configuration) -> Self {
        Self {
            client: ApiClient::new(ApiFamily::Mds, config),
        }
    }

    pub async fn create(&self, ctx: &ApiContext, binding: &RoleBinding) -> Result<RoleBinding> {
        self.client.post(ctx, ROLE_BINDINGS_PATH, binding).await
    }

    pub async fn get(&self, ctx: &ApiContext, id: &str) -> Result<RoleBinding> {
        self.client
            .get(ctx, &format!("{}/{}", ROLE_BINDINGS_PATH, id), &[])
            .await
    }

    pub async fn delete(&self, ctx: &ApiContext, id: &str) -> Result<()> {
        self.client
            .delete(ctx, &format!("{}/{}", ROLE_BINDINGS_PATH, id), &[])
            .await
    }
}

//! Organization API (`/org/v2`): environments.

use serde::{Deserialize, Serialize};

use crate::auth::{ApiContext, ApiFamily};
use crate::client::{ApiClient, Configuration};
use crate::error::Result;

const ENVIRONMENTS_PATH: &str = "/org/v2/environments";

/// An environment. Unset fields are omitted from request bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Environment {
    pub fn with_display_name(display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: Some(display_name.into()),
        }
    }
}

/// Client for `/org/v2/environments`.
#[derive(Clone)]
pub struct EnvironmentsApi {
    client: ApiClient,
}

impl EnvironmentsApi {
    pub fn new(config: Configuration) -> Self {
        Self {
            client: ApiClient::new(ApiFamily::Org, config),
        }
    }

    pub async fn create(&self, ctx: &ApiContext, environment: &Environment) -> Result<Environment> {
        self.client.post(ctx, ENVIRONMENTS_PATH, environment).await
    }

    pub async fn get(&self, ctx: &ApiContext, id: &str) -> Result<Environment> {
        self.client
            .get(ctx, &format!("{}/{}", ENVIRONMENTS_PATH, id), &[])
            .await
    }

    pub async fn update(
        &self,
        ctx: &ApiContext,
        id: &str,
        environment: &Environment,
    ) -> Result<Environment> {
        self.client
            .patch(ctx, &format!("{}/{}", ENVIRONMENTS_PATH, id), &[], environment)
            .await
    }

    pub async fn delete(&self, ctx: &ApiContext, id: &str) -> Result<()> {
        self.client
            .delete(ctx, &format!("{}/{}", ENVIRONMENTS_PATH, id), &[])
            .await
    }
}

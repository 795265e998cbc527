//! Shared request plumbing for the per-family API clients.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::auth::{ApiContext, ApiFamily};
use crate::error::{ApiError, Result, error_message};
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Connection settings shared by every client of one family.
#[derive(Clone)]
pub struct Configuration {
    pub base_path: String,
    pub user_agent: String,
    pub transport: Arc<dyn Transport>,
}

impl Configuration {
    pub fn new(base_path: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
            user_agent: format!("ccloud-sdk/{}", env!("CARGO_PKG_VERSION")),
            transport,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Low-level client bound to one [`ApiFamily`].
///
/// Picks the family's credentials out of the [`ApiContext`] on every call.
#[derive(Clone)]
pub struct ApiClient {
    family: ApiFamily,
    config: Configuration,
}

impl ApiClient {
    pub fn new(family: ApiFamily, config: Configuration) -> Self {
        Self { family, config }
    }

    pub fn base_path(&self) -> &str {
        &self.config.base_path
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &ApiContext,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.send(ctx, Method::GET, path, query, None).await?;
        self.decode(path, &response)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        ctx: &ApiContext,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = self.encode(path, body)?;
        let response = self.send(ctx, Method::POST, path, &[], Some(body)).await?;
        self.decode(path, &response)
    }

    /// POST whose response body is ignored.
    pub async fn post_no_content<B: Serialize>(
        &self,
        ctx: &ApiContext,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let body = self.encode(path, body)?;
        self.send(ctx, Method::POST, path, &[], Some(body)).await?;
        Ok(())
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        ctx: &ApiContext,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        let body = self.encode(path, body)?;
        let response = self.send(ctx, Method::PATCH, path, query, Some(body)).await?;
        self.decode(path, &response)
    }

    pub async fn delete(&self, ctx: &ApiContext, path: &str, query: &[(&str, &str)]) -> Result<()> {
        self.send(ctx, Method::DELETE, path, query, None).await?;
        Ok(())
    }

    async fn send(
        &self,
        ctx: &ApiContext,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.config.base_path, path);
        let request = ApiRequest {
            method: method.clone(),
            url: url.clone(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
            basic_auth: ctx.basic_auth(self.family).cloned(),
            user_agent: self.config.user_agent.clone(),
        };

        let response = self.config.transport.execute(request).await?;
        if !response.is_success() {
            let message = error_message(&response.body);
            if response.status != 404 {
                warn!(family = %self.family, status = response.status, url = %url, "{}", message);
            }
            return Err(ApiError::Status {
                method: method.to_string(),
                url,
                status: response.status,
                message,
            });
        }
        Ok(response)
    }

    fn encode<B: Serialize>(&self, path: &str, body: &B) -> Result<serde_json::Value> {
        serde_json::to_value(body).map_err(|source| ApiError::Decode {
            url: format!("{}{}", self.config.base_path, path),
            source,
        })
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, response: &ApiResponse) -> Result<T> {
        // Some endpoints answer 204 with an empty body
        let body: &[u8] = if response.body.is_empty() {
            b"null"
        } else {
            &response.body
        };
        serde_json::from_slice(body).map_err(|source| ApiError::Decode {
            url: format!("{}{}", self.config.base_path, path),
            source,
        })
    }
}

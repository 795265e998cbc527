//! HTTP transport seam.
//!
//! API clients build [`ApiRequest`]s and hand them to a [`Transport`]. The
//! production implementation is [`HttpTransport`]; tests substitute their own.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::debug;

use crate::auth::BasicAuth;
use crate::error::{ApiError, Result};

/// A fully-resolved request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub basic_auth: Option<BasicAuth>,
    pub user_agent: String,
}

/// Raw response: status code plus body bytes.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes requests against the remote control plane.
///
/// Implementations perform exactly one attempt per call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header(USER_AGENT, &request.user_agent)
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(auth) = &request.basic_auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| ApiError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| ApiError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

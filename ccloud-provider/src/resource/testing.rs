//! Scripted transport for reconciler unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ccloud_sdk::{ApiRequest, ApiResponse, Transport};
use serde_json::Value;

use crate::client::Client;
use crate::config::ProviderConfig;

/// Answers requests from a queue and records every request it sees.
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response.
    pub fn respond(&self, status: u16, body: Value) {
        self.responses.lock().unwrap().push_back(ApiResponse {
            status,
            body: serde_json::to_vec(&body).unwrap(),
        });
    }

    /// Queue a response with no body.
    pub fn respond_empty(&self, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .push_back(ApiResponse { status, body: Vec::new() });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_called(&self) -> bool {
        !self.requests.lock().unwrap().is_empty()
    }

    /// Provider client wired to this transport.
    pub fn client(self: &Arc<Self>) -> Arc<Client> {
        let config = ProviderConfig::new("https://api.test", "org-key", "org-secret")
            .with_poll_interval(std::time::Duration::from_millis(1));
        Arc::new(Client::with_transport(&config, self.clone()))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: ApiRequest) -> ccloud_sdk::Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ApiResponse {
                status: 500,
                body: br#"{"errors":[{"detail":"no scripted response"}]}"#.to_vec(),
            }))
    }
}

/// A 404 in the v2 error format.
pub fn not_found() -> Value {
    serde_json::json!({"errors": [{"status": "404", "detail": "Not Found"}]})
}

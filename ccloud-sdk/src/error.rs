//! API error types.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the control-plane API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{method} {url} returned {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The response body did not match the expected model.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the remote reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type for API calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error body shapes used across the API families.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    /// v2 APIs: `{"errors": [{"detail": "..."}]}`
    V2 { errors: Vec<ErrorDetail> },
    /// Kafka REST v3: `{"error_code": 404, "message": "..."}`
    V3 { message: String },
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Extract a human-readable message from an error response body.
pub(crate) fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody::V2 { errors }) => {
            let details: Vec<String> = errors
                .into_iter()
                .filter_map(|e| e.detail.or(e.title))
                .collect();
            if details.is_empty() {
                String::from_utf8_lossy(body).into_owned()
            } else {
                details.join("; ")
            }
        }
        Ok(ErrorBody::V3 { message }) => message,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}

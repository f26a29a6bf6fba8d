//! Submission relay client.
//!
//! Forwards a resolved location and its temperature to the configured backend
//! as a single JSON POST. There is no retry and no request timeout; calling
//! `submit` twice posts twice.

use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;
use weatherdash_core::{AppError, NetworkError, ReqwestErrorExt};

/// Body posted to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    /// Location text as typed by the user
    pub location_id: String,
    pub temperature: f64,
}

/// What the backend answered.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResponse {
    /// HTTP status of the reply; any status with a JSON body is an answer
    pub status: u16,
    /// `message` field of the JSON body, when it is a string
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Invalid submission endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        AppError::Submission(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SubmissionClient {
    /// Create a client for `endpoint`. The URL is checked on each submit so
    /// that a missing endpoint surfaces as a failed submission.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SubmitError::Network(e.into_network_error()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// POST `request` as JSON and read the backend's reply.
    ///
    /// Any HTTP status is accepted as long as the body is JSON; transport
    /// failures and non-JSON bodies are errors.
    #[instrument(skip(self), level = "info")]
    pub async fn submit(
        &self,
        request: &SubmissionRequest,
    ) -> Result<SubmissionResponse, SubmitError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| SubmitError::InvalidEndpoint(format!("{:?}: {}", self.endpoint, e)))?;

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Submission endpoint returned status {}", status);
        }

        let body = response.text().await.map_err(|e| e.into_network_error())?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;

        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        Ok(SubmissionResponse {
            status: status.as_u16(),
            message,
        })
    }
}

// src/services/ask_client.rs
use tracing::{debug, error};

use crate::error::WidgetError;
use crate::message::{AskRequest, AskResponse};

/// Client for the upstream `POST /ask` endpoint.
#[derive(Debug, Clone)]
pub struct AskClient {
    endpoint: String,
    http: reqwest::Client,
}

impl AskClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        Self { endpoint: endpoint.into(), http }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One round-trip. Non-2xx statuses and undecodable bodies are errors.
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, WidgetError> {
        debug!(
            endpoint = %self.endpoint,
            has_session = request.session_id.is_some(),
            "sending question"
        );

        let response = self.http.post(&self.endpoint).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "chat endpoint rejected question");
            return Err(WidgetError::Status { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await?;
        let parsed: AskResponse = serde_json::from_slice(&bytes)?;
        debug!(session_id = %parsed.session_id, turns = parsed.history.len(), "received history");
        Ok(parsed)
    }
}

// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Shown in the transcript for every failed exchange, whatever the cause.
pub const CONNECTION_ERROR_MESSAGE: &str = "Error: Could not connect to the server. Please try again.";

/// A failed `/ask` exchange. The variants only matter for logging; the user
/// always sees [`CONNECTION_ERROR_MESSAGE`].
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("request to chat endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed chat response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl WidgetError {
    pub fn user_message(&self) -> &'static str {
        CONNECTION_ERROR_MESSAGE
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("page {0} not found or expired")]
    PageNotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::PageNotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

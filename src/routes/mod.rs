// src/routes/mod.rs
pub mod widget;

use std::path::Path;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use widget::{ask_handler, new_page_handler, page_handler, transcript_handler};

pub fn create_router(assets_dir: impl AsRef<Path>) -> Router<SharedState> {
    Router::new()
        .route("/", get(new_page_handler))
        .route("/pages/{page_id}", get(page_handler))
        .route("/pages/{page_id}/ask", post(ask_handler))
        .route("/pages/{page_id}/transcript", get(transcript_handler))
        .route("/health", get(|| async { "OK" }))
        .fallback_service(ServeDir::new(assets_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
}

// src/routes/widget.rs
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::info;

use crate::{
    error::AppError,
    render::escape_html,
    services::{page_manager::WidgetHandle, widget::Outcome},
    state::SharedState,
};

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

/// Every load of the widget root starts a new page without a session.
pub async fn new_page_handler(State(state): State<SharedState>) -> Redirect {
    let page_id = state.pages.create_page().await;
    info!(%page_id, "opened widget page");
    Redirect::to(&page_path(&page_id))
}

pub async fn page_handler(
    State(state): State<SharedState>,
    Path(page_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let widget = lookup(&state, &page_id).await?;
    let transcript = widget.lock().await.transcript().to_html();
    Ok(Html(render_page(&state.title, &page_id, &transcript)))
}

pub async fn transcript_handler(
    State(state): State<SharedState>,
    Path(page_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let widget = lookup(&state, &page_id).await?;
    let transcript = widget.lock().await.transcript().to_html();
    Ok(Html(transcript))
}

pub async fn ask_handler(
    State(state): State<SharedState>,
    Path(page_id): Path<String>,
    Form(form): Form<AskForm>,
) -> Result<Redirect, AppError> {
    let widget = lookup(&state, &page_id).await?;

    // The lock is released while waiting on the server so a second
    // submission from the same page is not blocked behind this one.
    let pending = widget.lock().await.begin(&form.question);
    if let Some(pending) = pending {
        let result = state.client.ask(&pending.request).await;
        let outcome = widget.lock().await.complete(pending, result);
        if outcome != Outcome::Answered {
            info!(%page_id, ?outcome, "question did not get an answer");
        }
    }

    Ok(Redirect::to(&page_path(&page_id)))
}

async fn lookup(state: &SharedState, page_id: &str) -> Result<WidgetHandle, AppError> {
    state
        .pages
        .get(page_id)
        .await
        .ok_or_else(|| AppError::PageNotFound(page_id.to_string()))
}

fn page_path(page_id: &str) -> String {
    format!("/pages/{page_id}")
}

pub fn render_page(title: &str, page_id: &str, transcript_html: &str) -> String {
    include_str!("../templates/widget.html")
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{PAGE_ID}}", &escape_html(page_id))
        .replace("{{TRANSCRIPT}}", transcript_html)
}

// src/state.rs
use std::sync::Arc;

use crate::config::WidgetConfig;
use crate::render::Renderer;
use crate::services::ask_client::AskClient;
use crate::services::page_manager::PageManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pages: PageManager,
    pub client: AskClient,
    pub title: String,
}

impl AppState {
    pub fn new(config: &WidgetConfig) -> Self {
        let renderer = Renderer::new(config.avatar_url.clone(), config.markdown);
        Self {
            pages: PageManager::new(renderer, config.render_policy, config.page_ttl()),
            client: AskClient::new(config.endpoint.clone()),
            title: config.title.clone(),
        }
    }
}

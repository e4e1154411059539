// src/services/page_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::RenderPolicy;
use crate::render::Renderer;
use crate::services::widget::ChatWidget;

pub type WidgetHandle = Arc<Mutex<ChatWidget>>;

#[derive(Debug)]
struct Page {
    widget: WidgetHandle,
    last_active: Instant,
}

/// Live widget pages. A page lasts as long as the browser keeps using it;
/// loading the widget again starts a new page with no session.
#[derive(Clone)]
pub struct PageManager {
    inner: Arc<RwLock<HashMap<String, Page>>>,
    renderer: Renderer,
    policy: RenderPolicy,
    ttl: Duration,
}

impl Debug for PageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageManager")
            .field("policy", &self.policy)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl PageManager {
    pub fn new(renderer: Renderer, policy: RenderPolicy, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            renderer,
            policy,
            ttl,
        }
    }

    // Create a page with a fresh widget and return its id.
    pub async fn create_page(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let page = Page {
            widget: Arc::new(Mutex::new(ChatWidget::new(self.renderer.clone(), self.policy))),
            last_active: Instant::now(),
        };

        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), page);
        id
    }

    /// Look up a page's widget and touch last_active.
    pub async fn get(&self, page_id: &str) -> Option<WidgetHandle> {
        let mut guard = self.inner.write().await;
        guard.get_mut(page_id).map(|page| {
            page.last_active = Instant::now();
            page.widget.clone()
        })
    }

    /// Remove a page by id
    pub async fn remove(&self, page_id: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(page_id).is_some()
    }

    /// Remove pages idle longer than ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, p| now.duration_since(p.last_active) < self.ttl);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

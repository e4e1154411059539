use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_widget::{config::WidgetConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_widget=info,tower_http=info")),
        )
        .init();

    let config = WidgetConfig::load().unwrap_or_else(|err| err.exit());
    let state = Arc::new(AppState::new(&config));

    // Sweep pages nobody has touched for a while.
    let pages = state.pages.clone();
    let sweep_every = config
        .page_ttl()
        .clamp(Duration::from_secs(1), Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            let removed = pages.purge_expired().await;
            if removed > 0 {
                info!(removed, "expired idle widget pages");
            }
        }
    });

    let endpoint = state.client.endpoint().to_string();
    let app = routes::create_router(&config.assets_dir)
        .with_state(state)
        .layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        addr = %config.bind_addr,
        %endpoint,
        policy = ?config.render_policy,
        "chat widget running"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use invitation_studio::{config::Config, gemini::GeminiClient, routes::{prune_idle_sessions, router, AppState}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    if config.demo_mode() {
        tracing::warn!("⚠️ GEMINI_API_KEY not set, serving placeholder images");
    } else {
        tracing::info!("Using API key: {}", config.masked_key());
    }

    let gemini = GeminiClient::new(&config).context("building Gemini client")?;
    let state = AppState::new(Arc::new(gemini));

    let max_idle = chrono::Duration::from_std(config.session_idle).context("SESSION_IDLE_MINUTES out of range")?;
    let store = state.store.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            ticker.tick().await;
            prune_idle_sessions(&store, max_idle);
        }
    });

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, "Starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

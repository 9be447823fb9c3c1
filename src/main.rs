mod api_doc;
mod app;
mod auth;
mod config;
mod error;
mod handlers;
mod kv;
mod models;
mod response;
mod routes;
mod state;
mod store;
mod validation;

use anyhow::Context;
use config::Config;
use state::AppState;
use std::sync::Arc;
use store::BookingStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_registry=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("booking-registry starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store = kv::from_config(&config).await?.map(BookingStore::new);

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let state = AppState {
        config: Arc::new(config),
        store,
    };
    let app = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("booking-registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

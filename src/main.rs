// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::cache::SystemClock;
use crate::application::dashboard_service::DashboardService;
use crate::application::sheet_loader::SheetLoader;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_sheet_source::HttpSheetSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_dashboard, health_check, list_variants};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Arc::new(load_dashboard_config()?);

    // Create sheet source (infrastructure layer)
    let source = Arc::new(HttpSheetSource::new(Duration::from_secs(config.http.timeout_secs))?);

    // Create services (application layer)
    let loader = SheetLoader::new(source, Arc::new(SystemClock), config.cache.ttl());
    let dashboard_service = DashboardService::new(loader, config.clone());

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/variants", get(list_variants))
        .route("/dashboards/:id", get(get_dashboard))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        "Starting entity-dashboard service on {} ({} dashboards, cache ttl {}s)",
        addr,
        config.variants.len(),
        config.cache.ttl_secs
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

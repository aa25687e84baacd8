// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{Router, routing::get};
use std::{net::SocketAddr, sync::Arc};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::infrastructure::config::{build_source, load_app_config};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_cohort_totals, get_funnel, get_summary, get_view, get_volume, health_check, list_programs,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Load the dataset once (infrastructure layer) and build the service (application layer)
    let source = build_source(&config.dataset);
    let dashboard = DashboardService::from_source(source.as_ref())?;

    // Create application state
    let state = Arc::new(AppState { dashboard });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/programs", get(list_programs))
        .route("/programs/:program/view", get(get_view))
        .route("/programs/:program/summary", get(get_summary))
        .route("/programs/:program/volume", get(get_volume))
        .route("/programs/:program/cohorts", get(get_cohort_totals))
        .route("/funnel", get(get_funnel))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting admissions-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

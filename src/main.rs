//! SpillSim Engine - Backend API for oil spill scenario management
//!
//! The Engine is the backend server that:
//! - Holds one simulation model per client session
//! - Serves the scenario object graph over a JSON REST API
//! - Resolves cross-object references through a per-session registry

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spillsim_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SpillSim Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Port: {}", config.server_port);
    tracing::info!("  Session idle timeout: {}m", config.session_idle_minutes);

    // Initialize application state
    let server_port = config.server_port;
    let sweep_interval = config.sweep_interval_secs;
    let state = Arc::new(AppState::new(config));
    tracing::info!("Application state initialized");

    // Session sweep worker (drops workspaces idle past the timeout)
    let sweep_worker = {
        let state = state.clone();
        tokio::spawn(async move {
            tracing::info!("Starting session sweep worker");
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(sweep_interval)).await;
                let removed = state.sessions.write().await.sweep(chrono::Utc::now());
                if removed > 0 {
                    tracing::info!("Swept {} idle session(s)", removed);
                }
            }
        })
    };

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        // Merge REST API routes
        .merge(http::create_routes())
        .layer(middleware::from_fn(http::session_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    let server = axum::serve(listener, app);

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping workers...");
            sweep_worker.abort();
            tracing::info!("Workers stopped");
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

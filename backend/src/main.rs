//! HEALER Backend
//!
//! Turns a health profile into five personalized meal recommendations.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Recommendation flow, fallback catalog, sessions, PDF export
//! - Generator: External generation service behind a trait

use anyhow::Result;
use healer_backend::{
    config, routes,
    services::{generator, session},
    state::AppState,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting HEALER Backend"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config);
    }

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    let generator = generator::from_config(&config.ai);
    info!(
        generator = generator.name(),
        model = %config.ai.model,
        "Generation backend selected"
    );

    // Create application state
    let state = AppState::with_generator(config.clone(), generator).with_metrics(metrics_handle);

    // Evict idle sessions in the background
    let sweep = session::spawn_idle_sweep(
        state.sessions.store().clone(),
        Duration::from_secs(config.server.session_ttl_secs),
        Duration::from_secs(config.server.session_sweep_interval_secs.max(1)),
    );

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "healer_backend=info,tower_http=info".into()
        } else {
            "healer_backend=debug,tower_http=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Warn about production settings that silently degrade the service
fn validate_production_config(config: &config::AppConfig) {
    if config.ai.enabled && config.ai.api_key.is_none() {
        warn!(
            "No {} configured - every request will be served from the fallback catalog",
            config::API_KEY_ENV
        );
    }

    if config.server.host == "127.0.0.1" || config.server.host == "localhost" {
        warn!("Server bound to localhost - ensure this is intentional for production");
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

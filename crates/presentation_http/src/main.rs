//! TaskSage HTTP Server
//!
//! Main entry point for the HTTP API server.

use std::future::IntoFuture;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use infrastructure::{AppConfig, Environment, build_suggestion_service, init_tracing};
use presentation_http::{error::set_expose_internal_errors, routes, state::AppState};
use tokio::{net::TcpListener, signal, sync::oneshot};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "TaskSage starting");
    info!(
        environment = %config.environment,
        provider = %config.inference.provider,
        model = %config.inference.default_model,
        "Configuration loaded"
    );

    set_expose_internal_errors(config.environment != Environment::Production);

    let service = build_suggestion_service(&config)?;
    if !service.is_inference_enabled() {
        warn!("Remote inference disabled; serving rule-based suggestions only");
    }

    let cors_layer = if config.server.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    };

    let addr = config.server.bind_address();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let app = routes::create_router(AppState::new(service, config)).layer(cors_layer);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");

    let (draining_tx, draining_rx) = oneshot::channel();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = draining_tx.send(());
    });

    // In-flight requests get `shutdown_timeout` to finish once draining starts
    let drain_deadline = async move {
        if draining_rx.await.is_ok() {
            tokio::time::sleep(shutdown_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server.into_future() => result?,
        () = drain_deadline => warn!(timeout = ?shutdown_timeout, "Shutdown timed out, dropping open connections"),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

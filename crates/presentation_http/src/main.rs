//! Rail Madad Gateway
//!
//! Main entry point for the authenticating reverse proxy.

use std::{any::Any, sync::Arc, time::Duration};

use anyhow::Context;
use application::ports::UpstreamPort;
use axum::response::{IntoResponse, Response};
use infrastructure::{AppConfig, HttpUpstreamAdapter, SecurityValidator};
use presentation_http::{
    ApiError, ReloadableConfig, cors_layer, routes, spawn_config_reload_handler, state::AppState,
};
use tokio::{net::TcpListener, signal, sync::watch};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "railmadad_gateway=info,presentation_http=info,application=info,infrastructure=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = AppConfig::load();
    init_tracing(loaded.as_ref().map_or("text", |c| c.server.log_format.as_str()));

    info!("Rail Madad gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let initial_config = loaded.context("Failed to load configuration")?;

    // Security validation
    let warnings = SecurityValidator::validate(&initial_config);
    SecurityValidator::log_warnings(&warnings);
    if SecurityValidator::should_block_startup(&initial_config, &warnings) {
        anyhow::bail!(
            "Refusing to start in production with critical security issues \
             (set RAILMADAD_ALLOW_INSECURE_CONFIG=true to override)"
        );
    }

    let upstream: Arc<dyn UpstreamPort> = Arc::new(
        HttpUpstreamAdapter::new(&initial_config.upstream)
            .context("Failed to initialize upstream client")?,
    );

    // Create reloadable config and spawn SIGHUP handler
    let reloadable_config = spawn_config_reload_handler(
        ReloadableConfig::new(initial_config.clone()).context("Invalid gateway configuration")?,
    );

    let topology = reloadable_config.topology();
    info!(
        host = %initial_config.server.host,
        port = %initial_config.server.port,
        default_target = %topology.default_target(),
        targets = topology.routing().len(),
        credentials = topology.credentials().len(),
        upstream_timeout_secs = initial_config.upstream.timeout_secs,
        "Configuration loaded"
    );

    let state = AppState::new(reloadable_config, upstream);

    // Add middleware (order matters: last added = outermost)
    let app = routes::create_router(state)
        .layer(cors_layer(&initial_config.server))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response));

    let addr = initial_config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Gateway listening on http://{}", addr);
    info!("SIGHUP for config reload is enabled (Unix only)");

    let shutdown_timeout =
        Duration::from_secs(initial_config.server.shutdown_timeout_secs.unwrap_or(30));
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        info!("Waiting up to {:?} for connections to close", shutdown_timeout);
        let _ = shutdown_tx.send(true);
    });

    tokio::select! {
        result = server.into_future() => result?,
        () = async {
            let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(shutdown_timeout).await;
        } => warn!("Shutdown timeout elapsed, dropping remaining connections"),
    }

    info!("Gateway shutdown complete");

    Ok(())
}

fn init_tracing(log_format: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Turn a handler panic into the standard 500 body
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
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
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

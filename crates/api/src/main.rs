use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use attendance_core::clock::SystemClock;
use attendance_core::engine::AttendanceEngine;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attendance_api::background::verdict_sweeper;
use attendance_api::config::ServerConfig;
use attendance_api::router::build_app_router;
use attendance_api::state::AppState;

/// How long the sweeper gets to finish its current pass after shutdown.
const SWEEPER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "attendance_api=debug,attendance_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        pre_offset_min = config.engine.pre_offset.num_minutes(),
        post_offset_min = config.engine.post_offset.num_minutes(),
        utc_offset = %config.engine.utc_offset,
        sweep_interval_secs = config.sweep_interval_secs,
        retention_days = ?config.retention_days,
        "Loaded attendance configuration"
    );

    let engine = Arc::new(
        AttendanceEngine::new(config.engine.clone(), Arc::new(SystemClock))
            .expect("Engine configuration rejected"),
    );

    // One token stops both the HTTP server and the sweeper.
    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let sweeper = tokio::spawn(verdict_sweeper::run(
        Arc::clone(&engine),
        Duration::from_secs(config.sweep_interval_secs),
        config.retention_days,
        shutdown.child_token(),
    ));

    let app = build_app_router(
        AppState {
            engine,
            config: Arc::new(config.clone()),
        },
        &config,
    );

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Attendance API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .expect("Server error");

    // The server also returns on its own errors; make sure the sweeper stops.
    shutdown.cancel();
    if tokio::time::timeout(SWEEPER_STOP_TIMEOUT, sweeper).await.is_err() {
        tracing::warn!("Verdict sweeper did not stop in time");
    }
    tracing::info!("Shutdown complete");
}

/// Cancel `shutdown` on SIGINT, or on SIGTERM where available.
async fn wait_for_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("Failed to install Ctrl-C handler");
                tracing::info!("SIGINT received, shutting down");
            }
            _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        tracing::info!("Ctrl-C received, shutting down");
    }

    shutdown.cancel();
}

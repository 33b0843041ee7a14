use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parttrack_api::config::ServerConfig;
use parttrack_api::router::build_app_router;
use parttrack_api::state::AppState;
use parttrack_engine::LifecycleEngine;
use parttrack_events::EventBus;
use parttrack_scheduler::{AutoMoveScheduler, SchedulerConfig};
use parttrack_store::{LockManager, PartStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parttrack=debug,parttrack_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Core components ---
    let event_bus = Arc::new(EventBus::default());
    let store = Arc::new(PartStore::new());
    let locks = Arc::new(LockManager::new(Arc::clone(&event_bus)));
    let engine = Arc::new(LifecycleEngine::new(
        Arc::clone(&store),
        Arc::clone(&locks),
        Arc::clone(&event_bus),
    ));
    tracing::info!("Record store, lock manager and lifecycle engine created");

    // --- Auto-move scheduler ---
    let scheduler_config = SchedulerConfig::from_env();
    let scheduler = AutoMoveScheduler::new(
        Arc::clone(&store),
        Arc::clone(&locks),
        Arc::clone(&engine),
        scheduler_config,
    );
    let scheduler_cancel = tokio_util::sync::CancellationToken::new();
    let scheduler_cancel_clone = scheduler_cancel.clone();
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_cancel_clone).await;
    });
    tracing::info!("Auto-move scheduler started");

    // --- App state ---
    let state = AppState {
        store,
        locks,
        engine,
        event_bus,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    scheduler_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), scheduler_handle).await;
    tracing::info!("Auto-move scheduler stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

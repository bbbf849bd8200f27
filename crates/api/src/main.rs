use std::net::SocketAddr;
use std::sync::Arc;

use pitchdeck_core::catalog::DefaultCatalog;
use pitchdeck_db::{MemorySlideStore, PgSlideStore, SlideStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitchdeck_api::config::ServerConfig;
use pitchdeck_api::router::build_app_router;
use pitchdeck_api::state::AppState;
use pitchdeck_api::uploads::UploadStorage;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pitchdeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        env = %config.app_env,
        "Loaded server configuration"
    );

    // --- Catalog ---
    let catalog = match &config.deck_catalog_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Failed to read DECK_CATALOG_PATH {}: {e}", path.display()));
            DefaultCatalog::from_json(&json).expect("DECK_CATALOG_PATH must hold a valid slide catalog")
        }
        None => DefaultCatalog::embedded().expect("Embedded slide catalog is invalid"),
    };
    tracing::info!(slides = catalog.len(), "Loaded slide catalog");

    // --- Content store ---
    let store: Arc<dyn SlideStore> = match &config.database_url {
        Some(database_url) => {
            let pool = pitchdeck_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            pitchdeck_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            pitchdeck_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgSlideStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, slide edits are kept in memory only");
            Arc::new(MemorySlideStore::new())
        }
    };

    // --- App state ---
    let state = AppState {
        store,
        catalog: Arc::new(catalog),
        uploads: Arc::new(UploadStorage::new(config.upload_dir.clone())),
        config: Arc::new(config.clone()),
    };

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

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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

//! eventry server entry point.
//!
//! Starts the Axum HTTP server and the background archival sweep.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use eventry::api;
use eventry::app_state::AppState;
use eventry::assets::{AssetCleaner, HttpAssetCleaner, NoopAssetCleaner};
use eventry::config::DirectoryConfig;
use eventry::persistence::{AuditLog, CounterStore, DirectoryStore};
use eventry::scheduler;
use eventry::service::{ArchiveService, DuplicateService, LifecycleService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = DirectoryConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting eventry");

    // Connect to PostgreSQL and apply migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    // Build persistence handles
    let store = DirectoryStore::new(pool.clone());
    let counters = CounterStore::new(pool.clone());
    let audit = AuditLog::new(pool);

    // Asset cleanup collaborator
    let cleaner: Arc<dyn AssetCleaner> = if config.asset_storage_url.is_empty() {
        tracing::warn!("ASSET_STORAGE_URL not set; asset cleanup disabled");
        Arc::new(NoopAssetCleaner)
    } else {
        Arc::new(HttpAssetCleaner::new(
            config.asset_storage_url.clone(),
            config.asset_storage_token.clone(),
        ))
    };

    // Build service layer
    let lifecycle = Arc::new(LifecycleService::new(
        store.clone(),
        counters.clone(),
        audit.clone(),
    ));
    let archive = Arc::new(ArchiveService::new(
        store.clone(),
        counters.clone(),
        audit.clone(),
        cleaner,
        config.sweep_award_counts,
    ));
    let duplicates = Arc::new(DuplicateService::new(
        store.clone(),
        counters,
        audit.clone(),
        config.merge_reconcile_counts,
    ));

    // Background archival sweep
    if config.sweep_enabled {
        let _ = scheduler::spawn_sweep((*archive).clone(), config.sweep_interval_secs);
        tracing::info!(
            interval_secs = config.sweep_interval_secs,
            "archival sweep scheduled"
        );
    } else {
        tracing::info!("archival sweep disabled");
    }

    // Build application state
    let app_state = AppState {
        store,
        lifecycle,
        archive,
        duplicates,
        audit,
    };

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

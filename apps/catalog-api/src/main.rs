use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod config;
mod openapi;

use config::Config;
use domain_catalog::{CatalogService, PgCatalogRepository, handlers};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    // Connect to PostgreSQL with retry (the database may still be coming up)
    let db = database::postgres::connect_from_config_with_retry(
        &config.database,
        RetryConfig::new().with_max_retries(5),
    )
    .await
    .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    // Apply pending migrations at startup
    database::postgres::run_migrations::<Migrator>(&db)
        .await
        .map_err(|e| eyre::eyre!("Migration failed: {}", e))?;

    // Wire repository -> service -> router
    let repository = PgCatalogRepository::new(db.clone());
    let service = CatalogService::new(repository);
    let api_routes = handlers::router(service);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge the /health liveness endpoint into the app
    let app = router.merge(health_router(config.app.clone()));

    info!("Starting catalog API");

    // Production-ready server with graceful shutdown and cleanup
    create_production_app(
        app,
        &config.server,
        Duration::from_secs(30), // 30s graceful shutdown timeout
        async move {
            info!("Shutting down: closing database connection");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}

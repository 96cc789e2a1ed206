use anyhow::Result;
use tracing::info;

use inventory_logs_api::{app, config, middleware};
use persistence::db::RegionPools;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);

    info!(
        "Starting Inventory Logs API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize metrics recorder before any requests arrive
    middleware::metrics::init_metrics();

    // Connect one pool per configured region
    let pools = RegionPools::connect(
        &config.region_configs(),
        &config.database.default_region,
        &config.pool_settings(),
    )
    .await?;

    // Run migrations against every region
    info!("Running database migrations...");
    for (region, pool) in pools.iter() {
        sqlx::migrate!("../persistence/src/migrations")
            .run(pool)
            .await?;
        info!(region, "Migrations completed");
    }

    // Build application
    let app = app::create_app(config.clone(), pools);

    // Start server
    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

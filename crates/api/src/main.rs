use anyhow::Result;
use std::time::Duration;
use tracing::info;

use finboard_api::{app, config, jobs, middleware, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::metrics::init_metrics();

    info!("Starting Finboard API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::connect_pool(
        &config.database.url,
        persistence::db::PoolSettings {
            max_connections: config.database.max_connections,
            min_connections: config.database.min_connections,
            connect_timeout: Duration::from_secs(config.database.connect_timeout_secs),
            idle_timeout: Duration::from_secs(config.database.idle_timeout_secs),
        },
    )
    .await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    services::bootstrap::bootstrap_admin(&pool, &config.auth).await?;

    let http = reqwest::Client::new();
    let mut scheduler = jobs::JobScheduler::new();
    scheduler.register(jobs::ExpireAccountsJob::new(
        pool.clone(),
        http,
        config.jobs.expiry_sweep_minutes,
    ));
    scheduler.register(jobs::PoolMetricsJob::new(pool.clone()));
    scheduler.start();

    let app = app::create_app(config.clone(), pool);

    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

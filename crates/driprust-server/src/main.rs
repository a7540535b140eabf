//! DripRust - SMS campaign service entry point

use anyhow::Result;
use driprust_common::config::{Config, LoggingConfig};
use driprust_core::SmsGatewayClient;
use driprust_storage::db::DatabasePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config.logging);

    info!(
        "Starting DripRust campaign service on {}...",
        config.server.hostname
    );

    // Initialize database
    let db_pool = DatabasePool::new(&config.database).await?;
    info!("Database connection established");

    // Run migrations
    db_pool.migrate().await?;
    info!("Database migrations completed");

    // Initialize SMS gateway client
    let transport = Arc::new(SmsGatewayClient::new(config.gateway.clone()));
    let send_delay = Duration::from_millis(config.gateway.send_delay_ms);

    // Start API server
    let api_handle = {
        let db_pool = db_pool.clone();
        let bind_address = config.server.bind_address.clone();
        let api_port = config.api.port;
        tokio::spawn(async move {
            let app = driprust_api::create_router(db_pool, transport, send_delay);
            let listener =
                tokio::net::TcpListener::bind(format!("{}:{}", bind_address, api_port))
                    .await
                    .expect("Failed to bind API server");
            info!("Starting API server on port {}", api_port);
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("API server error: {}", e);
            }
        })
    };

    info!("DripRust server started successfully");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    api_handle.abort();

    info!("DripRust server shutdown complete");

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},driprust=debug", config.level)));

    if config.format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true).with_level(true))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .init();
    }
}

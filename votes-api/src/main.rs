//! Votes API Main Entry Point
//!
//! Serves the vote ledger over HTTP: members cast up to three votes per
//! quarter for restoration projects, list votes and retract them.

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use votes_api::config::LogFormat;
use votes_api::{Config, Dependencies, ServiceError, server};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("votes_api=info,votes_ledger=info,votes_repository=info")
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init(),
    };
    result.map_err(|e| ServiceError::Tracing(e.to_string()))?;

    info!(
        service_name = "votes-api",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format)?;

    info!(store = ?config.store_backend, addr = %config.server_addr, "Starting Votes API");

    let dependencies = match Dependencies::new(&config).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let app = server::create_app(
        dependencies.ledger.clone(),
        config.cors_allowed_origins.clone(),
    );
    let result = server::run_server(app, config.server_addr, shutdown_signal()).await;

    if let Some(pool) = dependencies.pool {
        pool.close().await;
    }

    match result {
        Ok(()) => {
            info!("Votes API stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Votes API failed");
            Err(e)
        }
    }
}

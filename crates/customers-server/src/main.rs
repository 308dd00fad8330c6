//! Server binary for the customer records service.
//!
//! Wires configuration, logging, the `PostgreSQL` pool, the persistence
//! gateway and the HTTP router together and serves until shutdown.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `customers-config.yaml` (or defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Connect the `PostgreSQL` pool
//! 4. Build the gateway over the pool
//! 5. Serve the HTTP API until a shutdown signal
//! 6. Close the pool

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use customers_api::AppState;
use customers_db::{CustomerGateway, PgCustomerStore, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSection, ServiceConfig};
use crate::error::AppError;

/// Default location of the configuration file.
const CONFIG_PATH: &str = "customers-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the server itself fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        host = config.server.host,
        port = config.server.port,
        max_connections = config.database.max_connections,
        statement_timeout_ms = config.database.statement_timeout_ms,
        listing_policy = ?config.gateway.listing_policy,
        "Configuration loaded"
    );

    // 3. Connect the pool.
    let pool = PostgresPool::connect(&config.postgres_config()).await?;

    // 4. Build the gateway; the pool handle is injected, never global.
    let gateway = CustomerGateway::new(PgCustomerStore::new(&pool), config.gateway_config());
    let state = Arc::new(AppState::new(gateway));

    // 5. Serve.
    let served = customers_api::start_server(&config.server_config(), state).await;

    // 6. Close the pool whether or not serving succeeded.
    pool.close().await;
    served?;

    info!("customers-server exited cleanly");
    Ok(())
}

/// Load configuration from `customers-config.yaml`.
///
/// If the file does not exist, defaults (plus env overrides) are used.
fn load_config() -> Result<ServiceConfig, AppError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(ServiceConfig::from_file(config_path)?)
    } else {
        Ok(ServiceConfig::from_env()?)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingSection) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| AppError::Logging {
        message: format!("{e}"),
    })
}

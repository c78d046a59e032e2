//! Settlement API Server
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin settlement-api
//!
//! API_PORT=9000 API_DATABASE_URL=postgres://... API_REDIS_URL=redis://... cargo run --bin settlement-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_REDIS_URL` - Redis connection string; the server starts without it
//! * `API_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `API_ENVIRONMENT` - `production` redacts internal errors
//! * `API_DEFAULT_COMMISSION_PERCENT` - Seed for the global commission (default: 10)

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::HealthCheckable;
use infra_db::adapters::{
    PostgresCheckinCodeAdapter, PostgresInvoiceAdapter, PostgresLodgingAdapter,
    PostgresSettingsAdapter, PostgresTransportAdapter,
};
use infra_db::{create_pool, run_migrations, DatabaseConfig};
use infra_realtime::RedisDriverNotifier;
use interface_api::{config::ApiConfig, create_router, AppState, SettlementPorts};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid API configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        environment = %config.environment,
        "Starting settlement API server"
    );

    let pool = create_pool(DatabaseConfig::new(config.database_url.clone()))
        .await
        .context("failed to connect to PostgreSQL")?;
    run_migrations(&pool).await.context("failed to apply migrations")?;

    // Redis being down only degrades trip fan-out.
    let notifier = Arc::new(
        RedisDriverNotifier::connect(&config.redis_url)
            .await
            .context("invalid Redis URL")?,
    );

    let lodging = Arc::new(PostgresLodgingAdapter::new(pool.clone()));
    let ports = SettlementPorts {
        lodging: lodging.clone(),
        invoices: Arc::new(PostgresInvoiceAdapter::new(pool.clone())),
        codes: Arc::new(PostgresCheckinCodeAdapter::new(pool.clone())),
        transport: Arc::new(PostgresTransportAdapter::new(pool.clone())),
        settings: Arc::new(PostgresSettingsAdapter::new(pool)),
        notifier: notifier.clone(),
    };
    let probes: Vec<Arc<dyn HealthCheckable>> = vec![lodging, notifier];

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid server address")?;
    let app = create_router(AppState::from_ports(ports, probes, config));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

//! Billing Sync - API Server Binary
//!
//! Starts the HTTP API server. On startup the direct billing integration is
//! probed once; the server comes up either way.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin billing-sync-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... API_BILLING__API_KEY_ID=... cargo run --bin billing-sync-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! * `API_BILLING__API_KEY_ID` - Vault key id holding the billing API key
//! * `API_BILLING__SCHEMA`, `API_BILLING__TABLE` - Foreign table location

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_customer::{CapabilityRegistry, OrganizationLifecycle};
use infra_db::{
    create_pool, DatabaseConfig, DatabasePool, PostgresOrganizationAdapter,
    PostgresUserDirectory, WrappersInstaller,
};
use interface_api::{
    config::{ApiConfig, LogFormat},
    create_router, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting billing sync API server"
    );

    let pool = create_pool(
        DatabaseConfig::new(&config.database_url)
            .max_connections(config.database_max_connections)
            .application_name("billing-sync-api"),
    )
    .await
    .context("connecting to database")?;

    run_migrations(&pool).await?;

    // Probe once; every later request sees the same snapshot
    let registry = CapabilityRegistry::new();
    let installer = WrappersInstaller::new(pool.clone(), config.billing.clone());
    let capability = registry.initialize(&installer).await;

    if capability.is_available() {
        tracing::info!("Direct billing integration enabled");
    } else {
        tracing::warn!(
            failed_steps = ?capability.report().failed_steps(),
            "Direct billing integration unavailable; organizations will be linked asynchronously"
        );
    }

    let store = Arc::new(PostgresOrganizationAdapter::new(pool.clone()));
    let users = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let lifecycle = OrganizationLifecycle::new(store.clone(), &capability, users);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    let app = create_router(AppState {
        lifecycle,
        capability,
        readiness: store,
        config,
    });

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads configuration from the environment, falling back to defaults
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration ({e}); using defaults");
        ApiConfig::default()
    })
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
    }
}

async fn run_migrations(pool: &DatabasePool) -> anyhow::Result<()> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("applying migrations")?;

    tracing::info!("Database ready");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
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

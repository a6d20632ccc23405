//! Seat booking HTTP server.
//!
//! Wires Postgres-backed stores into the booking and query services and
//! serves the public API.

use seatbook_core::{BookingService, QueryService};
use seatbook_postgres::{
    PostgresIdempotencyStore, PostgresSeatLedger, PostgresSessionCatalog,
};
use seatbook_web::{build_router, AppState, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatbook=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env if present, then configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    info!(
        postgres_url = %config.postgres.url,
        port = config.server.port,
        "Configuration loaded"
    );

    // Metrics exporter on its own port
    let metrics_addr: SocketAddr =
        format!("{}:{}", config.server.metrics_host, config.server.metrics_port).parse()?;
    seatbook_web::metrics::install(metrics_addr)?;

    // Connect to Postgres and bring the schema up to date
    info!("Connecting to database...");
    let pool = seatbook_postgres::connect(&config.postgres.url, config.postgres.max_connections)
        .await?;
    seatbook_postgres::migrate(&pool).await?;
    info!("Database ready");

    // Wire storage into the domain services
    let catalog = Arc::new(PostgresSessionCatalog::new(pool.clone()));
    let ledger = Arc::new(PostgresSeatLedger::new(pool.clone()));
    let idempotency = Arc::new(PostgresIdempotencyStore::new(pool));

    let bookings = BookingService::new(catalog.clone(), ledger.clone(), idempotency);
    let queries = QueryService::new(catalog.clone(), ledger);
    let state = AppState::new(catalog, bookings, queries);

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}

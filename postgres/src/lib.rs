//! `PostgreSQL` storage backend for Seatbook.
//!
//! Implements the core storage contracts with sqlx:
//!
//! - [`PostgresSessionCatalog`] — the append-only sessions table
//! - [`PostgresSeatLedger`] — the reservations table; the
//!   one-confirmed-booking-per-seat invariant is a partial unique index on
//!   `(session_id, seat_number) WHERE status = 'CONFIRMED'`, making the
//!   insert in `reserve` the atomic check-and-insert the contract requires
//! - [`PostgresIdempotencyStore`] — recorded booking outcomes as JSONB
//!
//! Because the invariant lives in the database, it holds across any number
//! of concurrently running service instances; no in-process locking is
//! involved anywhere in this crate.
//!
//! # Example
//!
//! ```ignore
//! use seatbook_postgres::{connect, migrate, PostgresSeatLedger};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = connect("postgres://localhost/seatbook", 10).await?;
//!     migrate(&pool).await?;
//!     let ledger = PostgresSeatLedger::new(pool);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod catalog;
mod idempotency;
mod ledger;

pub use catalog::PostgresSessionCatalog;
pub use idempotency::PostgresIdempotencyStore;
pub use ledger::PostgresSeatLedger;

use seatbook_core::{BookingError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect a pool to the booking database.
///
/// # Errors
///
/// Returns [`BookingError::Storage`] if the connection cannot be
/// established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| BookingError::Storage(format!("Failed to connect: {e}")))
}

/// Run the schema migrations.
///
/// Safe to call on every startup; already-applied migrations are skipped.
///
/// # Errors
///
/// Returns [`BookingError::Storage`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| BookingError::Storage(format!("Migration failed: {e}")))?;
    Ok(())
}

/// Map a sqlx error to the transient storage variant with context.
pub(crate) fn storage_error(context: &str, err: &sqlx::Error) -> BookingError {
    BookingError::Storage(format!("{context}: {err}"))
}

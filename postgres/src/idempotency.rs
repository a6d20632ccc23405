//! `PostgreSQL` idempotency store.
//!
//! Terminal booking outcomes are recorded as JSONB keyed by
//! (user, idempotency key). Stored in the booking database rather than a
//! cache so a recorded outcome survives restarts: the whole point of the key
//! is to answer retries of requests whose response was lost.

use crate::storage_error;
use async_trait::async_trait;
use seatbook_core::{BookingError, BookingOutcome, IdempotencyStore, Result, UserId};
use sqlx::PgPool;

/// Idempotency store backed by the `booking_idempotency` table.
#[derive(Clone)]
pub struct PostgresIdempotencyStore {
    pool: PgPool,
}

impl PostgresIdempotencyStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdempotencyStore for PostgresIdempotencyStore {
    async fn get(&self, user_id: UserId, key: &str) -> Result<Option<BookingOutcome>> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT outcome FROM booking_idempotency
             WHERE user_id = $1 AND idempotency_key = $2",
        )
        .bind(user_id.as_uuid())
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to read idempotency record", &e))?;

        row.map(|(value,)| {
            serde_json::from_value(value).map_err(|e| {
                BookingError::Storage(format!("corrupt idempotency record: {e}"))
            })
        })
        .transpose()
    }

    async fn put(&self, user_id: UserId, key: &str, outcome: &BookingOutcome) -> Result<()> {
        let value = serde_json::to_value(outcome)
            .map_err(|e| BookingError::Storage(format!("unserializable outcome: {e}")))?;

        // First write wins; a concurrent retry that lost the race keeps the
        // originally recorded outcome.
        sqlx::query(
            "INSERT INTO booking_idempotency (user_id, idempotency_key, outcome)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, idempotency_key) DO NOTHING",
        )
        .bind(user_id.as_uuid())
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to record idempotency outcome", &e))?;

        Ok(())
    }
}

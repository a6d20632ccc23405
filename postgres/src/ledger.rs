//! `PostgreSQL` seat ledger.
//!
//! `reserve` is implemented as a plain INSERT guarded by the partial unique
//! index `ux_reservations_confirmed_seat`. The database serializes concurrent
//! inserts for the same (session, seat): exactly one commits, every other
//! caller receives a unique-violation error which maps to `Conflict`. There
//! is no check-then-write window and no in-process lock.

use crate::storage_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use seatbook_core::{
    BookingError, BookingId, Reservation, ReservationStatus, Result, SeatLedger, SeatNumber,
    SessionId, UserId,
};
use sqlx::PgPool;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Row shape shared by the reservation queries.
type ReservationRow = (
    i64,
    i64,
    i32,
    Uuid,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

#[allow(clippy::cast_sign_loss)] // seat_number is CHECK-constrained positive
fn reservation_from_row(row: ReservationRow) -> Result<Reservation> {
    let (id, session_id, seat_number, user_id, status, created_at, updated_at) = row;
    let status = ReservationStatus::from_str_opt(&status)
        .ok_or_else(|| BookingError::Storage(format!("unknown reservation status: {status}")))?;
    Ok(Reservation {
        id: BookingId::new(id),
        session_id: SessionId::new(session_id),
        seat_number: SeatNumber::new(seat_number as u32),
        user_id: UserId::from_uuid(user_id),
        status,
        created_at,
        updated_at,
    })
}

/// Seat ledger backed by the `reservations` table.
#[derive(Clone)]
pub struct PostgresSeatLedger {
    pool: PgPool,
}

impl PostgresSeatLedger {
    /// Create a ledger over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatLedger for PostgresSeatLedger {
    async fn reserve(
        &self,
        session_id: SessionId,
        seat: SeatNumber,
        user_id: UserId,
    ) -> Result<Reservation> {
        // Capacity lookup for range validation. Sessions are immutable after
        // creation, so the capacity read here cannot go stale before the
        // insert below.
        let capacity: Option<(i32,)> =
            sqlx::query_as("SELECT capacity FROM sessions WHERE id = $1")
                .bind(session_id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_error("Failed to load session capacity", &e))?;

        #[allow(clippy::cast_sign_loss)] // capacity is CHECK-constrained positive
        let capacity = capacity.ok_or(BookingError::NotFound(session_id))?.0 as u32;
        if !seat.in_range(capacity) {
            return Err(BookingError::InvalidSeat { seat, capacity });
        }
        let Ok(seat_db) = i32::try_from(seat.get()) else {
            return Err(BookingError::InvalidSeat { seat, capacity });
        };

        // The atomic check-and-insert. A concurrent CONFIRMED row for the
        // same (session, seat) makes this insert fail with a unique
        // violation, which is the Conflict outcome.
        let row: std::result::Result<ReservationRow, sqlx::Error> = sqlx::query_as(
            "INSERT INTO reservations (session_id, seat_number, user_id, status)
             VALUES ($1, $2, $3, 'CONFIRMED')
             RETURNING id, session_id, seat_number, user_id, status, created_at, updated_at",
        )
        .bind(session_id.as_i64())
        .bind(seat_db)
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await;

        match row {
            Ok(row) => {
                let reservation = reservation_from_row(row)?;
                tracing::debug!(
                    %session_id,
                    %seat,
                    %user_id,
                    booking_id = %reservation.id,
                    "Reservation committed"
                );
                Ok(reservation)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(BookingError::Conflict { session_id, seat })
            }
            Err(e) => Err(storage_error("Failed to insert reservation", &e)),
        }
    }

    async fn list_taken(&self, session_id: SessionId) -> Result<BTreeSet<u32>> {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT seat_number FROM reservations
             WHERE session_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(session_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list taken seats", &e))?;

        #[allow(clippy::cast_sign_loss)] // seat_number is CHECK-constrained positive
        Ok(rows.into_iter().map(|(seat,)| seat as u32).collect())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            "SELECT id, session_id, seat_number, user_id, status, created_at, updated_at
             FROM reservations
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list reservations", &e))?;

        rows.into_iter().map(reservation_from_row).collect()
    }
}

//! Seat ledger contract.
//!
//! The ledger is the authoritative record of which (session, seat) pairs are
//! taken and the single shared mutable resource of the whole system. All
//! mutation passes through [`SeatLedger::reserve`], which must be atomic at
//! the storage layer: a uniqueness constraint or serializable transaction,
//! never an in-process lock, because correctness has to hold across process
//! boundaries when several service instances run concurrently.

use crate::error::Result;
use crate::types::{Reservation, SeatNumber, SessionId, UserId};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Authoritative store of seat reservations.
#[async_trait]
pub trait SeatLedger: Send + Sync {
    /// Atomically reserve one seat of one session for one user.
    ///
    /// The conflict check and the insert are a single atomic operation:
    /// for a fixed (session, seat), concurrent calls are linearized so that
    /// exactly one observes success and every other observes a conflict,
    /// regardless of arrival order. On success the reservation is durably
    /// recorded, `CONFIRMED`, timestamped, and carries a fresh unique id
    /// before this call returns.
    ///
    /// Safe to retry blindly: the uniqueness constraint prevents a retry
    /// from creating a duplicate reservation.
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`](crate::error::BookingError::NotFound)
    ///   when the session does not exist.
    /// - [`BookingError::InvalidSeat`](crate::error::BookingError::InvalidSeat)
    ///   when the seat is outside `1..=capacity`.
    /// - [`BookingError::Conflict`](crate::error::BookingError::Conflict)
    ///   when the seat already has a `CONFIRMED` reservation; repeating the
    ///   call yields `Conflict` again (idempotent on conflict).
    /// - [`BookingError::Storage`](crate::error::BookingError::Storage)
    ///   on a transient storage failure, which must never be reported as a
    ///   conflict.
    async fn reserve(
        &self,
        session_id: SessionId,
        seat: SeatNumber,
        user_id: UserId,
    ) -> Result<Reservation>;

    /// Seat numbers currently `CONFIRMED` for a session.
    ///
    /// Always succeeds with an empty set when nothing is booked. A caller
    /// that timed out on `reserve` uses this to reconcile true state before
    /// retrying.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`](crate::error::BookingError::Storage)
    /// on a transient storage failure.
    async fn list_taken(&self, session_id: SessionId) -> Result<BTreeSet<u32>>;

    /// All reservations owned by a user, most recent first.
    ///
    /// Read-only; slightly stale data is acceptable (booking history).
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`](crate::error::BookingError::Storage)
    /// on a transient storage failure.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Reservation>>;
}

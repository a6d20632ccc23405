//! Error taxonomy for the booking core.
//!
//! Every outcome of the booking path maps to exactly one of these variants.
//! `NotFound`, `InvalidSeat`, and `Conflict` are terminal, user-facing
//! outcomes; `Storage` is transient and safe to retry; `Unauthorized` is
//! raised before a request ever reaches the ledger.

use crate::types::{SessionId, SeatNumber};
use thiserror::Error;

/// Errors produced by the session catalog, the seat ledger, and the booking
/// orchestration built on top of them.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The referenced session does not exist.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The seat number lies outside `1..=capacity` for the session.
    #[error("seat {seat} is invalid for this session (valid seats are 1-{capacity})")]
    InvalidSeat {
        /// The rejected seat number.
        seat: SeatNumber,
        /// The session's capacity at validation time.
        capacity: u32,
    },

    /// A `CONFIRMED` reservation already exists for this (session, seat).
    ///
    /// Detected atomically with the insert; retrying the same request yields
    /// `Conflict` again and never disturbs the existing owner.
    #[error("seat {seat} for session {session_id} is already booked")]
    Conflict {
        /// The contested session.
        session_id: SessionId,
        /// The contested seat.
        seat: SeatNumber,
    },

    /// A transient storage failure; the operation may be retried blindly
    /// because the ledger's uniqueness constraint prevents duplicates.
    ///
    /// This must never be collapsed into `Conflict`: a storage error is not
    /// evidence that the seat is taken.
    #[error("storage error: {0}")]
    Storage(String),

    /// The caller's identity is missing or invalid.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl BookingError {
    /// Whether this error is a transient storage failure worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for the booking core.
pub type Result<T> = std::result::Result<T, BookingError>;

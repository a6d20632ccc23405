//! Seatbook core: the seat-booking conflict-resolution domain.
//!
//! This crate defines the contracts and orchestration that guarantee at most
//! one confirmed booking per (session, seat) pair under concurrent requests:
//!
//! - [`catalog::SessionCatalog`] — immutable-after-creation session records
//! - [`ledger::SeatLedger`] — the authoritative reservation store; its
//!   `reserve` is a single atomic check-and-insert
//! - [`booking::BookingService`] — request orchestration: validation,
//!   bounded retry of transient storage errors, idempotency keys, per-seat
//!   multi-seat outcomes
//! - [`query::QueryService`] — read-only availability and booking history
//!
//! Storage backends implement the traits; the orchestration is
//! backend-agnostic. The correctness property lives at the storage layer
//! (uniqueness constraint or serializable transaction), never in an
//! in-process lock, so it holds across service instances.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod booking;
pub mod catalog;
pub mod error;
pub mod idempotency;
pub mod ledger;
pub mod query;
pub mod types;

// Re-export the main types for convenience
pub use booking::{BookingOutcome, BookingService, FailureKind, RetryPolicy, SeatOutcome};
pub use catalog::SessionCatalog;
pub use error::{BookingError, Result};
pub use idempotency::IdempotencyStore;
pub use ledger::SeatLedger;
pub use query::{HistoryEntry, QueryService, SessionSummary};
pub use types::{
    Availability, BookingId, NewSession, Reservation, ReservationStatus, SeatNumber, Session,
    SessionId, UserId,
};

//! Domain types for the seat-booking service.
//!
//! This module contains the value objects and entities shared by every layer:
//! identifiers, the session record, the seat reservation, and the availability
//! view returned by read queries.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a session.
///
/// Sessions use surrogate integer ids (`BIGSERIAL` in storage) to match the
/// wire format consumed by booking clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(i64);

impl SessionId {
    /// Create a `SessionId` from a raw integer.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner integer.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking (seat reservation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(i64);

impl BookingId {
    /// Create a `BookingId` from a raw integer.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner integer.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user.
///
/// The booking core treats the authenticated user id as an opaque value; it is
/// supplied by the authentication layer and never interpreted here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A numbered seat within a session.
///
/// Valid seat numbers are `1..=capacity` of the owning session. The range is
/// enforced by the seat ledger at reservation time, not by this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatNumber(u32);

impl SeatNumber {
    /// Create a `SeatNumber` from a raw integer.
    #[must_use]
    pub const fn new(seat: u32) -> Self {
        Self(seat)
    }

    /// Get the inner integer.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Whether this seat number lies within `1..=capacity`.
    #[must_use]
    pub const fn in_range(&self, capacity: u32) -> bool {
        self.0 >= 1 && self.0 <= capacity
    }
}

impl fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// A schedulable event with a fixed date, time, duration, and seat capacity.
///
/// Sessions are immutable after creation as far as this core is concerned:
/// the catalog is append-only and nothing here edits or deletes a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session id.
    pub id: SessionId,
    /// Display title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Calendar date the session takes place.
    pub session_date: NaiveDate,
    /// Wall-clock start time.
    pub start_time: NaiveTime,
    /// Duration in minutes.
    pub duration_minutes: u32,
    /// Number of seats; valid seat numbers are `1..=capacity`.
    pub capacity: u32,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a session.
///
/// Consumed by catalog seeding and tests; session administration is not part
/// of the HTTP surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    /// Display title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Calendar date the session takes place.
    pub session_date: NaiveDate,
    /// Wall-clock start time.
    pub start_time: NaiveTime,
    /// Duration in minutes.
    pub duration_minutes: u32,
    /// Number of seats.
    pub capacity: u32,
}

// ============================================================================
// Reservations
// ============================================================================

/// Status of a seat reservation.
///
/// The only valid transitions are `(none) -> Confirmed -> Cancelled`.
/// `Confirmed` is reachable solely through a successful `reserve`;
/// a confirmed seat is rejected with a conflict, never overwritten.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// The seat is held by its owning user.
    Confirmed,
    /// Terminal state; the seat no longer counts against availability.
    Cancelled,
}

impl ReservationStatus {
    /// Canonical storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse the canonical storage representation.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confirmed (or later cancelled) claim on one seat of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique booking id, immutable once assigned.
    pub id: BookingId,
    /// The session this reservation belongs to (referenced, not owned).
    pub session_id: SessionId,
    /// The claimed seat, in `1..=capacity` of the session.
    pub seat_number: SeatNumber,
    /// The owning user.
    pub user_id: UserId,
    /// Current status.
    pub status: ReservationStatus,
    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
    /// When the reservation last changed.
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Read views
// ============================================================================

/// Seat availability for a session: total capacity plus the confirmed seats.
///
/// Clients derive "free" seats as the complement; that derivation is advisory
/// only and the ledger re-checks atomically on every reserve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Total seat capacity of the session.
    pub capacity: u32,
    /// Seat numbers with a `CONFIRMED` reservation, ascending.
    pub taken_seats: BTreeSet<u32>,
}

//! # Seatbook Testing
//!
//! Testing utilities for the Seatbook booking core.
//!
//! This crate provides:
//! - In-memory implementations of the storage contracts
//!   ([`mocks::InMemorySessionCatalog`], [`mocks::InMemorySeatLedger`],
//!   [`mocks::InMemoryIdempotencyStore`])
//! - Fixture builders for common test data
//!
//! The in-memory ledger honors the same linearization property as the real
//! storage layer: its check-and-insert runs under a single lock, so the
//! concurrency scenarios from the service contract can be exercised at
//! memory speed.
//!
//! ## Example
//!
//! ```ignore
//! use seatbook_testing::mocks::{InMemorySeatLedger, InMemorySessionCatalog};
//!
//! #[tokio::test]
//! async fn test_booking_flow() {
//!     let catalog = InMemorySessionCatalog::new();
//!     let ledger = InMemorySeatLedger::new(catalog.clone());
//!     let session = catalog
//!         .insert_session(seatbook_testing::fixtures::new_session("Pilates", 3))
//!         .await
//!         .unwrap();
//!     let reservation = ledger
//!         .reserve(session.id, SeatNumber::new(1), UserId::new())
//!         .await
//!         .unwrap();
//!     assert_eq!(reservation.seat_number.get(), 1);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod mocks;

/// Fixture builders for common test data.
pub mod fixtures {
    use chrono::{NaiveDate, NaiveTime};
    use seatbook_core::NewSession;

    /// A `NewSession` with a fixed schedule and the given title and capacity.
    ///
    /// # Panics
    ///
    /// Never panics; the embedded date and time are valid constants.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_session(title: &str, capacity: u32) -> NewSession {
        NewSession {
            title: title.to_string(),
            description: None,
            session_date: NaiveDate::from_ymd_opt(2026, 9, 10)
                .expect("hardcoded date should always be valid"),
            start_time: NaiveTime::from_hms_opt(18, 0, 0)
                .expect("hardcoded time should always be valid"),
            duration_minutes: 60,
            capacity,
        }
    }
}

pub use mocks::{InMemoryIdempotencyStore, InMemorySeatLedger, InMemorySessionCatalog};

//! Session catalog contract.
//!
//! The catalog owns session records and is read-mostly from the booking
//! core's perspective: sessions are created once (by seeding or an
//! administrative path outside this core) and never edited or deleted.

use crate::error::Result;
use crate::types::{NewSession, Session, SessionId};
use async_trait::async_trait;

/// Authoritative source of session records.
///
/// Implementations must treat sessions as immutable after creation. The seat
/// ledger consults the catalog for capacity when validating seat numbers.
#[async_trait]
pub trait SessionCatalog: Send + Sync {
    /// Look up a session by id.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`](crate::error::BookingError::NotFound)
    /// when the id does not exist, or
    /// [`BookingError::Storage`](crate::error::BookingError::Storage) on a
    /// transient storage failure.
    async fn get_session(&self, id: SessionId) -> Result<Session>;

    /// List all sessions, soonest first (by date, then start time).
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`](crate::error::BookingError::Storage)
    /// on a transient storage failure.
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    /// Insert a new session and return it with its assigned id.
    ///
    /// Used by seeding and tests; not exposed over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`](crate::error::BookingError::Storage)
    /// on a transient storage failure.
    async fn insert_session(&self, session: NewSession) -> Result<Session>;
}

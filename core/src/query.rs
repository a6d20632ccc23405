//! Read-only query service.
//!
//! Answers "what seats are booked" and "what is my booking history" from the
//! seat ledger. Pure reads, tolerant of slightly stale data, never blocking
//! or blocked by bookings beyond normal read consistency.

use crate::catalog::SessionCatalog;
use crate::error::Result;
use crate::ledger::SeatLedger;
use crate::types::{Availability, Reservation, Session, SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The session fields embedded alongside each history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session id.
    pub id: SessionId,
    /// Display title.
    pub title: String,
    /// Calendar date.
    pub session_date: chrono::NaiveDate,
    /// Wall-clock start time.
    pub start_time: chrono::NaiveTime,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            title: session.title.clone(),
            session_date: session.session_date,
            start_time: session.start_time,
        }
    }
}

/// One booking-history row: the reservation plus a summary of its session.
///
/// The session is optional so that history never fails wholesale if a
/// referenced session cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The reservation itself.
    #[serde(flatten)]
    pub reservation: Reservation,
    /// Summary of the owning session, when resolvable.
    pub session: Option<SessionSummary>,
}

/// Read-only queries over the seat ledger and the session catalog.
#[derive(Clone)]
pub struct QueryService {
    catalog: Arc<dyn SessionCatalog>,
    ledger: Arc<dyn SeatLedger>,
}

impl QueryService {
    /// Create a new query service.
    #[must_use]
    pub fn new(catalog: Arc<dyn SessionCatalog>, ledger: Arc<dyn SeatLedger>) -> Self {
        Self { catalog, ledger }
    }

    /// Capacity and confirmed seats for a session.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`](crate::error::BookingError::NotFound)
    /// for an unknown session, or
    /// [`BookingError::Storage`](crate::error::BookingError::Storage) on a
    /// transient storage failure.
    pub async fn get_availability(&self, session_id: SessionId) -> Result<Availability> {
        let session = self.catalog.get_session(session_id).await?;
        let taken_seats = self.ledger.list_taken(session_id).await?;
        Ok(Availability {
            capacity: session.capacity,
            taken_seats,
        })
    }

    /// A user's reservations, most recent first, each with a session summary.
    ///
    /// Sessions are resolved once per distinct id; an unresolvable session
    /// leaves `session` empty on its rows instead of failing the query.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`](crate::error::BookingError::Storage)
    /// on a transient storage failure while listing reservations.
    pub async fn get_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>> {
        let reservations = self.ledger.list_by_user(user_id).await?;

        let mut sessions: HashMap<SessionId, Option<SessionSummary>> = HashMap::new();
        let mut entries = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let session_id = reservation.session_id;
            if !sessions.contains_key(&session_id) {
                let summary = match self.catalog.get_session(session_id).await {
                    Ok(session) => Some(SessionSummary::from(&session)),
                    Err(err) => {
                        tracing::warn!(
                            %session_id,
                            error = %err,
                            "Could not resolve session for history entry"
                        );
                        None
                    }
                };
                sessions.insert(session_id, summary);
            }
            entries.push(HistoryEntry {
                session: sessions.get(&session_id).cloned().flatten(),
                reservation,
            });
        }
        Ok(entries)
    }
}

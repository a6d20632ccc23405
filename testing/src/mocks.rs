//! In-memory implementations of the Seatbook storage contracts.
//!
//! Fast, deterministic substitutes for the PostgreSQL backend. The ledger
//! performs its conflict check and insert inside one lock so the
//! one-confirmed-booking-per-seat invariant holds under concurrent tasks,
//! mirroring what the unique constraint guarantees in real storage.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning is a test bug, not a documented failure

use async_trait::async_trait;
use chrono::Utc;
use seatbook_core::{
    BookingError, BookingId, BookingOutcome, IdempotencyStore, NewSession, Reservation,
    ReservationStatus, Result, SeatLedger, SeatNumber, Session, SessionCatalog, SessionId, UserId,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, RwLock};

/// In-memory session catalog.
///
/// Cloning shares the underlying map, so a catalog handed to a ledger and one
/// kept by a test observe the same sessions.
#[derive(Clone, Debug, Default)]
pub struct InMemorySessionCatalog {
    inner: Arc<RwLock<CatalogInner>>,
}

#[derive(Debug, Default)]
struct CatalogInner {
    sessions: HashMap<SessionId, Session>,
    next_id: i64,
}

impl InMemorySessionCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions, for test assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().sessions.len()
    }

    /// Whether the catalog holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().sessions.is_empty()
    }
}

#[async_trait]
impl SessionCatalog for InMemorySessionCatalog {
    async fn get_session(&self, id: SessionId) -> Result<Session> {
        self.inner
            .read()
            .unwrap()
            .sessions
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound(id))
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .inner
            .read()
            .unwrap()
            .sessions
            .values()
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.session_date, s.start_time, s.id));
        Ok(sessions)
    }

    async fn insert_session(&self, session: NewSession) -> Result<Session> {
        let mut inner = self.inner.write().unwrap();
        inner.next_id += 1;
        let created = Session {
            id: SessionId::new(inner.next_id),
            title: session.title,
            description: session.description,
            session_date: session.session_date,
            start_time: session.start_time,
            duration_minutes: session.duration_minutes,
            capacity: session.capacity,
            created_at: Utc::now(),
        };
        inner.sessions.insert(created.id, created.clone());
        Ok(created)
    }
}

/// In-memory seat ledger backed by an [`InMemorySessionCatalog`] for
/// capacity lookups.
#[derive(Clone)]
pub struct InMemorySeatLedger {
    catalog: InMemorySessionCatalog,
    inner: Arc<Mutex<LedgerInner>>,
}

#[derive(Default)]
struct LedgerInner {
    reservations: Vec<Reservation>,
    // (session, seat) -> index into reservations, CONFIRMED rows only
    confirmed: HashMap<(SessionId, u32), usize>,
    next_id: i64,
}

impl InMemorySeatLedger {
    /// Create a new empty ledger reading capacities from `catalog`.
    #[must_use]
    pub fn new(catalog: InMemorySessionCatalog) -> Self {
        Self {
            catalog,
            inner: Arc::new(Mutex::new(LedgerInner::default())),
        }
    }

    /// Total number of reservation rows ever created, for test assertions.
    #[must_use]
    pub fn reservation_count(&self) -> usize {
        self.inner.lock().unwrap().reservations.len()
    }
}

#[async_trait]
impl SeatLedger for InMemorySeatLedger {
    async fn reserve(
        &self,
        session_id: SessionId,
        seat: SeatNumber,
        user_id: UserId,
    ) -> Result<Reservation> {
        let capacity = self.catalog.get_session(session_id).await?.capacity;

        // Conflict check and insert under one lock: the in-process analogue
        // of the storage layer's unique constraint.
        let mut inner = self.inner.lock().unwrap();
        if !seat.in_range(capacity) {
            return Err(BookingError::InvalidSeat { seat, capacity });
        }
        if inner.confirmed.contains_key(&(session_id, seat.get())) {
            return Err(BookingError::Conflict { session_id, seat });
        }
        inner.next_id += 1;
        let now = Utc::now();
        let reservation = Reservation {
            id: BookingId::new(inner.next_id),
            session_id,
            seat_number: seat,
            user_id,
            status: ReservationStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };
        let index = inner.reservations.len();
        inner.reservations.push(reservation.clone());
        inner.confirmed.insert((session_id, seat.get()), index);
        Ok(reservation)
    }

    async fn list_taken(&self, session_id: SessionId) -> Result<BTreeSet<u32>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .confirmed
            .keys()
            .filter(|(sid, _)| *sid == session_id)
            .map(|(_, seat)| *seat)
            .collect())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        let inner = self.inner.lock().unwrap();
        let mut owned: Vec<Reservation> = inner
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        // Most recent first; id order breaks timestamp ties deterministically.
        owned.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(owned)
    }
}

/// In-memory idempotency store.
#[derive(Clone, Default)]
pub struct InMemoryIdempotencyStore {
    records: Arc<Mutex<HashMap<(UserId, String), BookingOutcome>>>,
}

impl InMemoryIdempotencyStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded outcomes, for test assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether no outcomes are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn get(&self, user_id: UserId, key: &str) -> Result<Option<BookingOutcome>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(user_id, key.to_string()))
            .cloned())
    }

    async fn put(&self, user_id: UserId, key: &str, outcome: &BookingOutcome) -> Result<()> {
        // First write wins.
        self.records
            .lock()
            .unwrap()
            .entry((user_id, key.to_string()))
            .or_insert_with(|| outcome.clone());
        Ok(())
    }
}

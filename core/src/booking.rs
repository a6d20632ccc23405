//! Booking orchestration.
//!
//! [`BookingService`] sits between the HTTP surface and the storage
//! contracts: it resolves the session, delegates the atomic seat claim to the
//! ledger, retries transient storage failures a bounded number of times, and
//! translates every ledger outcome into the externally visible result.
//!
//! Two properties are deliberate and load-bearing:
//!
//! - A transient storage error is retried with backoff and, if retries are
//!   exhausted, surfaced as a storage error. It is never reported as a
//!   conflict.
//! - Multi-seat requests are NOT all-or-nothing. Each seat is reserved
//!   independently and the service reports per-seat outcomes; callers that
//!   need atomic multi-seat booking must implement that as a distinct
//!   operation.

use crate::catalog::SessionCatalog;
use crate::error::{BookingError, Result};
use crate::idempotency::IdempotencyStore;
use crate::ledger::SeatLedger;
use crate::types::{Reservation, SeatNumber, Session, SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Why a booking request was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The session does not exist.
    SessionNotFound,
    /// The seat number is outside the session's capacity.
    InvalidSeat,
    /// The seat already has a confirmed reservation.
    SeatTaken,
}

/// Externally visible result of one booking request.
///
/// Terminal by construction: both variants are recordable under an
/// idempotency key and replayable verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingOutcome {
    /// Exactly one durable reservation row was created.
    Confirmed {
        /// The newly created reservation.
        booking: Reservation,
    },
    /// No row was created; `message` distinguishes the failure mode.
    Failed {
        /// Machine-readable failure category.
        kind: FailureKind,
        /// Human-readable reason.
        message: String,
    },
}

impl BookingOutcome {
    /// Build the `Failed` variant from a terminal ledger error.
    ///
    /// Transient storage errors have no terminal translation and are passed
    /// back unchanged.
    fn from_terminal(err: BookingError) -> Result<Self> {
        let kind = match &err {
            BookingError::NotFound(_) => FailureKind::SessionNotFound,
            BookingError::InvalidSeat { .. } => FailureKind::InvalidSeat,
            BookingError::Conflict { .. } => FailureKind::SeatTaken,
            BookingError::Storage(_) | BookingError::Unauthorized(_) => return Err(err),
        };
        Ok(Self::Failed {
            kind,
            message: err.to_string(),
        })
    }

    /// Whether this outcome is a confirmation.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Metric label for this outcome.
    const fn metric_label(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "confirmed",
            Self::Failed { kind, .. } => match kind {
                FailureKind::SessionNotFound => "session_not_found",
                FailureKind::InvalidSeat => "invalid_seat",
                FailureKind::SeatTaken => "conflict",
            },
        }
    }
}

/// Outcome of one seat within a multi-seat request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatOutcome {
    /// The requested seat.
    pub seat_number: SeatNumber,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: BookingOutcome,
}

/// Bounded retry policy for transient storage errors.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles on each subsequent retry.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Backoff to apply after the given 1-based failed attempt.
    fn backoff_after(&self, attempt: u32) -> Duration {
        self.base_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Orchestrates booking requests against the catalog and the ledger.
#[derive(Clone)]
pub struct BookingService {
    catalog: Arc<dyn SessionCatalog>,
    ledger: Arc<dyn SeatLedger>,
    idempotency: Arc<dyn IdempotencyStore>,
    retry: RetryPolicy,
}

impl BookingService {
    /// Create a new booking service with the default retry policy.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn SessionCatalog>,
        ledger: Arc<dyn SeatLedger>,
        idempotency: Arc<dyn IdempotencyStore>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            idempotency,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Create one booking: resolve the session, atomically reserve the seat,
    /// translate the result.
    ///
    /// Exactly one durable reservation row exists on `Confirmed`; zero rows
    /// on every failure path.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] when transient storage failures
    /// outlast the retry policy. All terminal rejections come back as
    /// [`BookingOutcome::Failed`], not as errors.
    pub async fn create_booking(
        &self,
        session_id: SessionId,
        seat: SeatNumber,
        user_id: UserId,
    ) -> Result<BookingOutcome> {
        let session = match self.resolve_session(session_id).await {
            Ok(session) => session,
            Err(err @ BookingError::NotFound(_)) => {
                let outcome = BookingOutcome::from_terminal(err)?;
                self.record_outcome(&outcome, session_id, seat, user_id);
                return Ok(outcome);
            }
            Err(err) => return Err(err),
        };

        let outcome = match self.reserve_with_retry(&session, seat, user_id).await {
            Ok(reservation) => BookingOutcome::Confirmed {
                booking: reservation,
            },
            Err(err) => BookingOutcome::from_terminal(err)?,
        };
        self.record_outcome(&outcome, session_id, seat, user_id);
        Ok(outcome)
    }

    /// Like [`create_booking`](Self::create_booking), with an optional
    /// client-generated idempotency key.
    ///
    /// With a key, the first terminal outcome is recorded and any retry with
    /// the same key returns the recorded outcome instead of re-executing, so
    /// a retry after a committed-but-unacknowledged write sees its original
    /// `Confirmed` rather than a spurious conflict.
    ///
    /// # Errors
    ///
    /// As [`create_booking`](Self::create_booking), plus storage errors from
    /// the idempotency store itself.
    pub async fn create_booking_with_key(
        &self,
        idempotency_key: Option<&str>,
        session_id: SessionId,
        seat: SeatNumber,
        user_id: UserId,
    ) -> Result<BookingOutcome> {
        let Some(key) = idempotency_key else {
            return self.create_booking(session_id, seat, user_id).await;
        };

        if let Some(recorded) = self.idempotency.get(user_id, key).await? {
            tracing::debug!(
                %session_id,
                %seat,
                %user_id,
                key,
                "Replaying recorded booking outcome for idempotency key"
            );
            metrics::counter!("seatbook_idempotent_replays_total").increment(1);
            return Ok(recorded);
        }

        let outcome = self.create_booking(session_id, seat, user_id).await?;
        self.idempotency.put(user_id, key, &outcome).await?;
        Ok(outcome)
    }

    /// Reserve several seats of one session independently.
    ///
    /// Seats are processed in order and may partially succeed; the returned
    /// vector holds one outcome per requested seat. This mirrors the client
    /// behavior of booking selected seats one at a time and is deliberately
    /// not an atomic multi-seat transaction.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if a transient failure outlasts the
    /// retry policy mid-request. Seats already confirmed by then stay
    /// confirmed; callers reconcile by re-reading availability.
    pub async fn create_bookings(
        &self,
        session_id: SessionId,
        seats: &[SeatNumber],
        user_id: UserId,
    ) -> Result<Vec<SeatOutcome>> {
        let mut outcomes = Vec::with_capacity(seats.len());
        for &seat in seats {
            let outcome = self.create_booking(session_id, seat, user_id).await?;
            outcomes.push(SeatOutcome {
                seat_number: seat,
                outcome,
            });
        }
        Ok(outcomes)
    }

    /// Resolve the session, retrying transient catalog failures.
    async fn resolve_session(&self, session_id: SessionId) -> Result<Session> {
        let mut attempt = 1;
        loop {
            match self.catalog.get_session(session_id).await {
                Ok(session) => return Ok(session),
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    self.note_retry(attempt, &err);
                    tokio::time::sleep(self.retry.backoff_after(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Drive the ledger's atomic reserve, retrying only transient failures.
    ///
    /// Terminal outcomes (conflict, invalid seat) return immediately; they
    /// are never retried because re-executing cannot change them.
    async fn reserve_with_retry(
        &self,
        session: &Session,
        seat: SeatNumber,
        user_id: UserId,
    ) -> Result<Reservation> {
        let mut attempt = 1;
        loop {
            match self.ledger.reserve(session.id, seat, user_id).await {
                Ok(reservation) => return Ok(reservation),
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    self.note_retry(attempt, &err);
                    tokio::time::sleep(self.retry.backoff_after(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn note_retry(&self, attempt: u32, err: &BookingError) {
        tracing::warn!(
            attempt,
            max_attempts = self.retry.max_attempts,
            error = %err,
            "Transient storage error, retrying with backoff"
        );
        metrics::counter!("seatbook_booking_retries_total").increment(1);
    }

    fn record_outcome(
        &self,
        outcome: &BookingOutcome,
        session_id: SessionId,
        seat: SeatNumber,
        user_id: UserId,
    ) {
        metrics::counter!(
            "seatbook_bookings_total",
            "outcome" => outcome.metric_label()
        )
        .increment(1);
        match outcome {
            BookingOutcome::Confirmed { booking } => {
                tracing::info!(
                    %session_id,
                    %seat,
                    %user_id,
                    booking_id = %booking.id,
                    "Booking confirmed"
                );
            }
            BookingOutcome::Failed { kind, message } => {
                tracing::info!(
                    %session_id,
                    %seat,
                    %user_id,
                    ?kind,
                    message,
                    "Booking rejected"
                );
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Panics: test will fail if setup fails
mod tests {
    use super::*;
    use crate::types::{BookingId, NewSession, ReservationStatus};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use std::collections::BTreeSet;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn test_session(id: i64, capacity: u32) -> Session {
        Session {
            id: SessionId::new(id),
            title: "Back rehab".to_string(),
            description: None,
            session_date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            duration_minutes: 60,
            capacity,
            created_at: Utc::now(),
        }
    }

    struct FixedCatalog {
        session: Session,
    }

    #[async_trait]
    impl SessionCatalog for FixedCatalog {
        async fn get_session(&self, id: SessionId) -> Result<Session> {
            if id == self.session.id {
                Ok(self.session.clone())
            } else {
                Err(BookingError::NotFound(id))
            }
        }

        async fn list_sessions(&self) -> Result<Vec<Session>> {
            Ok(vec![self.session.clone()])
        }

        async fn insert_session(&self, _session: NewSession) -> Result<Session> {
            Err(BookingError::Storage("read-only test catalog".into()))
        }
    }

    /// Ledger that fails with a transient error a set number of times before
    /// behaving like a plain single-session seat map.
    struct FlakyLedger {
        session: Session,
        failures_remaining: AtomicU32,
        attempts: AtomicU32,
        taken: Mutex<BTreeSet<u32>>,
    }

    impl FlakyLedger {
        fn new(session: Session, failures: u32) -> Self {
            Self {
                session,
                failures_remaining: AtomicU32::new(failures),
                attempts: AtomicU32::new(0),
                taken: Mutex::new(BTreeSet::new()),
            }
        }
    }

    #[async_trait]
    impl SeatLedger for FlakyLedger {
        async fn reserve(
            &self,
            session_id: SessionId,
            seat: SeatNumber,
            user_id: UserId,
        ) -> Result<Reservation> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self
                .failures_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(BookingError::Storage("simulated outage".into()));
            }
            if !seat.in_range(self.session.capacity) {
                return Err(BookingError::InvalidSeat {
                    seat,
                    capacity: self.session.capacity,
                });
            }
            let mut taken = self.taken.lock().unwrap();
            if !taken.insert(seat.get()) {
                return Err(BookingError::Conflict { session_id, seat });
            }
            let now = Utc::now();
            Ok(Reservation {
                id: BookingId::new(i64::from(seat.get())),
                session_id,
                seat_number: seat,
                user_id,
                status: ReservationStatus::Confirmed,
                created_at: now,
                updated_at: now,
            })
        }

        async fn list_taken(&self, _session_id: SessionId) -> Result<BTreeSet<u32>> {
            Ok(self.taken.lock().unwrap().clone())
        }

        async fn list_by_user(&self, _user_id: UserId) -> Result<Vec<Reservation>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct MapIdempotency {
        records: Mutex<HashMap<(UserId, String), BookingOutcome>>,
    }

    #[async_trait]
    impl IdempotencyStore for MapIdempotency {
        async fn get(&self, user_id: UserId, key: &str) -> Result<Option<BookingOutcome>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(&(user_id, key.to_string()))
                .cloned())
        }

        async fn put(&self, user_id: UserId, key: &str, outcome: &BookingOutcome) -> Result<()> {
            self.records
                .lock()
                .unwrap()
                .entry((user_id, key.to_string()))
                .or_insert_with(|| outcome.clone());
            Ok(())
        }
    }

    fn service_with(session: Session, failures: u32) -> (BookingService, Arc<FlakyLedger>) {
        let ledger = Arc::new(FlakyLedger::new(session.clone(), failures));
        let service = BookingService::new(
            Arc::new(FixedCatalog { session }),
            ledger.clone(),
            Arc::new(MapIdempotency::default()),
        )
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_backoff: Duration::from_millis(1),
        });
        (service, ledger)
    }

    #[tokio::test]
    async fn confirms_a_free_seat() {
        let (service, _) = service_with(test_session(1, 3), 0);
        let outcome = service
            .create_booking(SessionId::new(1), SeatNumber::new(1), UserId::new())
            .await
            .unwrap();
        assert!(outcome.is_confirmed());
    }

    #[tokio::test]
    async fn transient_failures_are_retried_then_succeed() {
        let (service, ledger) = service_with(test_session(1, 3), 2);
        let outcome = service
            .create_booking(SessionId::new(1), SeatNumber::new(2), UserId::new())
            .await
            .unwrap();
        assert!(outcome.is_confirmed());
        assert_eq!(ledger.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_storage_never_conflict() {
        let (service, ledger) = service_with(test_session(1, 3), 10);
        let err = service
            .create_booking(SessionId::new(1), SeatNumber::new(2), UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Storage(_)));
        assert_eq!(ledger.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn conflicts_are_terminal_and_not_retried() {
        let (service, ledger) = service_with(test_session(1, 3), 0);
        let u1 = UserId::new();
        let u2 = UserId::new();
        service
            .create_booking(SessionId::new(1), SeatNumber::new(1), u1)
            .await
            .unwrap();
        let outcome = service
            .create_booking(SessionId::new(1), SeatNumber::new(1), u2)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            BookingOutcome::Failed {
                kind: FailureKind::SeatTaken,
                message: "seat 1 for session 1 is already booked".to_string(),
            }
        );
        // One attempt for the first booking, one for the conflicting one.
        assert_eq!(ledger.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_session_fails_without_touching_the_ledger() {
        let (service, ledger) = service_with(test_session(1, 3), 0);
        let outcome = service
            .create_booking(SessionId::new(99), SeatNumber::new(1), UserId::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            BookingOutcome::Failed {
                kind: FailureKind::SessionNotFound,
                message: "session 99 not found".to_string(),
            }
        );
        assert_eq!(ledger.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn out_of_range_seats_are_invalid() {
        let (service, _) = service_with(test_session(1, 3), 0);
        for seat in [0, 4] {
            let outcome = service
                .create_booking(SessionId::new(1), SeatNumber::new(seat), UserId::new())
                .await
                .unwrap();
            assert!(matches!(
                outcome,
                BookingOutcome::Failed {
                    kind: FailureKind::InvalidSeat,
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn multi_seat_requests_report_per_seat_outcomes() {
        let (service, _) = service_with(test_session(1, 3), 0);
        let user = UserId::new();
        // Seat 2 is pre-taken by another user.
        service
            .create_booking(SessionId::new(1), SeatNumber::new(2), UserId::new())
            .await
            .unwrap();

        let outcomes = service
            .create_bookings(
                SessionId::new(1),
                &[SeatNumber::new(1), SeatNumber::new(2), SeatNumber::new(9)],
                user,
            )
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].outcome.is_confirmed());
        assert!(matches!(
            outcomes[1].outcome,
            BookingOutcome::Failed {
                kind: FailureKind::SeatTaken,
                ..
            }
        ));
        assert!(matches!(
            outcomes[2].outcome,
            BookingOutcome::Failed {
                kind: FailureKind::InvalidSeat,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn idempotency_key_replays_the_recorded_outcome() {
        let (service, ledger) = service_with(test_session(1, 3), 0);
        let user = UserId::new();
        let key = "client-key-0123456789";

        let first = service
            .create_booking_with_key(Some(key), SessionId::new(1), SeatNumber::new(1), user)
            .await
            .unwrap();
        assert!(first.is_confirmed());

        // A blind retry of the same logical request must not see a conflict.
        let replayed = service
            .create_booking_with_key(Some(key), SessionId::new(1), SeatNumber::new(1), user)
            .await
            .unwrap();
        assert_eq!(first, replayed);
        assert_eq!(ledger.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn idempotency_keys_are_scoped_per_user() {
        let (service, _) = service_with(test_session(1, 3), 0);
        let key = "shared-key-0123456789";

        let first = service
            .create_booking_with_key(Some(key), SessionId::new(1), SeatNumber::new(1), UserId::new())
            .await
            .unwrap();
        assert!(first.is_confirmed());

        // Same key, different user: a fresh request, which now conflicts.
        let second = service
            .create_booking_with_key(Some(key), SessionId::new(1), SeatNumber::new(1), UserId::new())
            .await
            .unwrap();
        assert!(matches!(
            second,
            BookingOutcome::Failed {
                kind: FailureKind::SeatTaken,
                ..
            }
        ));
    }
}

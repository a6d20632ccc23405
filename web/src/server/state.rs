//! Application state for the booking HTTP server.

use seatbook_core::{BookingService, QueryService, SessionCatalog};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request. Handlers reach the storage
/// layer only through the booking and query services plus the read-only
/// catalog; the raw ledger is never exposed to the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    /// Session catalog for direct session reads.
    pub catalog: Arc<dyn SessionCatalog>,
    /// Booking orchestration (validation, atomic reserve, retry, idempotency).
    pub bookings: BookingService,
    /// Read-only availability and history queries.
    pub queries: QueryService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn SessionCatalog>,
        bookings: BookingService,
        queries: QueryService,
    ) -> Self {
        Self {
            catalog,
            bookings,
            queries,
        }
    }
}

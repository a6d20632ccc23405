//! Router configuration for the seat booking service.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{bookings, sessions};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Health checks (unauthenticated)
/// - Session catalog queries
/// - Booking creation and history
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
pub fn build_router(state: AppState) -> Router {
    // API routes
    let api_routes = Router::new()
        // Session catalog (read side)
        .route("/sessions", get(sessions::list_sessions))
        .route("/sessions/:id", get(sessions::get_session))
        // Bookings (write side + history)
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings", get(bookings::list_bookings));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

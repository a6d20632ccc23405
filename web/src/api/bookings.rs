//! Booking endpoints.
//!
//! - `POST /api/bookings` - attempt to reserve one seat for the caller
//! - `GET /api/bookings` - the caller's booking history, most recent first

use crate::error::AppError;
use crate::extractors::{AuthUser, CorrelationId, IdempotencyKey};
use crate::server::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use seatbook_core::{BookingOutcome, FailureKind, HistoryEntry, SeatNumber, SessionId};
use serde::Deserialize;

/// Request body for `POST /api/bookings`.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// The session to book into.
    pub session_id: i64,
    /// The seat to reserve, 1-based.
    pub seat_number: u32,
}

/// Attempt to reserve a seat for the authenticated user.
///
/// Never fails on a booking-level refusal: the losing side of a seat race,
/// an out-of-range seat, and an unknown session all come back as a `FAILED`
/// body with the matching HTTP status. Only transport and storage problems
/// surface as errors.
pub async fn create_booking(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    AuthUser(user_id): AuthUser,
    IdempotencyKey(idempotency_key): IdempotencyKey,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Response, AppError> {
    tracing::info!(
        correlation_id = %correlation_id.0,
        user_id = %user_id,
        session_id = request.session_id,
        seat_number = request.seat_number,
        "Booking request received"
    );

    let outcome = state
        .bookings
        .create_booking_with_key(
            idempotency_key.as_deref(),
            SessionId::new(request.session_id),
            SeatNumber::new(request.seat_number),
            user_id,
        )
        .await?;

    let status = match &outcome {
        BookingOutcome::Confirmed { .. } => StatusCode::CREATED,
        BookingOutcome::Failed { kind, .. } => match kind {
            FailureKind::SessionNotFound => StatusCode::NOT_FOUND,
            FailureKind::InvalidSeat => StatusCode::UNPROCESSABLE_ENTITY,
            FailureKind::SeatTaken => StatusCode::CONFLICT,
        },
    };

    Ok((status, Json(outcome)).into_response())
}

/// List the caller's bookings, most recent first, with session context.
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let history = state.queries.get_history(user_id).await?;
    Ok(Json(history))
}

//! Session query endpoints.
//!
//! - `GET /api/sessions` - list the full catalog, soonest first
//! - `GET /api/sessions/:id` - one session plus its booked seats

use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use seatbook_core::{Session, SessionId};
use serde::Serialize;

/// One session with the seats currently confirmed for it.
///
/// `bookedSeats` is the advisory availability view shown to clients while
/// they pick seats; the authoritative check happens on booking.
#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    /// The session record.
    #[serde(flatten)]
    pub session: Session,
    /// Seat numbers with a confirmed reservation, ascending.
    #[serde(rename = "bookedSeats")]
    pub booked_seats: Vec<u32>,
}

/// List all sessions, soonest first.
pub async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<Session>>, AppError> {
    let sessions = state.catalog.list_sessions().await?;
    Ok(Json(sessions))
}

/// Get a session with its booked seats.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/sessions/1
/// # {"id":1,"title":"Back rehab","capacity":3,...,"bookedSeats":[1]}
/// ```
pub async fn get_session(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let session_id = SessionId::new(id);
    let session = state.catalog.get_session(session_id).await?;
    let availability = state.queries.get_availability(session_id).await?;

    Ok(Json(SessionDetailResponse {
        session,
        booked_seats: availability.taken_seats.into_iter().collect(),
    }))
}

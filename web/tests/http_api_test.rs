//! End-to-end HTTP tests over the full router with in-memory storage.
//!
//! Every scenario drives the real extractors, handlers, and error mapping;
//! only the storage layer is swapped for the in-memory test doubles.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use axum_test::TestServer;
use http::{HeaderName, HeaderValue, StatusCode};
use seatbook_core::{BookingService, QueryService, Session, SessionCatalog};
use seatbook_testing::fixtures;
use seatbook_testing::mocks::{
    InMemoryIdempotencyStore, InMemorySeatLedger, InMemorySessionCatalog,
};
use seatbook_web::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Build a server over in-memory storage, returning the catalog for seeding.
fn test_server() -> (TestServer, InMemorySessionCatalog) {
    let catalog = InMemorySessionCatalog::new();
    let ledger = Arc::new(InMemorySeatLedger::new(catalog.clone()));
    let idempotency = Arc::new(InMemoryIdempotencyStore::new());
    let catalog_arc = Arc::new(catalog.clone());

    let bookings = BookingService::new(catalog_arc.clone(), ledger.clone(), idempotency);
    let queries = QueryService::new(catalog_arc.clone(), ledger);
    let state = AppState::new(catalog_arc, bookings, queries);

    let server = TestServer::new(build_router(state)).unwrap();
    (server, catalog)
}

fn bearer_for(user: Uuid) -> String {
    user.to_string()
}

fn idempotency_header() -> HeaderName {
    HeaderName::from_static("idempotency-key")
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn list_sessions_returns_seeded_catalog() {
    let (server, catalog) = test_server();
    catalog
        .insert_session(fixtures::new_session("Back rehab", 3))
        .await
        .unwrap();
    catalog
        .insert_session(fixtures::new_session("Posture clinic", 5))
        .await
        .unwrap();

    let response = server.get("/api/sessions").await;
    response.assert_status_ok();

    let sessions: Vec<Session> = response.json();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].title, "Back rehab");
    assert_eq!(sessions[1].capacity, 5);
}

#[tokio::test]
async fn session_detail_includes_booked_seats() {
    let (server, catalog) = test_server();
    let session = catalog
        .insert_session(fixtures::new_session("Back rehab", 3))
        .await
        .unwrap();

    let user = Uuid::new_v4();
    server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(user))
        .json(&json!({ "session_id": session.id.as_i64(), "seat_number": 2 }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get(&format!("/api/sessions/{}", session.id.as_i64()))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["title"], "Back rehab");
    assert_eq!(body["capacity"], 3);
    assert_eq!(body["bookedSeats"], json!([2]));
}

#[tokio::test]
async fn session_detail_unknown_id_is_not_found() {
    let (server, _catalog) = test_server();

    let response = server.get("/api/sessions/999").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

// ============================================================================
// Booking creation
// ============================================================================

#[tokio::test]
async fn booking_requires_authentication() {
    let (server, catalog) = test_server();
    let session = catalog
        .insert_session(fixtures::new_session("Back rehab", 3))
        .await
        .unwrap();

    let response = server
        .post("/api/bookings")
        .json(&json!({ "session_id": session.id.as_i64(), "seat_number": 1 }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_confirms_a_free_seat() {
    let (server, catalog) = test_server();
    let session = catalog
        .insert_session(fixtures::new_session("Back rehab", 3))
        .await
        .unwrap();

    let user = Uuid::new_v4();
    let response = server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(user))
        .json(&json!({ "session_id": session.id.as_i64(), "seat_number": 1 }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["status"], "CONFIRMED");
    assert_eq!(body["booking"]["session_id"], session.id.as_i64());
    assert_eq!(body["booking"]["seat_number"], 1);
    assert_eq!(body["booking"]["user_id"], user.to_string());
    assert_eq!(body["booking"]["status"], "CONFIRMED");
}

#[tokio::test]
async fn double_booking_a_seat_is_conflict() {
    let (server, catalog) = test_server();
    let session = catalog
        .insert_session(fixtures::new_session("Back rehab", 3))
        .await
        .unwrap();
    let body = json!({ "session_id": session.id.as_i64(), "seat_number": 1 });

    server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(Uuid::new_v4()))
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(Uuid::new_v4()))
        .json(&body)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let failed: Value = response.json();
    assert_eq!(failed["status"], "FAILED");
    assert!(
        failed["message"].as_str().unwrap().contains("already booked"),
        "unexpected message: {failed}"
    );
}

#[tokio::test]
async fn out_of_range_seat_is_unprocessable() {
    let (server, catalog) = test_server();
    let session = catalog
        .insert_session(fixtures::new_session("Back rehab", 3))
        .await
        .unwrap();

    let response = server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(Uuid::new_v4()))
        .json(&json!({ "session_id": session.id.as_i64(), "seat_number": 4 }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["status"], "FAILED");
    assert!(body["message"].as_str().unwrap().contains("valid seats are 1-3"));
}

#[tokio::test]
async fn booking_into_unknown_session_is_not_found() {
    let (server, _catalog) = test_server();

    let response = server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(Uuid::new_v4()))
        .json(&json!({ "session_id": 424_242, "seat_number": 1 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["status"], "FAILED");
}

// ============================================================================
// Idempotency
// ============================================================================

#[tokio::test]
async fn idempotency_key_replays_the_recorded_outcome() {
    let (server, catalog) = test_server();
    let session = catalog
        .insert_session(fixtures::new_session("Back rehab", 3))
        .await
        .unwrap();

    let user = Uuid::new_v4();
    let key = "checkout-7c2f1a9b4d6e8f03";
    let body = json!({ "session_id": session.id.as_i64(), "seat_number": 1 });

    let first = server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(user))
        .add_header(idempotency_header(), HeaderValue::from_static(key))
        .json(&body)
        .await;
    first.assert_status(StatusCode::CREATED);
    let first_body: Value = first.json();

    // A retry of the same request must not attempt a second reservation.
    let second = server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(user))
        .add_header(idempotency_header(), HeaderValue::from_static(key))
        .json(&body)
        .await;
    second.assert_status(StatusCode::CREATED);
    let second_body: Value = second.json();

    assert_eq!(first_body["booking"]["id"], second_body["booking"]["id"]);
}

#[tokio::test]
async fn malformed_idempotency_key_is_rejected() {
    let (server, catalog) = test_server();
    let session = catalog
        .insert_session(fixtures::new_session("Back rehab", 3))
        .await
        .unwrap();

    // Too short to be a usable key.
    let response = server
        .post("/api/bookings")
        .authorization_bearer(bearer_for(Uuid::new_v4()))
        .add_header(idempotency_header(), HeaderValue::from_static("short"))
        .json(&json!({ "session_id": session.id.as_i64(), "seat_number": 1 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Booking history
// ============================================================================

#[tokio::test]
async fn history_is_most_recent_first_with_session_context() {
    let (server, catalog) = test_server();
    let session = catalog
        .insert_session(fixtures::new_session("Back rehab", 5))
        .await
        .unwrap();

    let user = Uuid::new_v4();
    for seat in 1..=3 {
        server
            .post("/api/bookings")
            .authorization_bearer(bearer_for(user))
            .json(&json!({ "session_id": session.id.as_i64(), "seat_number": seat }))
            .await
            .assert_status(StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let response = server
        .get("/api/bookings")
        .authorization_bearer(bearer_for(user))
        .await;
    response.assert_status_ok();

    let entries: Vec<Value> = response.json();
    assert_eq!(entries.len(), 3);
    let seats: Vec<u64> = entries
        .iter()
        .map(|e| e["seat_number"].as_u64().unwrap())
        .collect();
    assert_eq!(seats, vec![3, 2, 1]);
    assert_eq!(entries[0]["session"]["title"], "Back rehab");

    // Another user sees an empty history.
    let other = server
        .get("/api/bookings")
        .authorization_bearer(bearer_for(Uuid::new_v4()))
        .await;
    other.assert_status_ok();
    let empty: Vec<Value> = other.json();
    assert!(empty.is_empty());
}

//! Axum HTTP surface for the seat booking service.
//!
//! This crate wires the booking domain from `seatbook-core` to HTTP:
//!
//! - **Extractors** pull the bearer-token user, correlation id, and
//!   idempotency key out of requests.
//! - **Handlers** translate JSON bodies into domain calls and domain
//!   outcomes into status codes.
//! - **`AppError`** maps domain errors to HTTP responses; the losing side
//!   of a seat race gets `409` with a structured `FAILED` body, never a
//!   `500`.
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract** the authenticated user and request metadata
//! 3. **Call** the booking or query service
//! 4. **Map** the outcome to a status code and JSON body

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod metrics;
pub mod server;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use extractors::{AuthUser, CorrelationId, IdempotencyKey};
pub use server::{build_router, AppState};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

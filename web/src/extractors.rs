//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: extract or generate request correlation IDs
//! - [`AuthUser`]: authenticated caller identity from the bearer token
//! - [`IdempotencyKey`]: optional `Idempotency-Key` header for bookings

use crate::error::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use seatbook_core::{idempotency, UserId};
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Extracts the `X-Correlation-ID` header, or generates a new UUID v4 if not
/// present.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .headers
            .get("X-Correlation-ID")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Authenticated caller identity.
///
/// Parses `Authorization: Bearer <token>`, where the token carries the opaque
/// user id issued by the identity layer. Token issuance and validation beyond
/// shape live outside this service; a request without a well-formed token
/// never reaches the ledger.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
        })?;

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        let uuid = Uuid::parse_str(token)
            .map_err(|_| AppError::unauthorized("Invalid bearer token format"))?;

        Ok(Self(UserId::from_uuid(uuid)))
    }
}

/// Optional `Idempotency-Key` header.
///
/// Absent header extracts as `IdempotencyKey(None)`. A present but malformed
/// key (wrong length or non-printable characters) is rejected with 400 before
/// any booking work happens.
#[derive(Debug, Clone)]
pub struct IdempotencyKey(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for IdempotencyKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get("Idempotency-Key") else {
            return Ok(Self(None));
        };

        let key = value
            .to_str()
            .map_err(|_| AppError::bad_request("Invalid Idempotency-Key header value"))?;

        if !idempotency::key_is_valid(key) {
            return Err(AppError::bad_request(format!(
                "Idempotency-Key must be {}-{} printable characters",
                idempotency::MIN_KEY_LEN,
                idempotency::MAX_KEY_LEN
            )));
        }

        Ok(Self(Some(key.to_string())))
    }
}

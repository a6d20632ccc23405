//! Idempotency-key support for booking requests.
//!
//! Booking clients have no way to tell a dropped response from a failed
//! request: a committed write whose response never arrived would otherwise
//! surface as a spurious conflict on retry. Callers may attach a
//! client-generated idempotency key to a booking request; the terminal
//! outcome is recorded under (user, key) and a retry with the same key
//! returns the recorded outcome instead of re-executing.
//!
//! Keys are scoped per user to prevent cross-user replay. Transient storage
//! failures are never recorded, so a retry after one re-executes the booking.

use crate::booking::BookingOutcome;
use crate::error::Result;
use crate::types::UserId;
use async_trait::async_trait;

/// Bounds on accepted idempotency keys, shared with the HTTP layer.
pub const MIN_KEY_LEN: usize = 16;
/// Upper bound on accepted idempotency keys.
pub const MAX_KEY_LEN: usize = 128;

/// Store of recorded booking outcomes keyed by (user, idempotency key).
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Fetch the recorded outcome for a key, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`](crate::error::BookingError::Storage)
    /// on a transient storage failure.
    async fn get(&self, user_id: UserId, key: &str) -> Result<Option<BookingOutcome>>;

    /// Record a terminal outcome under a key.
    ///
    /// First write wins; implementations must not overwrite an existing
    /// record for the same (user, key).
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`](crate::error::BookingError::Storage)
    /// on a transient storage failure.
    async fn put(&self, user_id: UserId, key: &str, outcome: &BookingOutcome) -> Result<()>;
}

/// Whether a client-supplied key is acceptable.
#[must_use]
pub fn key_is_valid(key: &str) -> bool {
    (MIN_KEY_LEN..=MAX_KEY_LEN).contains(&key.len())
        && key.chars().all(|c| c.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_length_bounds() {
        assert!(!key_is_valid("short"));
        assert!(key_is_valid("0123456789abcdef"));
        assert!(!key_is_valid(&"x".repeat(MAX_KEY_LEN + 1)));
    }

    #[test]
    fn key_rejects_non_printable() {
        assert!(!key_is_valid("0123456789abcde\n"));
        assert!(!key_is_valid("0123456789 abcdef"));
    }
}

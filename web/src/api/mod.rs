//! HTTP request handlers for the public API.

pub mod bookings;
pub mod sessions;

//! Prometheus metrics for the booking service.
//!
//! Counters are emitted by the booking service in `seatbook-core`; this
//! module registers their descriptions and installs the exporter.

use anyhow::Context;
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime; the exporter spawns its
/// own HTTP listener task.
///
/// # Errors
///
/// Returns an error if the exporter cannot bind or a recorder is already
/// installed.
pub fn install(addr: SocketAddr) -> anyhow::Result<()> {
    register_metrics();

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("failed to install Prometheus exporter")?;

    tracing::info!(addr = %addr, "Metrics available at http://{addr}/metrics");
    Ok(())
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "seatbook_bookings_total",
        "Booking attempts by final outcome (confirmed, conflict, invalid_seat, session_not_found)"
    );
    describe_counter!(
        "seatbook_booking_retries_total",
        "Reserve attempts retried after a transient storage failure"
    );
    describe_counter!(
        "seatbook_idempotent_replays_total",
        "Booking requests answered from a recorded idempotency outcome"
    );
}

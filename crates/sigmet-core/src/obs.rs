//! Structured observability hooks for the SIGMET lifecycle.
//!
//! This module provides:
//! - Record-scoped tracing spans via the `SigmetSpan` RAII guard
//! - Emission functions for lifecycle events: validation, sequencing,
//!   storage, publication and cancellation
//!
//! Events are emitted at `info!` level (`warn!` for rejections) and are
//! filtered through `RUST_LOG`; see [`crate::telemetry::init_tracing`].

use tracing::{info, warn};

/// RAII guard that enters a record-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = SigmetSpan::enter("0b6c1f9e-...");
/// // all tracing calls are now tagged with uuid = "0b6c1f9e-..."
/// ```
pub struct SigmetSpan {
    _span: tracing::span::EnteredSpan,
}

impl SigmetSpan {
    /// Create and enter a span tagged with the record uuid.
    pub fn enter(uuid: &str) -> Self {
        let span = tracing::info_span!("sigmet.record", uuid = %uuid);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a record passed validation.
pub fn emit_sigmet_validated(uuid: &str, status: &str, cancellation: bool) {
    info!(
        event = "sigmet.validated",
        uuid = %uuid,
        status = %status,
        cancellation = cancellation,
    );
}

/// Emit event: a record failed validation (warning level).
pub fn emit_sigmet_rejected(uuid: &str, error: &dyn std::fmt::Display) {
    warn!(event = "sigmet.rejected", uuid = %uuid, error = %error);
}

/// Emit event: the store handed out a sequence number.
pub fn emit_sequence_assigned(firname: &str, day: &str, sequence: i32) {
    info!(
        event = "sigmet.sequence_assigned",
        firname = %firname,
        day = %day,
        sequence = sequence,
    );
}

/// Emit event: a record was written to a store.
pub fn emit_sigmet_stored(uuid: &str, status: &str, digest: &str) {
    info!(event = "sigmet.stored", uuid = %uuid, status = %status, digest = %digest);
}

/// Emit event: a record was published under a sequence number.
pub fn emit_sigmet_published(uuid: &str, firname: &str, sequence: i32) {
    info!(
        event = "sigmet.published",
        uuid = %uuid,
        firname = %firname,
        sequence = sequence,
    );
}

/// Emit event: a published record was cancelled by another record.
pub fn emit_sigmet_cancelled(cancelled_uuid: &str, cancelling_uuid: &str, sequence: i32) {
    info!(
        event = "sigmet.cancelled",
        uuid = %cancelled_uuid,
        cancelled_by = %cancelling_uuid,
        sequence = sequence,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmet_span_create() {
        // Just ensure SigmetSpan::enter doesn't panic
        let _span = SigmetSpan::enter("test-uuid");
    }

    #[test]
    fn test_emitters_without_subscriber() {
        emit_sigmet_validated("u1", "PRODUCTION", false);
        emit_sigmet_rejected("u1", &"missing required field: geojson");
        emit_sequence_assigned("AMSTERDAM FIR", "2024-03-01", 1);
        emit_sigmet_stored("u1", "PRODUCTION", "abc123");
        emit_sigmet_published("u1", "AMSTERDAM FIR", 1);
        emit_sigmet_cancelled("u1", "u2", 2);
    }
}

//! Error types for the overlay pipeline.
//!
//! Stale failures, duplicate failures and confirmations without a recorded
//! cause are normal operation and never surface here. Only upstream contract
//! violations and runaway re-entrant dispatch are errors.

use thiserror::Error;

/// Errors returned by the gate and the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// A producer emitted an event missing a required field.
    ///
    /// Only reported when [`crate::GateConfig::strict_contract`] is set.
    /// Otherwise the event is forwarded without escalation.
    #[error("malformed {kind} event: {reason}")]
    MalformedEvent {
        /// Event kind, as returned by [`crate::OverlayEvent::kind`]
        kind: &'static str,
        /// What was missing
        reason: &'static str,
    },

    /// Derived events kept triggering further derived events.
    #[error("dispatch nested deeper than {depth} levels")]
    DispatchDepthExceeded {
        /// Depth at which dispatch was aborted
        depth: usize,
    },
}

impl OverlayError {
    /// Whether the error indicates a bug in an upstream producer rather than
    /// in the pipeline itself.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::MalformedEvent { .. })
    }
}

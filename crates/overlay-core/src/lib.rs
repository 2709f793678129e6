//! Fatal-error escalation and recovery tracking for the application overlay.
//!
//! Failures arrive from unrelated subsystems (remote config loading, the
//! transport connection, the conference session). This crate decides which of
//! them should surface a blocking full-application overlay, escalates each
//! distinct failure exactly once, and later re-emits the original failure as
//! non-recoverable when recovery is abandoned.
//!
//! # Architecture
//!
//! Everything here is a pure, synchronous state machine. Events flow through
//! two stages:
//!
//! ```text
//! producer ──> FailureGate ──> reduce ──> OverlayState ──> UI
//!                  │
//!                  └── GateAction::Dispatch (derived events, processed first)
//! ```
//!
//! The gate never performs effects itself. It returns declarative
//! [`GateAction`]s and the [`Store`] interprets them, recursively running
//! derived events through the whole pipeline before the triggering event is
//! reduced. The active connection and conference are read through the
//! injected [`ActiveResources`] capability at the moment a failure is gated.
//!
//! # Components
//!
//! - [`event`]: Event model (failures, escalation, UI flags)
//! - [`gate`]: Failure gate and escalator
//! - [`reducer`]: Fatal-state reducer
//! - [`state`]: Overlay state and overlay selection
//! - [`store`]: Synchronous dispatch pipeline owning the state
//! - [`resources`]: Active-resource capability
//! - [`config`]: Gate and store configuration
//! - [`error`]: Error types

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod reducer;
pub mod resources;
pub mod state;
pub mod store;

pub use config::{GateConfig, StoreConfig};
pub use error::OverlayError;
pub use event::{
    ConferenceId, ConnectionId, FailureError, FailureEvent, FatalErrorOccurred, OverlayEvent,
};
pub use gate::{FailureGate, GateAction};
pub use reducer::reduce;
pub use resources::{ActiveResources, StaticResources};
pub use state::{OverlayKind, OverlayState};
pub use store::Store;

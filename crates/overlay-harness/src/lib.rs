//! Deterministic simulation harness for overlay testing.
//!
//! Drives the real [`overlay_core::Store`] and a small reference model with
//! the same operation sequences so property tests and fuzz targets can compare
//! them step by step.

#![forbid(unsafe_code)]

pub mod model;
pub mod operation;
pub mod real;
pub mod sim_resources;

pub use model::{ModelOverlay, ObservableState, StepOutcome, Subject};
pub use operation::{HandleId, Operation, Verdict};
pub use real::RealOverlay;
pub use sim_resources::SimResources;

//! Synchronous dispatch pipeline.
//!
//! [`Store`] owns the single [`OverlayState`] and runs every event through the
//! gate and then the reducer. Derived events requested by the gate are
//! dispatched recursively, to completion, before the triggering event is
//! reduced:
//!
//! ```text
//! dispatch(ConnectionFailed)
//!   gate ─> Dispatch(FatalErrorOccurred) ─> gate ─> reduce   (delivered 1st)
//!        └> Forward(ConnectionFailed)   ─────────> reduce   (delivered 2nd)
//! ```
//!
//! Dispatch takes `&mut self`, so one event is fully processed before the
//! next is accepted.

use tracing::trace;

use crate::{
    config::StoreConfig,
    error::OverlayError,
    event::OverlayEvent,
    gate::{FailureGate, GateAction},
    reducer::reduce,
    resources::ActiveResources,
    state::OverlayState,
};

/// State container and event pipeline.
#[derive(Debug, Clone)]
pub struct Store<R> {
    state: OverlayState,
    gate: FailureGate,
    resources: R,
    max_dispatch_depth: usize,
}

impl<R: ActiveResources> Store<R> {
    /// Create a store in the idle state.
    pub fn new(resources: R, config: StoreConfig) -> Self {
        Self {
            state: OverlayState::default(),
            gate: FailureGate::new(config.gate),
            resources,
            max_dispatch_depth: config.max_dispatch_depth,
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Active-resource capability used by the gate.
    #[must_use]
    pub fn resources(&self) -> &R {
        &self.resources
    }

    /// Mutable access for owners that track the active instances in place.
    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }

    /// Dispatch an event.
    ///
    /// Returns every event handed to the reducer, in delivery order. Derived
    /// events appear before the event that triggered them.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::MalformedEvent`] if the gate rejects an event,
    /// or [`OverlayError::DispatchDepthExceeded`] if derived events nest too
    /// deeply. Events already reduced before the error stay reduced.
    pub fn dispatch(
        &mut self,
        event: impl Into<OverlayEvent>,
    ) -> Result<Vec<OverlayEvent>, OverlayError> {
        let mut delivered = Vec::new();
        self.dispatch_nested(event.into(), 0, &mut delivered)?;
        Ok(delivered)
    }

    fn dispatch_nested(
        &mut self,
        event: OverlayEvent,
        depth: usize,
        delivered: &mut Vec<OverlayEvent>,
    ) -> Result<(), OverlayError> {
        if depth > self.max_dispatch_depth {
            return Err(OverlayError::DispatchDepthExceeded { depth });
        }

        let actions = self.gate.intercept(event, &self.state, &self.resources)?;

        for action in actions {
            match action {
                GateAction::Dispatch(derived) => {
                    trace!(kind = derived.kind(), depth, "dispatching derived event");
                    self.dispatch_nested(derived, depth + 1, delivered)?;
                },
                GateAction::Forward(event) => {
                    self.state = reduce(&self.state, &event);
                    trace!(kind = event.kind(), depth, "reduced");
                    delivered.push(event);
                },
            }
        }

        Ok(())
    }
}

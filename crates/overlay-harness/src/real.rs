//! Real store wrapped with the model's interface.

use overlay_core::{ConferenceId, ConnectionId, OverlayError, OverlayEvent, Store, StoreConfig};

use crate::{
    model::{ObservableState, StepOutcome},
    operation::{HandleId, Operation},
    sim_resources::SimResources,
};

/// Real store driven by harness operations.
#[derive(Debug, Clone)]
pub struct RealOverlay {
    store: Store<SimResources>,
}

impl RealOverlay {
    /// Lenient store with the given active handles.
    pub fn new(connection: Option<HandleId>, conference: Option<HandleId>, seed: u64) -> Self {
        let mut resources = SimResources::with_seed(seed);
        resources.set_connection(connection.map(|id| ConnectionId(u64::from(id))));
        resources.set_conference(conference.map(|id| ConferenceId(u64::from(id))));

        Self { store: Store::new(resources, StoreConfig::lenient()) }
    }

    /// Underlying store.
    pub fn store(&self) -> &Store<SimResources> {
        &self.store
    }

    /// Observable state.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState::from_state(self.store.state())
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> Result<StepOutcome, OverlayError> {
        match *op {
            Operation::ReplaceConnection { connection } => {
                let connection = connection.map(|id| ConnectionId(u64::from(id)));
                self.store.resources_mut().set_connection(connection);
                return Ok(StepOutcome::default());
            },
            Operation::ReplaceConference { conference } => {
                let conference = conference.map(|id| ConferenceId(u64::from(id)));
                self.store.resources_mut().set_conference(conference);
                return Ok(StepOutcome::default());
            },
            _ => {},
        }

        let Some(event) = op.to_event() else {
            return Ok(StepOutcome::default());
        };
        let confirming = matches!(op, Operation::ConfirmOutcome);
        let delivered = self.store.dispatch(event)?;

        let escalated = delivered
            .iter()
            .any(|event| matches!(event, OverlayEvent::FatalErrorOccurred(f) if f.occurred));
        // Re-emitted cause is delivered ahead of the confirmation itself
        let reemitted = confirming && delivered.len() > 1;

        Ok(StepOutcome { escalated, reemitted })
    }
}

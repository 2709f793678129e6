//! Reference model of the overlay.
//!
//! Written independently of the gate and reducer: it tracks only what a UI
//! could observe and how many escalations and re-emissions should happen.

use overlay_core::{FailureEvent, OverlayState};

use crate::operation::{HandleId, Operation, Verdict};

/// What a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// Remote configuration
    Config,
    /// A connection handle
    Connection(HandleId),
    /// A conference handle
    Conference(HandleId),
}

impl Subject {
    /// Subject of a real failure event.
    ///
    /// Handles outside the harness range collapse to `None`.
    pub fn of(failure: &FailureEvent) -> Option<Self> {
        match failure {
            FailureEvent::ConfigLoadFailed { .. } => Some(Self::Config),
            FailureEvent::ConnectionFailed { connection, .. } => {
                HandleId::try_from(connection.0).ok().map(Self::Connection)
            },
            FailureEvent::ConferenceFailed { conference, .. } => {
                HandleId::try_from(conference.0).ok().map(Self::Conference)
            },
        }
    }
}

/// State visible to UI consumers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservableState {
    /// Fatal-error flag
    pub fatal_error_occurred: Option<bool>,
    /// Subject of the recorded cause
    pub cause: Option<Subject>,
    /// Suspend flag
    pub suspend_detected: bool,
    /// Prompt visibility
    pub prompt_visible: bool,
}

impl ObservableState {
    /// Project the real state.
    pub fn from_state(state: &OverlayState) -> Self {
        Self {
            fatal_error_occurred: state.fatal_error_occurred(),
            cause: state.fatal_error_cause().and_then(Subject::of),
            suspend_detected: state.suspend_detected(),
            prompt_visible: state.is_media_permission_prompt_visible(),
        }
    }
}

/// Side effects of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// An escalation was dispatched
    pub escalated: bool,
    /// The recorded cause was re-emitted as terminal
    pub reemitted: bool,
}

/// Reference model
#[derive(Debug, Clone, Default)]
pub struct ModelOverlay {
    connection: Option<HandleId>,
    conference: Option<HandleId>,
    state: ObservableState,
    escalations: usize,
}

impl ModelOverlay {
    /// Model with the given active handles.
    pub fn new(connection: Option<HandleId>, conference: Option<HandleId>) -> Self {
        Self { connection, conference, ..Self::default() }
    }

    /// Observable state.
    pub fn observable_state(&self) -> &ObservableState {
        &self.state
    }

    /// Escalations so far.
    pub fn escalations(&self) -> usize {
        self.escalations
    }

    /// Apply one operation. Malformed failures are treated leniently.
    pub fn apply(&mut self, op: &Operation) -> StepOutcome {
        match *op {
            Operation::ConfigLoadFailed { verdict } => self.failure(Subject::Config, verdict),
            Operation::ConnectionFailed { connection, verdict } => {
                if self.connection == Some(connection) {
                    self.failure(Subject::Connection(connection), verdict)
                } else {
                    StepOutcome::default()
                }
            },
            Operation::ConferenceFailed { conference, verdict } => {
                if self.conference == Some(conference) {
                    self.failure(Subject::Conference(conference), verdict)
                } else {
                    StepOutcome::default()
                }
            },
            Operation::ConfirmOutcome => {
                let reemitted = self.state.cause.take().is_some();
                self.state.fatal_error_occurred = Some(false);
                StepOutcome { escalated: false, reemitted }
            },
            Operation::Cancel => {
                self.state.cause = None;
                self.state.fatal_error_occurred = None;
                StepOutcome::default()
            },
            Operation::SuspendDetected => {
                self.state.suspend_detected = true;
                StepOutcome::default()
            },
            Operation::PromptVisibility { visible } => {
                self.state.prompt_visible = visible;
                StepOutcome::default()
            },
            Operation::ReplaceConnection { connection } => {
                self.connection = connection;
                StepOutcome::default()
            },
            Operation::ReplaceConference { conference } => {
                self.conference = conference;
                StepOutcome::default()
            },
        }
    }

    fn failure(&mut self, subject: Subject, verdict: Verdict) -> StepOutcome {
        if verdict != Verdict::Unclassified {
            return StepOutcome::default();
        }

        self.escalations += 1;
        self.state.fatal_error_occurred = Some(true);
        self.state.cause = Some(subject);
        StepOutcome { escalated: true, reemitted: false }
    }
}

//! Operations applied to both the model and the real store.

use arbitrary::Arbitrary;
use overlay_core::{
    ConferenceId, ConnectionId, FailureError, FailureEvent, FatalErrorOccurred, OverlayEvent,
};

/// Small handle space so generated failures regularly hit the active instance.
pub type HandleId = u8;

/// Recoverability verdict a generated failure arrives with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Verdict {
    /// No verdict yet, eligible for escalation
    Unclassified,
    /// Already marked recoverable
    Recoverable,
    /// Already marked terminal
    Terminal,
    /// Producer forgot the error record
    Missing,
}

impl Verdict {
    fn error(self, name: &str) -> Option<FailureError> {
        let error = FailureError::new(name);
        match self {
            Self::Unclassified => Some(error),
            Self::Recoverable => Some(error.classified(true)),
            Self::Terminal => Some(error.classified(false)),
            Self::Missing => None,
        }
    }
}

/// One step of a generated scenario.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Config loader reports a failure
    ConfigLoadFailed {
        /// Incoming verdict
        verdict: Verdict,
    },
    /// Transport reports a failure on a connection
    ConnectionFailed {
        /// Connection handle
        connection: HandleId,
        /// Incoming verdict
        verdict: Verdict,
    },
    /// Session layer reports a failure on a conference
    ConferenceFailed {
        /// Conference handle
        conference: HandleId,
        /// Incoming verdict
        verdict: Verdict,
    },
    /// Recovery abandoned, confirm the outcome
    ConfirmOutcome,
    /// Drop the fatal error without an outcome
    Cancel,
    /// Machine resumed from suspend
    SuspendDetected,
    /// Media permission prompt shown or hidden
    PromptVisibility {
        /// Whether the prompt is visible
        visible: bool,
    },
    /// Owner replaces (or drops) the active connection
    ReplaceConnection {
        /// New active connection
        connection: Option<HandleId>,
    },
    /// Owner replaces (or drops) the active conference
    ReplaceConference {
        /// New active conference
        conference: Option<HandleId>,
    },
}

impl Operation {
    /// Event to dispatch, or `None` for operations that only touch resources.
    pub fn to_event(&self) -> Option<OverlayEvent> {
        let event: OverlayEvent = match *self {
            Self::ConfigLoadFailed { verdict } => FailureEvent::ConfigLoadFailed {
                error: verdict.error("config.load"),
                location: None,
            }
            .into(),
            Self::ConnectionFailed { connection, verdict } => FailureEvent::ConnectionFailed {
                connection: ConnectionId(u64::from(connection)),
                error: verdict.error("connection.failed"),
            }
            .into(),
            Self::ConferenceFailed { conference, verdict } => FailureEvent::ConferenceFailed {
                conference: ConferenceId(u64::from(conference)),
                error: verdict.error("conference.failed"),
            }
            .into(),
            Self::ConfirmOutcome => FatalErrorOccurred::confirmed().into(),
            Self::Cancel => OverlayEvent::CancelFatalErrorOccurred,
            Self::SuspendDetected => OverlayEvent::SuspendDetected,
            Self::PromptVisibility { visible } => {
                OverlayEvent::MediaPermissionPromptVisibilityChanged {
                    browser: "chrome".to_string(),
                    is_visible: visible,
                }
            },
            Self::ReplaceConnection { .. } | Self::ReplaceConference { .. } => return None,
        };
        Some(event)
    }
}

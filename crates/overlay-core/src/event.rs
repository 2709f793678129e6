//! Events carried by the overlay pipeline.
//!
//! Producers hand failures in as [`FailureEvent`]s wrapped in
//! [`OverlayEvent::Failure`]. The gate derives [`FatalErrorOccurred`] events
//! from them, and the reducer folds everything into
//! [`crate::OverlayState`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a transport connection instance.
///
/// Handles are compared by value. A new connection attempt gets a new handle,
/// so failures reported against an old handle are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

/// Identity of a conference (session) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConferenceId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection#{}", self.0)
    }
}

impl fmt::Display for ConferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conference#{}", self.0)
    }
}

/// Error record attached to a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureError {
    /// Error name as reported by the producing subsystem
    pub name: String,
    /// Optional human-readable detail
    #[serde(default)]
    pub message: Option<String>,
    /// Recoverability verdict. `None` until the gate classifies the failure.
    #[serde(default)]
    pub recoverable: Option<bool>,
}

impl FailureError {
    /// Create an unclassified error with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), message: None, recoverable: None }
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Copy of this error carrying the given recoverability verdict.
    #[must_use]
    pub fn classified(&self, recoverable: bool) -> Self {
        Self { recoverable: Some(recoverable), ..self.clone() }
    }

    /// Whether the gate (or the producer) already decided recoverability.
    pub fn is_classified(&self) -> bool {
        self.recoverable.is_some()
    }
}

/// Failure reported by one of the observed subsystems.
///
/// `error` is optional because producers are outside our control. A failure
/// without an error is a contract violation and is never escalated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureEvent {
    /// Remote configuration could not be loaded.
    ConfigLoadFailed {
        /// Error record
        #[serde(default)]
        error: Option<FailureError>,
        /// Location of the configuration that failed to load
        #[serde(default)]
        location: Option<String>,
    },

    /// A transport connection failed.
    ConnectionFailed {
        /// Connection the failure refers to
        connection: ConnectionId,
        /// Error record
        #[serde(default)]
        error: Option<FailureError>,
    },

    /// A conference failed.
    ConferenceFailed {
        /// Conference the failure refers to
        conference: ConferenceId,
        /// Error record
        #[serde(default)]
        error: Option<FailureError>,
    },
}

impl FailureEvent {
    /// Config load failure without a known location.
    pub fn config_load_failed(error: FailureError) -> Self {
        Self::ConfigLoadFailed { error: Some(error), location: None }
    }

    /// Connection failure.
    pub fn connection_failed(connection: ConnectionId, error: FailureError) -> Self {
        Self::ConnectionFailed { connection, error: Some(error) }
    }

    /// Conference failure.
    pub fn conference_failed(conference: ConferenceId, error: FailureError) -> Self {
        Self::ConferenceFailed { conference, error: Some(error) }
    }

    /// Short name used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigLoadFailed { .. } => "ConfigLoadFailed",
            Self::ConnectionFailed { .. } => "ConnectionFailed",
            Self::ConferenceFailed { .. } => "ConferenceFailed",
        }
    }

    /// Error record, if the producer supplied one.
    pub fn error(&self) -> Option<&FailureError> {
        match self {
            Self::ConfigLoadFailed { error, .. }
            | Self::ConnectionFailed { error, .. }
            | Self::ConferenceFailed { error, .. } => error.as_ref(),
        }
    }

    /// Recoverability verdict carried by the error, if any.
    pub fn recoverable(&self) -> Option<bool> {
        self.error().and_then(|error| error.recoverable)
    }

    /// Copy of this event whose error carries the given verdict.
    ///
    /// The receiver is left untouched. Events without an error are copied
    /// unchanged.
    #[must_use]
    pub fn with_recoverable(&self, recoverable: bool) -> Self {
        let error = self.error().map(|error| error.classified(recoverable));
        match self {
            Self::ConfigLoadFailed { location, .. } => {
                Self::ConfigLoadFailed { error, location: location.clone() }
            },
            Self::ConnectionFailed { connection, .. } => {
                Self::ConnectionFailed { connection: *connection, error }
            },
            Self::ConferenceFailed { conference, .. } => {
                Self::ConferenceFailed { conference: *conference, error }
            },
        }
    }
}

/// Escalation event.
///
/// `occurred: true` with a cause activates the fatal-error overlay.
/// `occurred: false` confirms that recovery was abandoned: the gate re-emits
/// the recorded cause as non-recoverable and the reducer clears the cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatalErrorOccurred {
    /// Whether a fatal condition is active
    pub occurred: bool,
    /// Failure that triggered the condition
    #[serde(default)]
    pub cause: Option<FailureEvent>,
}

impl FatalErrorOccurred {
    /// Activate the fatal-error state for `cause`.
    pub fn raised(cause: FailureEvent) -> Self {
        Self { occurred: true, cause: Some(cause) }
    }

    /// Confirm the outcome of the active fatal error.
    pub fn confirmed() -> Self {
        Self { occurred: false, cause: None }
    }
}

/// Every event that flows through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayEvent {
    /// Failure from an observed subsystem.
    Failure(FailureEvent),

    /// Escalation raised or confirmed.
    FatalErrorOccurred(FatalErrorOccurred),

    /// Drop the fatal-error state without confirming an outcome.
    CancelFatalErrorOccurred,

    /// The browser's media permission prompt was shown or hidden.
    MediaPermissionPromptVisibilityChanged {
        /// Browser name, used by the UI to pick instructions
        browser: String,
        /// Whether the prompt is visible
        is_visible: bool,
    },

    /// The host machine resumed from suspend.
    SuspendDetected,

    /// Event owned by another feature. Passes through untouched.
    Other {
        /// Event name
        kind: String,
    },
}

impl OverlayEvent {
    /// Short name used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Failure(failure) => failure.kind(),
            Self::FatalErrorOccurred(_) => "FatalErrorOccurred",
            Self::CancelFatalErrorOccurred => "CancelFatalErrorOccurred",
            Self::MediaPermissionPromptVisibilityChanged { .. } => {
                "MediaPermissionPromptVisibilityChanged"
            },
            Self::SuspendDetected => "SuspendDetected",
            Self::Other { .. } => "Other",
        }
    }

    /// The failure carried by this event, if it is one.
    pub fn as_failure(&self) -> Option<&FailureEvent> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<FailureEvent> for OverlayEvent {
    fn from(failure: FailureEvent) -> Self {
        Self::Failure(failure)
    }
}

impl From<FatalErrorOccurred> for OverlayEvent {
    fn from(fatal: FatalErrorOccurred) -> Self {
        Self::FatalErrorOccurred(fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_recoverable_leaves_original_untouched() {
        let original =
            FailureEvent::connection_failed(ConnectionId(7), FailureError::new("net.dropped"));

        let annotated = original.with_recoverable(true);

        assert_eq!(original.recoverable(), None);
        assert_eq!(annotated.recoverable(), Some(true));
        assert!(matches!(
            annotated,
            FailureEvent::ConnectionFailed { connection: ConnectionId(7), .. }
        ));
    }

    #[test]
    fn with_recoverable_keeps_config_location() {
        let original = FailureEvent::ConfigLoadFailed {
            error: Some(FailureError::new("config.unreachable").with_message("timed out")),
            location: Some("https://meet.example/config.js".to_string()),
        };

        let terminal = original.with_recoverable(false);

        let FailureEvent::ConfigLoadFailed { error: Some(error), location } = terminal else {
            unreachable!("variant must be preserved");
        };
        assert_eq!(location.as_deref(), Some("https://meet.example/config.js"));
        assert_eq!(error.message.as_deref(), Some("timed out"));
        assert_eq!(error.recoverable, Some(false));
    }

    #[test]
    fn with_recoverable_without_error_is_a_copy() {
        let original = FailureEvent::ConferenceFailed { conference: ConferenceId(3), error: None };
        assert_eq!(original.with_recoverable(false), original);
    }

    #[test]
    fn kinds() {
        let failure = FailureEvent::conference_failed(ConferenceId(1), FailureError::new("x"));
        assert_eq!(failure.kind(), "ConferenceFailed");
        assert_eq!(OverlayEvent::from(failure).kind(), "ConferenceFailed");
        assert_eq!(
            OverlayEvent::from(FatalErrorOccurred::confirmed()).kind(),
            "FatalErrorOccurred"
        );
        assert_eq!(OverlayEvent::SuspendDetected.kind(), "SuspendDetected");
    }

    #[test]
    fn decodes_producer_failure_without_error() {
        let json = r#"{"Failure":{"ConnectionFailed":{"connection":3}}}"#;

        let event: OverlayEvent = serde_json::from_str(json).unwrap();

        assert_eq!(
            event,
            OverlayEvent::Failure(FailureEvent::ConnectionFailed {
                connection: ConnectionId(3),
                error: None,
            })
        );
    }

    #[test]
    fn decodes_unclassified_error() {
        let json = r#"{"ConferenceFailed":{"conference":8,"error":{"name":"conference.kicked"}}}"#;

        let failure: FailureEvent = serde_json::from_str(json).unwrap();

        assert_eq!(
            failure,
            FailureEvent::conference_failed(ConferenceId(8), FailureError::new("conference.kicked"))
        );
        assert_eq!(failure.recoverable(), None);
    }

    #[test]
    fn events_survive_json() {
        let error = FailureError::new("config.load").with_message("HTTP 500").classified(true);
        let events = [
            OverlayEvent::from(FatalErrorOccurred::raised(FailureEvent::ConfigLoadFailed {
                error: Some(error),
                location: Some("https://meet.example/config.js".to_string()),
            })),
            OverlayEvent::from(FatalErrorOccurred::confirmed()),
            OverlayEvent::CancelFatalErrorOccurred,
            OverlayEvent::MediaPermissionPromptVisibilityChanged {
                browser: "firefox".to_string(),
                is_visible: true,
            },
            OverlayEvent::Other { kind: "Joined".to_string() },
        ];

        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let decoded: OverlayEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn display_handles() {
        assert_eq!(ConnectionId(4).to_string(), "connection#4");
        assert_eq!(ConferenceId(9).to_string(), "conference#9");
    }
}

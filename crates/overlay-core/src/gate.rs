//! Failure gate and escalator.
//!
//! Runs before the reducer for every event and decides whether a failure
//! should raise the fatal-error overlay.
//!
//! # Architecture: Action-Based Interceptor
//!
//! - [`FailureGate::intercept`] takes the event, the current state and the
//!   resource capability
//! - It returns `Result<Vec<GateAction>, OverlayError>`
//! - The store executes the actions in order
//!
//! Every event ends in exactly one [`GateAction::Forward`]. Gating only
//! decides which derived events are dispatched ahead of it.
//!
//! # Escalation
//!
//! A relevant failure whose error has no recoverability verdict yet is
//! annotated as recoverable and escalated. An already classified error is
//! forwarded without escalation, which makes escalation idempotent per error.
//! Connection and conference failures are relevant only while their subject
//! is the current instance. Config load failures are always relevant.
//!
//! Confirming the outcome (`FatalErrorOccurred { occurred: false }`) re-emits
//! the recorded cause with `recoverable: Some(false)` so reload logic sees the
//! final verdict.

use tracing::{debug, info, warn};

use crate::{
    config::GateConfig,
    error::OverlayError,
    event::{ConferenceId, ConnectionId, FailureEvent, FatalErrorOccurred, OverlayEvent},
    resources::ActiveResources,
    state::OverlayState,
};

/// Actions returned by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    /// Run this derived event through the whole pipeline before the
    /// triggering event continues.
    Dispatch(OverlayEvent),

    /// Hand the (possibly annotated) triggering event to the reducer.
    Forward(OverlayEvent),
}

/// Failure gate
#[derive(Debug, Clone, Default)]
pub struct FailureGate {
    config: GateConfig,
}

impl FailureGate {
    /// Create a gate with the given configuration.
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Gate a single event.
    ///
    /// `state` is the state before this event is reduced. `resources` is
    /// queried now, not when the event was created.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::MalformedEvent`] for events missing required
    /// fields when the gate runs in strict mode.
    pub fn intercept<R: ActiveResources + ?Sized>(
        &self,
        event: OverlayEvent,
        state: &OverlayState,
        resources: &R,
    ) -> Result<Vec<GateAction>, OverlayError> {
        match event {
            OverlayEvent::Failure(failure) => match failure {
                FailureEvent::ConfigLoadFailed { .. } => self.on_config_load_failed(failure),
                FailureEvent::ConnectionFailed { connection, .. } => {
                    self.on_connection_failed(connection, failure, resources)
                },
                FailureEvent::ConferenceFailed { conference, .. } => {
                    self.on_conference_failed(conference, failure, resources)
                },
            },
            OverlayEvent::FatalErrorOccurred(fatal) => self.on_fatal_error_occurred(fatal, state),
            other @ (OverlayEvent::CancelFatalErrorOccurred
            | OverlayEvent::MediaPermissionPromptVisibilityChanged { .. }
            | OverlayEvent::SuspendDetected
            | OverlayEvent::Other { .. }) => Ok(vec![GateAction::Forward(other)]),
        }
    }

    // Config loading has no notion of a current instance, and only the
    // relevant failures are reported by the loader.
    fn on_config_load_failed(&self, failure: FailureEvent) -> Result<Vec<GateAction>, OverlayError> {
        self.maybe_escalate(failure)
    }

    fn on_connection_failed<R: ActiveResources + ?Sized>(
        &self,
        connection: ConnectionId,
        failure: FailureEvent,
        resources: &R,
    ) -> Result<Vec<GateAction>, OverlayError> {
        let current = resources.current_connection();

        if current != Some(connection) {
            debug!(%connection, ?current, "ignoring failure of inactive connection");
            return Ok(vec![GateAction::Forward(failure.into())]);
        }

        self.maybe_escalate(failure)
    }

    fn on_conference_failed<R: ActiveResources + ?Sized>(
        &self,
        conference: ConferenceId,
        failure: FailureEvent,
        resources: &R,
    ) -> Result<Vec<GateAction>, OverlayError> {
        let current = resources.current_conference();

        if current != Some(conference) {
            debug!(%conference, ?current, "ignoring failure of inactive conference");
            return Ok(vec![GateAction::Forward(failure.into())]);
        }

        self.maybe_escalate(failure)
    }

    fn maybe_escalate(&self, failure: FailureEvent) -> Result<Vec<GateAction>, OverlayError> {
        let kind = failure.kind();

        let Some(error) = failure.error() else {
            return self.malformed(kind, "failure event carries no error", failure.into());
        };

        if error.is_classified() {
            debug!(kind, recoverable = ?error.recoverable, "failure already classified");
            return Ok(vec![GateAction::Forward(failure.into())]);
        }

        // Recoverable until proven otherwise
        let annotated = failure.with_recoverable(true);
        info!(kind, error = %error.name, "escalating failure to fatal error");

        Ok(vec![
            GateAction::Dispatch(FatalErrorOccurred::raised(annotated.clone()).into()),
            GateAction::Forward(annotated.into()),
        ])
    }

    fn on_fatal_error_occurred(
        &self,
        fatal: FatalErrorOccurred,
        state: &OverlayState,
    ) -> Result<Vec<GateAction>, OverlayError> {
        if !fatal.occurred {
            return Ok(self.on_fatal_error_outcome(fatal, state));
        }

        // The cause is re-emitted through the gate on confirmation, so it must
        // pass the same contract check now
        let defect = match &fatal.cause {
            None => Some("raised without a cause"),
            Some(cause) if cause.error().is_none() => Some("cause carries no error"),
            Some(_) => None,
        };
        if let Some(reason) = defect {
            return self.malformed("FatalErrorOccurred", reason, fatal.into());
        }

        Ok(vec![GateAction::Forward(fatal.into())])
    }

    fn on_fatal_error_outcome(
        &self,
        fatal: FatalErrorOccurred,
        state: &OverlayState,
    ) -> Vec<GateAction> {
        let mut actions = Vec::with_capacity(2);

        match state.fatal_error_cause() {
            Some(cause) => {
                let terminal = cause.with_recoverable(false);
                info!(kind = terminal.kind(), "re-emitting fatal error cause as non-recoverable");
                actions.push(GateAction::Dispatch(terminal.into()));
            },
            None => info!("no fatal error cause recorded"),
        }

        actions.push(GateAction::Forward(fatal.into()));
        actions
    }

    fn malformed(
        &self,
        kind: &'static str,
        reason: &'static str,
        event: OverlayEvent,
    ) -> Result<Vec<GateAction>, OverlayError> {
        if self.config.strict_contract {
            return Err(OverlayError::MalformedEvent { kind, reason });
        }

        warn!(kind, reason, "malformed event, not escalating");
        Ok(vec![GateAction::Forward(event)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::FailureError, reducer::reduce, resources::StaticResources};

    fn resources() -> StaticResources {
        StaticResources::new().with_connection(ConnectionId(1)).with_conference(ConferenceId(10))
    }

    fn lenient() -> FailureGate {
        FailureGate::new(GateConfig { strict_contract: false })
    }

    fn strict() -> FailureGate {
        FailureGate::new(GateConfig { strict_contract: true })
    }

    #[test]
    fn current_connection_failure_escalates() {
        let failure = FailureEvent::connection_failed(ConnectionId(1), FailureError::new("drop"));

        let actions =
            lenient().intercept(failure.clone().into(), &OverlayState::default(), &resources());

        let annotated = failure.with_recoverable(true);
        assert_eq!(
            actions.unwrap(),
            vec![
                GateAction::Dispatch(FatalErrorOccurred::raised(annotated.clone()).into()),
                GateAction::Forward(annotated.into()),
            ]
        );
    }

    #[test]
    fn stale_connection_failure_is_forwarded_unchanged() {
        let failure = FailureEvent::connection_failed(ConnectionId(2), FailureError::new("drop"));

        let actions = lenient()
            .intercept(failure.clone().into(), &OverlayState::default(), &resources())
            .unwrap();

        assert_eq!(actions, vec![GateAction::Forward(failure.into())]);
    }

    #[test]
    fn failure_without_active_connection_is_stale() {
        let failure = FailureEvent::connection_failed(ConnectionId(1), FailureError::new("drop"));

        let actions = lenient()
            .intercept(failure.clone().into(), &OverlayState::default(), &StaticResources::new())
            .unwrap();

        assert_eq!(actions, vec![GateAction::Forward(failure.into())]);
    }

    #[test]
    fn conference_failure_respects_current_conference() {
        let current =
            FailureEvent::conference_failed(ConferenceId(10), FailureError::new("kicked"));
        let stale = FailureEvent::conference_failed(ConferenceId(11), FailureError::new("kicked"));

        let actions =
            lenient().intercept(current.into(), &OverlayState::default(), &resources()).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], GateAction::Dispatch(OverlayEvent::FatalErrorOccurred(_))));

        let actions = lenient()
            .intercept(stale.clone().into(), &OverlayState::default(), &resources())
            .unwrap();
        assert_eq!(actions, vec![GateAction::Forward(stale.into())]);
    }

    #[test]
    fn config_failure_always_relevant() {
        let failure = FailureEvent::config_load_failed(FailureError::new("config.404"));

        let actions = lenient()
            .intercept(failure.into(), &OverlayState::default(), &StaticResources::new())
            .unwrap();

        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn classified_failure_does_not_escalate() {
        let failure = FailureEvent::connection_failed(
            ConnectionId(1),
            FailureError::new("drop").classified(false),
        );

        let actions = lenient()
            .intercept(failure.clone().into(), &OverlayState::default(), &resources())
            .unwrap();

        assert_eq!(actions, vec![GateAction::Forward(failure.into())]);
    }

    #[test]
    fn outcome_reemits_cause_as_terminal() {
        let cause = FailureEvent::connection_failed(
            ConnectionId(1),
            FailureError::new("drop").classified(true),
        );
        let raised = OverlayEvent::from(FatalErrorOccurred::raised(cause.clone()));
        let state = reduce(&OverlayState::default(), &raised);

        let actions = lenient()
            .intercept(FatalErrorOccurred::confirmed().into(), &state, &resources())
            .unwrap();

        assert_eq!(
            actions,
            vec![
                GateAction::Dispatch(cause.with_recoverable(false).into()),
                GateAction::Forward(FatalErrorOccurred::confirmed().into()),
            ]
        );
    }

    #[test]
    fn outcome_without_cause_only_forwards() {
        let idle = OverlayState::default();
        let actions =
            lenient().intercept(FatalErrorOccurred::confirmed().into(), &idle, &resources()).unwrap();

        assert_eq!(actions, vec![GateAction::Forward(FatalErrorOccurred::confirmed().into())]);
    }

    #[test]
    fn missing_error_is_forwarded_when_lenient() {
        let failure = FailureEvent::ConnectionFailed { connection: ConnectionId(1), error: None };

        let actions = lenient()
            .intercept(failure.clone().into(), &OverlayState::default(), &resources())
            .unwrap();

        assert_eq!(actions, vec![GateAction::Forward(failure.into())]);
    }

    #[test]
    fn missing_error_is_rejected_when_strict() {
        let failure = FailureEvent::ConfigLoadFailed { error: None, location: None };

        let result = strict().intercept(failure.into(), &OverlayState::default(), &resources());

        assert_eq!(
            result,
            Err(OverlayError::MalformedEvent {
                kind: "ConfigLoadFailed",
                reason: "failure event carries no error",
            })
        );
    }

    #[test]
    fn stale_failure_without_error_is_not_checked() {
        let failure = FailureEvent::ConnectionFailed { connection: ConnectionId(5), error: None };

        let result = strict().intercept(failure.into(), &OverlayState::default(), &resources());

        assert!(result.is_ok());
    }

    #[test]
    fn raise_without_cause_is_rejected_when_strict() {
        let fatal = FatalErrorOccurred { occurred: true, cause: None };

        let result = strict().intercept(fatal.into(), &OverlayState::default(), &resources());

        assert!(matches!(result, Err(OverlayError::MalformedEvent { .. })));
    }

    #[test]
    fn raise_with_errorless_cause_is_rejected_when_strict() {
        let cause = FailureEvent::ConnectionFailed { connection: ConnectionId(1), error: None };

        let result = strict().intercept(
            FatalErrorOccurred::raised(cause).into(),
            &OverlayState::default(),
            &resources(),
        );

        assert_eq!(
            result,
            Err(OverlayError::MalformedEvent {
                kind: "FatalErrorOccurred",
                reason: "cause carries no error",
            })
        );
    }

    #[test]
    fn unrelated_events_pass_through() {
        for event in [
            OverlayEvent::CancelFatalErrorOccurred,
            OverlayEvent::SuspendDetected,
            OverlayEvent::Other { kind: "Joined".to_string() },
        ] {
            let actions = strict()
                .intercept(event.clone(), &OverlayState::default(), &resources())
                .unwrap();
            assert_eq!(actions, vec![GateAction::Forward(event)]);
        }
    }
}

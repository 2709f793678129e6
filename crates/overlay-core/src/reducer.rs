//! Fatal-state reducer.
//!
//! # State Machine
//!
//! Projection onto the fatal-error fields:
//!
//! ```text
//!            FatalErrorOccurred{true, cause}
//! ┌──────┐ ─────────────────────────────────> ┌────────┐
//! │ Idle │                                     │ Active │
//! └──────┘ <───────────────────────────────── └────────┘
//!            CancelFatalErrorOccurred (None)
//!            FatalErrorOccurred{false} (Some(false))
//! ```
//!
//! Media permission prompt visibility and suspend detection are independent
//! of the fatal-error fields. Suspend detection is never reset.

use crate::{
    event::{FatalErrorOccurred, OverlayEvent},
    state::OverlayState,
};

/// Compute the next state. Total over every event; events the overlay does not
/// own leave the state unchanged.
#[must_use]
pub fn reduce(state: &OverlayState, event: &OverlayEvent) -> OverlayState {
    match event {
        OverlayEvent::FatalErrorOccurred(fatal) => fatal_error_occurred(state, fatal),
        OverlayEvent::CancelFatalErrorOccurred => cancel_fatal_error_occurred(state),
        OverlayEvent::MediaPermissionPromptVisibilityChanged { browser, is_visible } => {
            OverlayState {
                browser: Some(browser.clone()),
                is_media_permission_prompt_visible: *is_visible,
                ..state.clone()
            }
        },
        OverlayEvent::SuspendDetected => OverlayState { suspend_detected: true, ..state.clone() },
        OverlayEvent::Failure(_) | OverlayEvent::Other { .. } => state.clone(),
    }
}

fn fatal_error_occurred(state: &OverlayState, fatal: &FatalErrorOccurred) -> OverlayState {
    match (fatal.occurred, &fatal.cause) {
        (true, Some(cause)) => OverlayState {
            fatal_error_occurred: Some(true),
            fatal_error_cause: Some(cause.clone()),
            ..state.clone()
        },
        // Raised without a cause would break the idle/active invariant
        (true, None) => state.clone(),
        (false, _) => OverlayState {
            fatal_error_occurred: Some(false),
            fatal_error_cause: None,
            ..state.clone()
        },
    }
}

fn cancel_fatal_error_occurred(state: &OverlayState) -> OverlayState {
    OverlayState { fatal_error_occurred: None, fatal_error_cause: None, ..state.clone() }
}

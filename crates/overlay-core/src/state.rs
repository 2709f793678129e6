//! Overlay state and overlay selection.

use serde::{Deserialize, Serialize};

use crate::event::FailureEvent;

/// Blocking overlay a UI should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Fatal error: offer a page reload
    PageReload,
    /// Machine resumed from suspend
    Suspended,
    /// Guide the user through the browser's media permission prompt
    MediaPermissionPrompt,
}

/// State owned by the fatal-state reducer.
///
/// Fields are read-only outside this crate. The only way to change state is to
/// dispatch an event through [`crate::Store`] (or call [`crate::reduce`]).
///
/// Invariant: `fatal_error_cause` is `Some` iff `fatal_error_occurred` is
/// `Some(true)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayState {
    pub(crate) fatal_error_occurred: Option<bool>,
    pub(crate) fatal_error_cause: Option<FailureEvent>,
    pub(crate) is_media_permission_prompt_visible: bool,
    pub(crate) browser: Option<String>,
    pub(crate) suspend_detected: bool,
}

impl OverlayState {
    /// Fatal-error flag. `None` when idle or cancelled, `Some(false)` after an
    /// outcome was confirmed.
    #[must_use]
    pub fn fatal_error_occurred(&self) -> Option<bool> {
        self.fatal_error_occurred
    }

    /// Failure that triggered the active fatal error.
    #[must_use]
    pub fn fatal_error_cause(&self) -> Option<&FailureEvent> {
        self.fatal_error_cause.as_ref()
    }

    /// Whether a fatal error is currently active.
    #[must_use]
    pub fn is_fatal_error_active(&self) -> bool {
        self.fatal_error_occurred == Some(true)
    }

    /// Recoverability verdict of the active fatal error's cause.
    #[must_use]
    pub fn fatal_error_recoverable(&self) -> Option<bool> {
        self.fatal_error_cause.as_ref().and_then(FailureEvent::recoverable)
    }

    /// Whether the media permission prompt is visible.
    #[must_use]
    pub fn is_media_permission_prompt_visible(&self) -> bool {
        self.is_media_permission_prompt_visible
    }

    /// Browser reported with the last prompt visibility change.
    #[must_use]
    pub fn browser(&self) -> Option<&str> {
        self.browser.as_deref()
    }

    /// Whether a suspend was ever detected.
    #[must_use]
    pub fn suspend_detected(&self) -> bool {
        self.suspend_detected
    }

    /// Overlay to render, highest priority first.
    #[must_use]
    pub fn overlay_to_render(&self) -> Option<OverlayKind> {
        if self.is_fatal_error_active() {
            Some(OverlayKind::PageReload)
        } else if self.suspend_detected {
            Some(OverlayKind::Suspended)
        } else if self.is_media_permission_prompt_visible {
            Some(OverlayKind::MediaPermissionPrompt)
        } else {
            None
        }
    }

    /// Check the idle/active invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.fatal_error_cause.is_some() == self.is_fatal_error_active()
    }
}

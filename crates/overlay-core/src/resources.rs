//! Active-resource capability.
//!
//! The connection and conference lifecycles are owned elsewhere. The gate only
//! needs to know which instances are current at the instant a failure is
//! evaluated, so that failures on replaced instances are not escalated.

use crate::event::{ConferenceId, ConnectionId};

/// Read-only view of the currently active connection and conference.
///
/// Implementations must answer with the current value on every call. The gate
/// never caches the result.
pub trait ActiveResources {
    /// Connection the application currently considers active.
    fn current_connection(&self) -> Option<ConnectionId>;

    /// Conference the application currently considers active.
    fn current_conference(&self) -> Option<ConferenceId>;
}

impl<T: ActiveResources + ?Sized> ActiveResources for &T {
    fn current_connection(&self) -> Option<ConnectionId> {
        (**self).current_connection()
    }

    fn current_conference(&self) -> Option<ConferenceId> {
        (**self).current_conference()
    }
}

/// Resources set explicitly by the owner.
///
/// Suitable for hosts that track the active instances themselves, and for
/// tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticResources {
    connection: Option<ConnectionId>,
    conference: Option<ConferenceId>,
}

impl StaticResources {
    /// No active connection or conference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the active connection.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionId) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Builder: set the active conference.
    #[must_use]
    pub fn with_conference(mut self, conference: ConferenceId) -> Self {
        self.conference = Some(conference);
        self
    }

    /// Replace (or clear) the active connection.
    pub fn set_connection(&mut self, connection: Option<ConnectionId>) {
        self.connection = connection;
    }

    /// Replace (or clear) the active conference.
    pub fn set_conference(&mut self, conference: Option<ConferenceId>) {
        self.conference = conference;
    }
}

impl ActiveResources for StaticResources {
    fn current_connection(&self) -> Option<ConnectionId> {
        self.connection
    }

    fn current_conference(&self) -> Option<ConferenceId> {
        self.conference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_replace_and_clear() {
        let mut resources = StaticResources::new()
            .with_connection(ConnectionId(1))
            .with_conference(ConferenceId(2));

        resources.set_connection(Some(ConnectionId(3)));
        resources.set_conference(Some(ConferenceId(4)));
        assert_eq!(resources.current_connection(), Some(ConnectionId(3)));
        assert_eq!(resources.current_conference(), Some(ConferenceId(4)));

        resources.set_conference(None);
        assert_eq!(resources.current_conference(), None);
        assert_eq!(resources.current_connection(), Some(ConnectionId(3)));
    }

    #[test]
    fn borrowed_resources_answer_live() {
        let resources = StaticResources::new().with_conference(ConferenceId(5));
        let borrowed = &resources;

        assert_eq!(borrowed.current_conference(), Some(ConferenceId(5)));
        assert_eq!(borrowed.current_connection(), None);
    }
}

//! Simulated owner of the active connection and conference.
//!
//! Seeded so that a failing scenario can be replayed exactly.

use overlay_core::{ActiveResources, ConferenceId, ConnectionId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Active resources driven by the harness.
#[derive(Debug, Clone)]
pub struct SimResources {
    connection: Option<ConnectionId>,
    conference: Option<ConferenceId>,
    next_handle: u64,
    rng: ChaCha8Rng,
}

impl SimResources {
    /// Nothing active, deterministic RNG from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            connection: None,
            conference: None,
            next_handle: 1,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Replace (or drop) the active connection.
    pub fn set_connection(&mut self, connection: Option<ConnectionId>) {
        self.connection = connection;
    }

    /// Replace (or drop) the active conference.
    pub fn set_conference(&mut self, conference: Option<ConferenceId>) {
        self.conference = conference;
    }

    /// Randomly reconnect and rejoin, as a flaky network would.
    ///
    /// Each resource is replaced by a never-before-seen handle with
    /// probability `probability`.
    pub fn churn(&mut self, probability: f64) {
        if self.rng.gen_bool(probability) {
            let connection = ConnectionId(self.fresh_handle());
            debug!(%connection, "connection replaced");
            self.connection = Some(connection);
        }
        if self.rng.gen_bool(probability) {
            let conference = ConferenceId(self.fresh_handle());
            debug!(%conference, "conference replaced");
            self.conference = Some(conference);
        }
    }

    fn fresh_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl ActiveResources for SimResources {
    fn current_connection(&self) -> Option<ConnectionId> {
        self.connection
    }

    fn current_conference(&self) -> Option<ConferenceId> {
        self.conference
    }
}

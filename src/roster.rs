//! The channel roster placeholder.
//!
//! A static set of nicknames believed present in the joined channel,
//! seeded from configuration. This is a known approximation, not a
//! reliable membership list: the bot does not track JOIN/PART traffic or
//! parse NAMES replies, so entries can be stale or plain wrong. Wiring it
//! to real membership tracking is an open gap, left open on purpose.

use rand::seq::SliceRandom;
use rand::Rng;

/// Nicknames believed present in the joined channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelRoster {
    users: Vec<String>,
}

impl ChannelRoster {
    /// Build a roster from the configured nicknames.
    pub fn new(users: Vec<String>) -> Self {
        Self { users }
    }

    /// Pick one member uniformly at random.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        self.users.choose(rng).map(String::as_str)
    }

    /// Pick one member uniformly at random from those not in `excluded`.
    pub fn choose_other<R: Rng>(&self, rng: &mut R, excluded: &[&str]) -> Option<&str> {
        let candidates: Vec<&str> = self
            .users
            .iter()
            .map(String::as_str)
            .filter(|user| !excluded.contains(user))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Number of known members.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

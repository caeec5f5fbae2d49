//! The catalog of canned replies.
//!
//! An immutable ordered set of strings the bot answers direct messages
//! with. Injected at construction so tests can substitute a fixed
//! single-element catalog.

use rand::seq::SliceRandom;
use rand::Rng;

/// Replies used when no catalog is configured.
const BUILTIN_RESPONSES: &[&str] = &[
    "I'm not sure what you mean by that...",
    "Did you know that elephants never forget?",
    "Let's not talk about that...",
    "Interesting fact: the human brain is only 2% of our body weight but consumes 20% of our energy!",
];

/// An ordered set of candidate reply strings selectable at random.
#[derive(Debug, Clone)]
pub struct ResponseCatalog {
    responses: Vec<String>,
}

impl ResponseCatalog {
    /// Build a catalog from the given replies.
    pub fn new(responses: Vec<String>) -> Self {
        Self { responses }
    }

    /// Pick one reply uniformly at random, or `None` if the catalog is empty.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        self.responses.choose(rng).map(String::as_str)
    }

    /// Number of replies in the catalog.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Whether the catalog has no replies.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        Self::new(BUILTIN_RESPONSES.iter().map(|s| s.to_string()).collect())
    }
}

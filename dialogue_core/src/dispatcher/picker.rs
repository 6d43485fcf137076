//! Injected randomness for greeting, farewell, and filler replies.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Uniform picker over reply sets.
///
/// Seed it in tests to make picks reproducible; callers should still assert
/// set membership rather than a specific reply.
#[derive(Debug, Clone)]
pub struct ResponsePicker {
    rng: StdRng,
}

impl ResponsePicker {
    /// A picker seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A deterministic picker.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick one option uniformly, `None` if there are none.
    pub fn pick<'a>(&mut self, options: &'a [String]) -> Option<&'a String> {
        options.choose(&mut self.rng)
    }
}

impl Default for ResponsePicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

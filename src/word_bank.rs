use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Pool of not-yet-drawn target words for the current session.
///
/// Words are drawn from the end of a shuffled copy of the dictionary, so a
/// word can only come up again after the next [`WordBank::reset`].
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Vec<String>,
    rng: StdRng,
}

impl WordBank {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic bank for reproducible draws
    pub fn seeded(seed: u64) -> Self {
        Self {
            words: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Refill from `dictionary` and reshuffle with a uniform Fisher-Yates pass.
    pub fn reset<S: AsRef<str>>(&mut self, dictionary: &[S]) {
        self.words = dictionary.iter().map(|w| w.as_ref().to_string()).collect();
        self.words.shuffle(&mut self.rng);
    }

    pub fn draw(&mut self) -> Option<String> {
        self.words.pop()
    }

    pub fn remaining(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::new()
    }
}

//! Best score across runs
//!
//! A single integer persisted under a fixed key. Read once at startup,
//! written whenever a run's score exceeds it.

use crate::persistence::{KeyValueStore, StoreError, load_json, save_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    best: u64,
}

impl HighScore {
    pub const STORAGE_KEY: &'static str = "nebula_strike_highscore";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Load from the store; missing or corrupt values read as 0
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<u64>(store, Self::STORAGE_KEY) {
            Ok(Some(best)) => {
                log::info!("Loaded high score {best}");
                Self { best }
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring stored high score: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_json(store, Self::STORAGE_KEY, &self.best)
    }

    /// Record a score. Returns true when it beat the previous best.
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }
}

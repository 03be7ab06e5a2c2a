//! Player settings and preferences
//!
//! Persisted separately from the high score, as JSON.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PARTICLES;
use crate::persistence::{KeyValueStore, StoreError, load_json, save_json};
pub use crate::sim::state::{Loadout, TrailStyle};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => MAX_PARTICLES / 6,
            QualityPreset::Medium => MAX_PARTICLES / 2,
            QualityPreset::High => MAX_PARTICLES,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ship cosmetics chosen in the hangar
    pub loadout: Loadout,
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on kills and impacts
    pub screen_shake: bool,
    /// Explosions, thrust, sparks
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            loadout: Loadout::default(),
            quality: QualityPreset::Medium,

            screen_shake: true,
            particles: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    pub const STORAGE_KEY: &'static str = "nebula_strike_settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective cue volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Load from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Settings>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_effective_values() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());

        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);

        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_preset_caps_ordered() {
        assert!(QualityPreset::Low.max_particles() < QualityPreset::Medium.max_particles());
        assert_eq!(QualityPreset::High.max_particles(), MAX_PARTICLES);
    }

    #[test]
    fn test_persist_roundtrip_with_loadout() {
        let mut store = MemoryStore::new();
        let mut settings = Settings {
            quality: QualityPreset::High,
            ..Settings::default()
        };
        settings.loadout = Loadout {
            color: 0xF43F5E,
            trail: TrailStyle::Turbo,
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"muted":true}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert!(settings.muted);
        assert_eq!(settings.quality, QualityPreset::Medium);
    }
}

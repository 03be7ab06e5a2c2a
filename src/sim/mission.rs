//! Per-wave mission objectives and the wave transition
//!
//! Each wave gets exactly one mission. A mission only ever moves forward:
//! Active -> Complete -> Transitioning -> (next wave) Active.

use serde::{Deserialize, Serialize};

use super::events::{EventSink, GameEvent};
use super::state::GameState;
use crate::audio::SoundEffect;
use crate::consts::*;

/// Mission objective kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissionType {
    /// Destroy a number of enemies
    #[default]
    Elimination,
    /// Stay alive for a number of seconds
    Survival,
    /// Destroy the wave boss
    Boss,
}

/// Where the current wave is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionPhase {
    Active,
    /// Objective met this frame, transition not started yet
    Complete,
    /// Counting down to the next wave
    Transitioning { frames_left: u32 },
}

/// The current wave's objective
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MissionState {
    pub kind: MissionType,
    pub description: String,
    pub target_value: u32,
    pub current_value: u32,
    /// Never goes back to false within a wave
    pub is_complete: bool,
    /// Elapsed frames (Survival only)
    pub timer: Option<u32>,
}

impl MissionState {
    /// Pick the mission for a wave. `roll` in [0, 1) chooses Survival over
    /// Elimination on eligible waves.
    pub fn for_wave(wave: u32, roll: f32) -> Self {
        if wave > 0 && wave.is_multiple_of(BOSS_WAVE_INTERVAL) {
            Self::boss()
        } else if wave > 2 && roll > 0.6 {
            Self::survival(wave)
        } else {
            Self::elimination(wave)
        }
    }

    pub fn elimination(wave: u32) -> Self {
        let target = 10 + wave * 2;
        Self {
            kind: MissionType::Elimination,
            description: format!("Destroy {target} hostiles"),
            target_value: target,
            ..Default::default()
        }
    }

    pub fn survival(wave: u32) -> Self {
        let target = 30 + wave.min(10) * 2;
        Self {
            kind: MissionType::Survival,
            description: format!("Survive for {target} seconds"),
            target_value: target,
            timer: Some(0),
            ..Default::default()
        }
    }

    pub fn boss() -> Self {
        Self {
            kind: MissionType::Boss,
            description: "Defeat the mothership".to_string(),
            target_value: 1,
            ..Default::default()
        }
    }

    /// Count an elimination kill. Returns true if this kill completed the mission.
    pub fn record_kill(&mut self) -> bool {
        if self.kind != MissionType::Elimination {
            return false;
        }
        self.current_value += 1;
        self.current_value >= self.target_value && self.mark_complete()
    }

    /// Advance the survival clock by one frame. Returns true on completion.
    pub fn tick_survival(&mut self) -> bool {
        if self.kind != MissionType::Survival || self.is_complete {
            return false;
        }
        let frames = self.timer.unwrap_or(0) + 1;
        self.timer = Some(frames);
        self.current_value = frames / FRAMES_PER_SECOND;
        frames >= self.target_value * FRAMES_PER_SECOND && self.mark_complete()
    }

    /// Boss destroyed. Returns true on completion.
    pub fn complete_boss(&mut self) -> bool {
        if self.kind != MissionType::Boss {
            return false;
        }
        self.current_value = self.target_value;
        self.mark_complete()
    }

    fn mark_complete(&mut self) -> bool {
        if self.is_complete {
            return false;
        }
        self.is_complete = true;
        log::info!("Mission complete: {}", self.description);
        true
    }

    /// Progress in [0, 1] for HUD bars
    pub fn progress(&self) -> f32 {
        if self.target_value == 0 {
            return 0.0;
        }
        (self.current_value as f32 / self.target_value as f32).min(1.0)
    }

    /// Frames between regular enemy spawns at the given score
    pub fn spawn_interval(&self, score: u64) -> u32 {
        let steps = (score / SCORE_PER_SPAWN_STEP).min(i64::MAX as u64) as i64;
        let base = BASE_SPAWN_INTERVAL - steps;
        let frames = match self.kind {
            MissionType::Survival => ((base as f64 * SURVIVAL_SPAWN_SCALE).floor() as i64)
                .max(MIN_SURVIVAL_SPAWN_INTERVAL),
            MissionType::Elimination | MissionType::Boss => base.max(MIN_SPAWN_INTERVAL),
        };
        frames as u32
    }
}

/// Current lifecycle phase given the transition counter
pub fn mission_phase(mission: &MissionState, transition_frames: u32) -> MissionPhase {
    if !mission.is_complete {
        MissionPhase::Active
    } else if transition_frames == 0 {
        MissionPhase::Complete
    } else {
        MissionPhase::Transitioning {
            frames_left: WAVE_TRANSITION_FRAMES.saturating_sub(transition_frames),
        }
    }
}

/// Assign the mission for `wave` and reset per-wave bookkeeping
pub fn start_wave(state: &mut GameState, wave: u32) {
    use rand::Rng;

    let roll: f32 = state.rng.random();
    state.stats.wave = wave;
    state.stats.mission = MissionState::for_wave(wave, roll);
    state.boss_spawned = false;
    state.timers.spawn = 0;
    state.timers.transition = 0;
    log::info!("Wave {}: {}", wave, state.stats.mission.description);
}

/// One frame of the between-wave delay. Gameplay is frozen meanwhile.
///
/// The transition cue fires on the first frame; on the last one the next
/// wave starts and live enemies and projectiles are cleared.
pub fn step_transition(state: &mut GameState, sink: &mut dyn EventSink) {
    state.timers.transition += 1;
    if state.timers.transition == 1 {
        sink.emit(GameEvent::Sound(SoundEffect::WaveTransition));
    }
    if state.timers.transition >= WAVE_TRANSITION_FRAMES {
        let next = state.stats.wave + 1;
        state.enemies.clear();
        state.projectiles.clear();
        start_wave(state, next);
    }
}

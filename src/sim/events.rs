//! Events emitted by the simulation for the HUD, audio and the host

use serde::{Deserialize, Serialize};

use super::state::GameStats;
use crate::audio::SoundEffect;

/// Something the outside world should react to, delivered the moment it happens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum GameEvent {
    /// New total score (never decreases within a run)
    ScoreChanged(u64),
    /// New combo count (0 when the streak breaks)
    ComboChanged(u32),
    /// Player health as a 0-100 percentage
    HealthChanged(u8),
    /// The run ended; fired once per run
    GameOver(GameStats),
    /// Fire-and-forget audio cue
    Sound(SoundEffect),
}

/// Receiver for simulation events
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}

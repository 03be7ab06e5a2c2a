//! Nebula Strike - A top-down arcade shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, missions, collisions)
//! - `game`: Frame driver that feeds input to the sim and routes its events
//! - `audio`: Sound cues and audio output sinks
//! - `persistence`: Key/value storage backends
//! - `highscore`: Persisted best score
//! - `settings`: Player preferences and ship loadout
//! - `debrief`: End-of-run summary text with a static fallback
//! - `web`: Browser bindings (wasm32 only)

pub mod audio;
pub mod debrief;
pub mod game;
pub mod highscore;
pub mod persistence;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::{Game, PointerCell, Snapshot};
pub use highscore::HighScore;
pub use settings::{Loadout, Settings, TrailStyle};

/// Game configuration constants
///
/// All timers are counted in frames; the host drives one step per display
/// refresh and the gameplay numbers assume 60 of them per second.
pub mod consts {
    /// Frames per second the tuning assumes
    pub const FRAMES_PER_SECOND: u32 = 60;

    /// Default playfield size (hosts pass their own on construction)
    pub const DEFAULT_SCREEN_WIDTH: f32 = 480.0;
    pub const DEFAULT_SCREEN_HEIGHT: f32 = 800.0;

    /// Player ship
    pub const PLAYER_SIZE: f32 = 40.0;
    pub const PLAYER_MAX_HP: i32 = 100;
    /// Distance of the player's spawn point from the bottom edge
    pub const PLAYER_SPAWN_OFFSET: f32 = 100.0;
    /// Fraction of the remaining distance covered per frame
    pub const PLAYER_LERP: f32 = 0.15;
    pub const PLAYER_MAX_BANK: f32 = 0.5;

    /// Auto-fire cooldowns
    pub const FIRE_COOLDOWN: u32 = 15;
    pub const RAPID_FIRE_COOLDOWN: u32 = 8;

    /// Damage the player takes
    pub const ENEMY_SHOT_DAMAGE: i32 = 15;
    pub const BODY_COLLISION_DAMAGE: i32 = 20;
    pub const HEALTH_PICKUP_AMOUNT: i32 = 20;

    /// Combo streak
    pub const COMBO_TIMEOUT_FRAMES: u32 = 120;
    pub const COMBO_STEP: f32 = 0.1;
    pub const COMBO_MAX_MULTIPLIER: f32 = 3.0;

    /// Screen shake contributions (visual only)
    pub const SHAKE_KILL: f32 = 5.0;
    pub const SHAKE_BOSS_KILL: f32 = 20.0;
    pub const SHAKE_SHOT_HIT: f32 = 10.0;
    pub const SHAKE_BODY_HIT: f32 = 15.0;
    pub const SHAKE_DECAY: f32 = 0.9;

    /// Mission flow
    pub const WAVE_TRANSITION_FRAMES: u32 = 120;
    pub const BOSS_WAVE_INTERVAL: u32 = 5;
    pub const BASE_SPAWN_INTERVAL: i64 = 60;
    pub const SCORE_PER_SPAWN_STEP: u64 = 500;
    pub const MIN_SPAWN_INTERVAL: i64 = 20;
    pub const MIN_SURVIVAL_SPAWN_INTERVAL: i64 = 15;
    pub const SURVIVAL_SPAWN_SCALE: f64 = 0.6;

    /// Enemy AI
    pub const KAMIKAZE_ACCEL: f32 = 0.1;
    pub const KAMIKAZE_MAX_SPEED: f32 = 5.0;
    pub const BOSS_HOVER_Y: f32 = 60.0;
    pub const BOSS_PHASE1_ATTACK_FRAMES: u32 = 80;
    pub const BOSS_PHASE2_ATTACK_FRAMES: u32 = 40;

    /// Drops
    pub const POWERUP_DROP_CHANCE: f32 = 0.15;
    pub const POWERUP_SIZE: f32 = 28.0;
    pub const POWERUP_FALL_SPEED: f32 = 2.0;

    /// Entities further than this outside the screen are culled
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Cosmetic lifetimes
    pub const PARTICLE_DECAY: f32 = 0.02;
    pub const TEXT_DECAY: f32 = 0.015;
    pub const HIT_FLASH_FRAMES: u32 = 5;
    pub const MAX_PARTICLES: usize = 600;
}

/// Axis-aligned overlap test between two rectangles given as top-left + size
#[inline]
pub fn rects_overlap(
    a_pos: glam::Vec2,
    a_size: glam::Vec2,
    b_pos: glam::Vec2,
    b_size: glam::Vec2,
) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

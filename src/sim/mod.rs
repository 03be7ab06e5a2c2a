//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, all timers counted in frames
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod events;
pub mod mission;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{cleanup, combo_points, resolve_collisions};
pub use events::{EventSink, GameEvent, NullSink};
pub use mission::{MissionPhase, MissionState, MissionType, mission_phase};
pub use spawn::{EnemyVariant, SpawnTable, enemy_table, powerup_table};
pub use state::{
    BossPhase, BossState, Enemy, EnemyKind, EntityType, FloatingText, GameMode, GameState,
    GameStats, Loadout, Owner, Particle, Player, PowerUp, PowerUpType, Projectile,
    ProjectileKind, Screen, Timers, TrailStyle, WeaponType,
};
pub use tick::{TickInput, tick};

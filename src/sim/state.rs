//! Game state and core simulation types
//!
//! Everything the step function mutates lives here. Hosts only ever read it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::mission::MissionState;
use crate::consts::*;

/// High-level mode the host is in; gates what the step simulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Title screen, nothing simulated
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Hangar preview: ship hovers, only cosmetics update
    Customize,
    /// Run ended
    GameOver,
}

/// Player weapon variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponType {
    #[default]
    Blaster,
    Spread,
    Rapid,
    Plasma,
}

impl WeaponType {
    /// Frames between auto-fire volleys
    pub fn cooldown(self) -> u32 {
        match self {
            WeaponType::Rapid => RAPID_FIRE_COOLDOWN,
            _ => FIRE_COOLDOWN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeaponType::Blaster => "BLASTER",
            WeaponType::Spread => "SPREAD",
            WeaponType::Rapid => "RAPID",
            WeaponType::Plasma => "PLASMA",
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpType {
    Health,
    WeaponSpread,
    WeaponRapid,
    WeaponPlasma,
}

impl PowerUpType {
    /// Weapon granted by this pickup, if any
    pub fn weapon(self) -> Option<WeaponType> {
        match self {
            PowerUpType::Health => None,
            PowerUpType::WeaponSpread => Some(WeaponType::Spread),
            PowerUpType::WeaponRapid => Some(WeaponType::Rapid),
            PowerUpType::WeaponPlasma => Some(WeaponType::Plasma),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpType::Health => "+HP",
            PowerUpType::WeaponSpread => "SPREAD SHOT",
            PowerUpType::WeaponRapid => "RAPID FIRE",
            PowerUpType::WeaponPlasma => "PLASMA CANNON",
        }
    }

    pub fn color(self) -> u32 {
        match self {
            PowerUpType::Health => 0x22C55E,
            PowerUpType::WeaponSpread => 0x3B82F6,
            PowerUpType::WeaponRapid => 0xEAB308,
            PowerUpType::WeaponPlasma => 0xA855F7,
        }
    }
}

/// Discriminant of every collidable entity, as reported to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Player,
    EnemyBasic,
    EnemyFast,
    EnemyKamikaze,
    Boss,
    PowerUp,
}

/// Cosmetic exhaust variant chosen in the hangar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrailStyle {
    #[default]
    Standard,
    Plasma,
    Turbo,
}

/// Ship cosmetics. Never feeds into gameplay numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    /// Hull color (0xRRGGBB)
    pub color: u32,
    pub trail: TrailStyle,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            color: 0x38BDF8,
            trail: TrailStyle::Standard,
        }
    }
}

impl Loadout {
    /// Color used for thrust particles
    pub fn thrust_color(&self) -> u32 {
        match self.trail {
            TrailStyle::Standard => self.color,
            TrailStyle::Plasma => 0xA855F7,
            TrailStyle::Turbo => 0xF97316,
        }
    }
}

/// Playfield bounds in screen coordinates (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub width: f32,
    pub height: f32,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            width: DEFAULT_SCREEN_WIDTH,
            height: DEFAULT_SCREEN_HEIGHT,
        }
    }
}

impl Screen {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Clamp a point into the screen. Returns None for non-finite input.
    pub fn clamp_point(&self, p: Vec2) -> Option<Vec2> {
        if !p.is_finite() {
            return None;
        }
        Some(p.clamp(Vec2::ZERO, Vec2::new(self.width, self.height)))
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub weapon: WeaponType,
    /// Visual roll while strafing (radians)
    pub bank_angle: f32,
    /// Hit flash countdown (frames)
    pub hit_timer: u32,
    pub color: u32,
}

impl Player {
    pub fn new(id: u32, pos: Vec2, color: u32) -> Self {
        Self {
            id,
            pos,
            size: Vec2::splat(PLAYER_SIZE),
            vel: Vec2::ZERO,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            weapon: WeaponType::Blaster,
            bank_angle: 0.0,
            hit_timer: 0,
            color,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Health as a 0-100 percentage
    pub fn health_percent(&self) -> u8 {
        if self.max_hp <= 0 {
            return 0;
        }
        ((self.hp.max(0) as f32 / self.max_hp as f32) * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

/// Boss attack phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossPhase {
    #[default]
    One,
    /// Entered once hp drops below half
    Two,
}

/// Boss-only AI state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BossState {
    pub phase: BossPhase,
    pub attack_timer: u32,
    pub move_timer: u32,
    /// Volleys fired so far; parity picks spread vs beam
    pub volleys: u32,
}

impl BossState {
    pub fn attack_interval(&self) -> u32 {
        match self.phase {
            BossPhase::One => BOSS_PHASE1_ATTACK_FRAMES,
            BossPhase::Two => BOSS_PHASE2_ATTACK_FRAMES,
        }
    }
}

/// Enemy variants with their variant-only payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Kamikaze,
    Boss(BossState),
}

/// A hostile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub score_value: u64,
    pub color: u32,
    pub hit_timer: u32,
    /// Visual heading (radians)
    pub rotation: f32,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn entity_type(&self) -> EntityType {
        match self.kind {
            EnemyKind::Basic => EntityType::EnemyBasic,
            EnemyKind::Fast => EntityType::EnemyFast,
            EnemyKind::Kamikaze => EntityType::EnemyKamikaze,
            EnemyKind::Boss(_) => EntityType::Boss,
        }
    }

    /// Apply damage; returns true when this hit is the killing blow
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        let was_alive = self.is_alive();
        self.hp -= damage;
        self.hit_timer = HIT_FLASH_FRAMES;
        was_alive && !self.is_alive()
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Projectile visual variant (render only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Blaster,
    Spread,
    Rapid,
    Plasma,
    BossSpread,
    BossBeam,
}

impl From<WeaponType> for ProjectileKind {
    fn from(weapon: WeaponType) -> Self {
        match weapon {
            WeaponType::Blaster => ProjectileKind::Blaster,
            WeaponType::Spread => ProjectileKind::Spread,
            WeaponType::Rapid => ProjectileKind::Rapid,
            WeaponType::Plasma => ProjectileKind::Plasma,
        }
    }
}

/// A single-use projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: Owner,
    /// Zero once the projectile has landed its hit
    pub damage: i32,
    /// Edge length of the square hitbox
    pub size: f32,
    pub kind: ProjectileKind,
}

impl Projectile {
    pub fn is_spent(&self) -> bool {
        self.damage <= 0
    }

    pub fn extent(&self) -> Vec2 {
        Vec2::splat(self.size)
    }
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpType,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub consumed: bool,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases every frame
    pub life: f32,
    pub max_life: f32,
    pub color: u32,
    pub size: f32,
}

/// Rising score/label text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub text: String,
    pub color: u32,
    pub size: f32,
}

/// Aggregate run statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u64,
    pub wave: u32,
    pub enemies_destroyed: u32,
    pub shots_fired: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub mission: MissionState,
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            score: 0,
            wave: 1,
            enemies_destroyed: 0,
            shots_fired: 0,
            combo: 0,
            max_combo: 0,
            mission: MissionState::default(),
        }
    }
}

/// Frame-count timers driving the step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timers {
    /// Steps since reset
    pub frame: u64,
    /// Screen shake magnitude (visual only)
    pub shake: f32,
    /// Frames left before the combo lapses
    pub combo: u32,
    /// Frames since the last spawn
    pub spawn: u32,
    pub fire_cooldown: u32,
    /// Frames spent in the wave transition
    pub transition: u32,
}

/// Complete simulation state (deterministic for a given seed and input)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay RNG (spawns, drops, mission rolls)
    pub rng: Pcg32,
    /// Cosmetic RNG so particle settings never shift gameplay rolls
    pub fx_rng: Pcg32,
    pub screen: Screen,
    pub loadout: Loadout,
    /// Particle budget (0 disables particles)
    pub particle_cap: usize,
    /// First-frame setup done
    pub initialized: bool,
    /// Game-over event already fired for this run
    pub game_over: bool,
    /// Boss of the current BOSS mission already spawned
    pub boss_spawned: bool,
    /// Last pointer position, already clamped
    pub pointer_target: Option<Vec2>,
    pub stats: GameStats,
    pub timers: Timers,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub powerups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64, screen: Screen, loadout: Loadout) -> Self {
        let player = Player::new(1, player_spawn_point(&screen), loadout.color);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15),
            screen,
            loadout,
            particle_cap: MAX_PARTICLES,
            initialized: false,
            game_over: false,
            boss_spawned: false,
            pointer_target: None,
            stats: GameStats::default(),
            timers: Timers::default(),
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            powerups: Vec::new(),
            particles: Vec::new(),
            texts: Vec::new(),
            next_id: 2,
        }
    }

    /// Return to the pre-run state in one assignment.
    ///
    /// RNG streams, screen and cosmetics carry over; everything else is rebuilt.
    pub fn reset(&mut self) {
        let fresh = Self::new(self.seed, self.screen, self.loadout);
        *self = Self {
            rng: self.rng.clone(),
            fx_rng: self.fx_rng.clone(),
            particle_cap: self.particle_cap,
            ..fresh
        };
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record a pointer position as the movement target.
    /// Out-of-range input is clamped; non-finite input keeps the old target.
    pub fn set_pointer_target(&mut self, p: Vec2) {
        if let Some(p) = self.screen.clamp_point(p) {
            self.pointer_target = Some(p);
        }
    }

    /// Change the playfield size, pulling the player back inside
    pub fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
        clamp_to_screen(&mut self.player.pos, self.player.size, &screen);
    }

    pub fn set_loadout(&mut self, loadout: Loadout) {
        self.loadout = loadout;
        self.player.color = loadout.color;
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }
}

/// Where the player appears at the start of a run
pub fn player_spawn_point(screen: &Screen) -> Vec2 {
    Vec2::new(
        (screen.width - PLAYER_SIZE) / 2.0,
        (screen.height - PLAYER_SPAWN_OFFSET).max(0.0),
    )
}

/// Keep a rectangle fully on screen
pub fn clamp_to_screen(pos: &mut Vec2, size: Vec2, screen: &Screen) {
    let max = (Vec2::new(screen.width, screen.height) - size).max(Vec2::ZERO);
    *pos = pos.clamp(Vec2::ZERO, max);
}

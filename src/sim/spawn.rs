//! Procedural creation of enemies, pickups, projectiles and effects
//!
//! Variant choice goes through `SpawnTable`, an ordered threshold list fed
//! with a roll in [0, 1), so each table can be tested without an RNG.

use glam::Vec2;
use rand::Rng;

use super::state::{
    BossState, Enemy, EnemyKind, FloatingText, GameState, Owner, Particle, PowerUp, PowerUpType,
    Projectile, ProjectileKind, WeaponType,
};
use crate::consts::*;

/// Ordered `(upper bound, variant)` rows: the first row whose bound exceeds
/// the roll wins, otherwise the fallback.
#[derive(Debug, Clone)]
pub struct SpawnTable<T: Copy> {
    rows: Vec<(f32, T)>,
    fallback: T,
}

impl<T: Copy> SpawnTable<T> {
    pub fn new(rows: Vec<(f32, T)>, fallback: T) -> Self {
        Self { rows, fallback }
    }

    pub fn pick(&self, roll: f32) -> T {
        self.rows
            .iter()
            .find(|(bound, _)| roll < *bound)
            .map(|&(_, variant)| variant)
            .unwrap_or(self.fallback)
    }

    /// Draw a roll from `rng` and pick
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.pick(rng.random())
    }
}

/// Regular enemy variants the spawner can roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyVariant {
    Basic,
    Fast,
    Kamikaze,
}

/// Fixed per-variant stats
struct EnemyTemplate {
    size: Vec2,
    hp: i32,
    score: u64,
    color: u32,
    base_speed: f32,
}

impl EnemyVariant {
    fn template(self) -> EnemyTemplate {
        match self {
            EnemyVariant::Basic => EnemyTemplate {
                size: Vec2::splat(40.0),
                hp: 3,
                score: 100,
                color: 0xEF4444,
                base_speed: 2.0,
            },
            EnemyVariant::Fast => EnemyTemplate {
                size: Vec2::splat(30.0),
                hp: 1,
                score: 150,
                color: 0xFACC15,
                base_speed: 4.0,
            },
            EnemyVariant::Kamikaze => EnemyTemplate {
                size: Vec2::splat(34.0),
                hp: 2,
                score: 200,
                color: 0xF97316,
                base_speed: 3.0,
            },
        }
    }

    fn kind(self) -> EnemyKind {
        match self {
            EnemyVariant::Basic => EnemyKind::Basic,
            EnemyVariant::Fast => EnemyKind::Fast,
            EnemyVariant::Kamikaze => EnemyKind::Kamikaze,
        }
    }
}

/// Enemy roll: fast above 0.85, kamikaze in the 0.70-0.85 band after wave 2
pub fn enemy_table(wave: u32) -> SpawnTable<EnemyVariant> {
    let mid = if wave > 2 {
        EnemyVariant::Kamikaze
    } else {
        EnemyVariant::Basic
    };
    SpawnTable::new(
        vec![(0.70, EnemyVariant::Basic), (0.85, mid)],
        EnemyVariant::Fast,
    )
}

pub fn powerup_table() -> SpawnTable<PowerUpType> {
    SpawnTable::new(
        vec![
            (0.4, PowerUpType::Health),
            (0.6, PowerUpType::WeaponSpread),
            (0.8, PowerUpType::WeaponRapid),
        ],
        PowerUpType::WeaponPlasma,
    )
}

/// Vertical speed of a regular enemy on `wave`
pub fn enemy_speed(variant: EnemyVariant, wave: u32) -> f32 {
    variant.template().base_speed + wave as f32 * 0.1
}

/// Build a regular enemy with its top-left corner at `pos`
pub fn make_enemy(id: u32, variant: EnemyVariant, wave: u32, pos: Vec2) -> Enemy {
    let t = variant.template();
    Enemy {
        id,
        kind: variant.kind(),
        pos,
        size: t.size,
        vel: Vec2::new(0.0, enemy_speed(variant, wave)),
        hp: t.hp,
        max_hp: t.hp,
        score_value: t.score,
        color: t.color,
        hit_timer: 0,
        rotation: 0.0,
    }
}

/// Roll and append a regular enemy just above the top edge
pub fn spawn_enemy(state: &mut GameState) {
    let wave = state.stats.wave;
    let variant = enemy_table(wave).sample(&mut state.rng);
    let size = variant.template().size;
    let max_x = (state.screen.width - size.x).max(0.0);
    let x = state.rng.random::<f32>() * max_x;
    let id = state.next_entity_id();
    state
        .enemies
        .push(make_enemy(id, variant, wave, Vec2::new(x, -size.y)));
    log::debug!("Spawned {:?} #{} at x={:.0}", variant, id, x);
}

/// Boss hp for a wave
pub fn boss_hp(wave: u32) -> i32 {
    500 + wave as i32 * 150
}

/// Boss kill reward for a wave
pub fn boss_score(wave: u32) -> u64 {
    5000 * wave.div_ceil(BOSS_WAVE_INTERVAL) as u64
}

pub fn make_boss(id: u32, wave: u32, screen_width: f32) -> Enemy {
    let size = Vec2::new(160.0, 96.0);
    let hp = boss_hp(wave);
    Enemy {
        id,
        kind: EnemyKind::Boss(BossState::default()),
        pos: Vec2::new((screen_width - size.x) / 2.0, -size.y),
        size,
        vel: Vec2::new(0.0, 1.5),
        hp,
        max_hp: hp,
        score_value: boss_score(wave),
        color: 0xDC2626,
        hit_timer: 0,
        rotation: 0.0,
    }
}

/// Bring in the wave boss (once per BOSS mission)
pub fn spawn_boss(state: &mut GameState) {
    if state.boss_spawned {
        return;
    }
    let id = state.next_entity_id();
    let boss = make_boss(id, state.stats.wave, state.screen.width);
    log::info!("Boss #{} incoming with {} hp", id, boss.hp);
    state.enemies.push(boss);
    state.boss_spawned = true;
}

/// Roll a pickup and drop it centred on `center`
pub fn spawn_powerup(state: &mut GameState, center: Vec2) {
    let kind = powerup_table().sample(&mut state.rng);
    let id = state.next_entity_id();
    let size = Vec2::splat(POWERUP_SIZE);
    state.powerups.push(PowerUp {
        id,
        kind,
        pos: center - size / 2.0,
        size,
        vel: Vec2::new(0.0, POWERUP_FALL_SPEED),
        consumed: false,
    });
    log::debug!("Dropped {:?}", kind);
}

/// Radial particle burst around `center`
pub fn spawn_burst(state: &mut GameState, center: Vec2, color: u32, count: usize, speed: f32) {
    let room = state.particle_cap.saturating_sub(state.particles.len());
    for _ in 0..count.min(room) {
        let angle = state.fx_rng.random::<f32>() * std::f32::consts::TAU;
        let mag = speed * (0.3 + state.fx_rng.random::<f32>() * 0.7);
        let life = 0.6 + state.fx_rng.random::<f32>() * 0.4;
        let size = 2.0 + state.fx_rng.random::<f32>() * 3.0;
        state.particles.push(Particle {
            pos: center,
            vel: Vec2::new(angle.cos(), angle.sin()) * mag,
            life,
            max_life: life,
            color,
            size,
        });
    }
}

/// Exhaust puff under the player ship, colored by the loadout trail
pub fn spawn_thrust(state: &mut GameState) {
    if state.particles.len() >= state.particle_cap {
        return;
    }
    let p = &state.player;
    let origin = Vec2::new(p.pos.x + p.size.x / 2.0, p.pos.y + p.size.y);
    let jitter = state.fx_rng.random::<f32>() - 0.5;
    let speed = 2.0 + state.fx_rng.random::<f32>() * 2.0;
    let life = 0.5;
    state.particles.push(Particle {
        pos: origin + Vec2::new(jitter * 6.0, 0.0),
        vel: Vec2::new(jitter, speed),
        life,
        max_life: life,
        color: state.loadout.thrust_color(),
        size: 3.0,
    });
}

pub fn spawn_text(state: &mut GameState, center: Vec2, text: impl Into<String>, color: u32) {
    state.texts.push(FloatingText {
        pos: center,
        vel: Vec2::new(0.0, -1.0),
        life: 1.0,
        max_life: 1.0,
        text: text.into(),
        color,
        size: 16.0,
    });
}

/// Fire the player's current weapon from the ship's nose
pub fn fire_player_weapon(state: &mut GameState) {
    let weapon = state.player.weapon;
    let nose = Vec2::new(state.player.center().x, state.player.pos.y);
    let kind = ProjectileKind::from(weapon);

    let shot = |angle: f32, speed: f32, size: f32, damage: i32| Projectile {
        pos: nose - Vec2::new(size / 2.0, size),
        vel: Vec2::new(angle.sin(), -angle.cos()) * speed,
        owner: Owner::Player,
        damage,
        size,
        kind,
    };

    match weapon {
        WeaponType::Blaster => state.projectiles.push(shot(0.0, 10.0, 6.0, 1)),
        WeaponType::Spread => {
            for angle in [-0.2, 0.0, 0.2] {
                state.projectiles.push(shot(angle, 10.0, 6.0, 1));
            }
        }
        WeaponType::Rapid => state.projectiles.push(shot(0.0, 14.0, 5.0, 1)),
        WeaponType::Plasma => state.projectiles.push(shot(0.0, 8.0, 14.0, 3)),
    }
    state.stats.shots_fired += 1;
}

/// Boss attack: even volleys fan out, odd volleys aim at the player
pub fn fire_boss_volley(state: &mut GameState, boss_index: usize) {
    let Some(boss) = state.enemies.get(boss_index) else {
        return;
    };
    let EnemyKind::Boss(ai) = &boss.kind else {
        return;
    };
    let enraged = ai.phase == super::state::BossPhase::Two;
    let spread_volley = ai.volleys % 2 == 0;
    let muzzle = Vec2::new(boss.center().x, boss.pos.y + boss.size.y);
    let target = state.player.center();

    let enemy_shot = |pos: Vec2, vel: Vec2, size: f32, kind: ProjectileKind| Projectile {
        pos: pos - Vec2::splat(size / 2.0),
        vel,
        owner: Owner::Enemy,
        damage: ENEMY_SHOT_DAMAGE,
        size,
        kind,
    };

    if spread_volley {
        let (count, speed) = if enraged { (7, 5.0) } else { (5, 4.0) };
        let arc = 1.2_f32;
        for i in 0..count {
            let t = i as f32 / (count - 1) as f32;
            let angle = -arc / 2.0 + arc * t;
            let vel = Vec2::new(angle.sin(), angle.cos()) * speed;
            state
                .projectiles
                .push(enemy_shot(muzzle, vel, 10.0, ProjectileKind::BossSpread));
        }
    } else {
        let count = if enraged { 5 } else { 3 };
        let dir = (target - muzzle).normalize_or(Vec2::Y);
        for i in 0..count {
            let pos = muzzle - dir * (i as f32 * 14.0);
            state
                .projectiles
                .push(enemy_shot(pos, dir * 7.0, 8.0, ProjectileKind::BossBeam));
        }
    }

    if let Some(EnemyKind::Boss(ai)) = state.enemies.get_mut(boss_index).map(|b| &mut b.kind) {
        ai.volleys += 1;
    }
}

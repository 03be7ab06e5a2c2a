//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation by one display frame.

use glam::Vec2;

use super::collision;
use super::events::{EventSink, GameEvent};
use super::mission::{self, MissionType};
use super::spawn;
use super::state::{
    BossPhase, EnemyKind, GameMode, GameState, clamp_to_screen, player_spawn_point,
};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Mode the host is currently showing
    pub mode: GameMode,
    /// Latest pointer/touch position, if one arrived since the last frame
    pub pointer: Option<Vec2>,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, sink: &mut dyn EventSink) {
    decay_timers(state, sink);

    if !state.initialized {
        initialize(state);
    }

    if let Some(p) = input.pointer {
        state.set_pointer_target(p);
    }

    match input.mode {
        GameMode::Menu => {}
        GameMode::Customize => {
            hover_player(state);
            if state.timers.frame.is_multiple_of(2) {
                spawn::spawn_thrust(state);
            }
            update_cosmetics(state);
        }
        GameMode::GameOver => update_cosmetics(state),
        GameMode::Playing => {
            if state.game_over {
                update_cosmetics(state);
                return;
            }
            if state.stats.mission.is_complete {
                mission::step_transition(state, sink);
                update_cosmetics(state);
                return;
            }

            move_player(state);
            auto_fire(state, sink);
            state.stats.mission.tick_survival();
            run_spawn_policy(state);
            update_enemies(state);
            integrate(state);
            collision::resolve_collisions(state, sink);
            collision::cleanup(state);
            update_cosmetics(state);
        }
    }
}

/// Frame counter, screen shake and combo timeout
fn decay_timers(state: &mut GameState, sink: &mut dyn EventSink) {
    state.timers.frame += 1;

    state.timers.shake *= SHAKE_DECAY;
    if state.timers.shake < 0.01 {
        state.timers.shake = 0.0;
    }

    if state.timers.combo > 0 {
        state.timers.combo -= 1;
        if state.timers.combo == 0 && state.stats.combo > 0 {
            state.stats.combo = 0;
            sink.emit(GameEvent::ComboChanged(0));
        }
    }
}

/// First-frame setup: place the ship and start wave 1
fn initialize(state: &mut GameState) {
    state.player.pos = player_spawn_point(&state.screen);
    state.player.vel = Vec2::ZERO;
    mission::start_wave(state, 1);
    state.initialized = true;
}

/// Hangar preview: slow figure-eight around the lower middle of the screen
fn hover_player(state: &mut GameState) {
    let t = state.timers.frame as f32;
    let anchor = Vec2::new(state.screen.width / 2.0, state.screen.height * 0.6);
    let center = anchor + Vec2::new((t * 0.03).sin() * 40.0, (t * 0.06).sin() * 10.0);
    let player = &mut state.player;
    let new_pos = center - player.size / 2.0;
    player.vel = new_pos - player.pos;
    player.pos = new_pos;
    player.bank_angle = (player.vel.x * 0.1).clamp(-PLAYER_MAX_BANK, PLAYER_MAX_BANK);
}

/// Ease the ship toward the pointer and keep it on screen
fn move_player(state: &mut GameState) {
    let screen = state.screen;
    let player = &mut state.player;
    player.hit_timer = player.hit_timer.saturating_sub(1);

    let Some(target) = state.pointer_target else {
        player.vel = Vec2::ZERO;
        return;
    };
    let desired = target - player.size / 2.0;
    let step = (desired - player.pos) * PLAYER_LERP;
    let before = player.pos;
    player.pos += step;
    clamp_to_screen(&mut player.pos, player.size, &screen);
    player.vel = player.pos - before;
    player.bank_angle = (player.vel.x * 0.05).clamp(-PLAYER_MAX_BANK, PLAYER_MAX_BANK);

    if state.timers.frame.is_multiple_of(2) {
        spawn::spawn_thrust(state);
    }
}

fn auto_fire(state: &mut GameState, sink: &mut dyn EventSink) {
    state.timers.fire_cooldown = state.timers.fire_cooldown.saturating_sub(1);
    if state.timers.fire_cooldown > 0 {
        return;
    }
    let weapon = state.player.weapon;
    spawn::fire_player_weapon(state);
    state.timers.fire_cooldown = weapon.cooldown();
    sink.emit(GameEvent::Sound(SoundEffect::Shoot(weapon)));
}

/// Regular spawns on an interval; a BOSS mission brings in its boss instead
fn run_spawn_policy(state: &mut GameState) {
    state.timers.spawn += 1;
    let interval = state.stats.mission.spawn_interval(state.stats.score);
    if state.timers.spawn < interval {
        return;
    }
    state.timers.spawn = 0;

    if state.stats.mission.kind == MissionType::Boss {
        if !state.boss_spawned {
            spawn::spawn_boss(state);
        }
        if state.boss().is_some() {
            return;
        }
    }
    spawn::spawn_enemy(state);
}

/// Enemy motion and AI
fn update_enemies(state: &mut GameState) {
    let target = state.player.center();
    let screen = state.screen;
    let mut volleys = Vec::new();

    for (i, enemy) in state.enemies.iter_mut().enumerate() {
        enemy.hit_timer = enemy.hit_timer.saturating_sub(1);
        if !enemy.is_alive() {
            continue;
        }
        let center = enemy.center();
        let (hp, max_hp) = (enemy.hp, enemy.max_hp);

        match &mut enemy.kind {
            EnemyKind::Basic | EnemyKind::Fast => {}
            EnemyKind::Kamikaze => {
                let dir = (target - center).normalize_or_zero();
                enemy.vel += dir * KAMIKAZE_ACCEL;
                if enemy.vel.length() > KAMIKAZE_MAX_SPEED {
                    enemy.vel = enemy.vel.normalize() * KAMIKAZE_MAX_SPEED;
                }
                enemy.rotation = enemy.vel.x.atan2(enemy.vel.y);
            }
            EnemyKind::Boss(ai) => {
                if ai.phase == BossPhase::One && hp * 2 < max_hp {
                    ai.phase = BossPhase::Two;
                    log::info!("Boss enraged at {}/{} hp", hp, max_hp);
                }
                let entered = enemy.pos.y >= BOSS_HOVER_Y;
                if entered {
                    ai.move_timer += 1;
                    let sway = if ai.phase == BossPhase::Two { 3.0 } else { 2.0 };
                    enemy.vel = Vec2::new((ai.move_timer as f32 * 0.02).sin() * sway, 0.0);

                    ai.attack_timer += 1;
                    if ai.attack_timer >= ai.attack_interval() {
                        ai.attack_timer = 0;
                        volleys.push(i);
                    }
                } else {
                    enemy.vel = Vec2::new(0.0, 1.5);
                }
            }
        }

        enemy.pos += enemy.vel;
        if enemy.is_boss() {
            let max_x = (screen.width - enemy.size.x).max(0.0);
            enemy.pos.x = enemy.pos.x.clamp(0.0, max_x);
        }
    }

    for i in volleys {
        spawn::fire_boss_volley(state, i);
    }
}

/// Euler step for projectiles and pickups
fn integrate(state: &mut GameState) {
    for p in &mut state.projectiles {
        p.pos += p.vel;
    }
    for p in &mut state.powerups {
        p.pos += p.vel;
    }
}

/// Particles and floating text: move, fade, drop the dead ones
pub fn update_cosmetics(state: &mut GameState) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.vel *= 0.96;
        particle.life -= PARTICLE_DECAY;
    }
    state.particles.retain(|p| p.life > 0.0);

    for text in state.texts.iter_mut() {
        text.pos += text.vel;
        text.life -= TEXT_DECAY;
    }
    state.texts.retain(|t| t.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::NullSink;
    use crate::sim::mission::MissionState;
    use crate::sim::spawn::{EnemyVariant, make_enemy};
    use crate::sim::state::{
        GameStats, Loadout, Owner, Particle, PowerUp, PowerUpType, Screen, WeaponType,
    };

    fn playing() -> TickInput {
        TickInput {
            mode: GameMode::Playing,
            pointer: None,
        }
    }

    fn started_state() -> GameState {
        let mut state = GameState::new(12345, Screen::default(), Loadout::default());
        tick(&mut state, &playing(), &mut NullSink);
        state
    }

    #[test]
    fn test_first_frame_initializes_wave_one() {
        let state = started_state();
        assert!(state.initialized);
        assert_eq!(state.stats.wave, 1);
        assert_eq!(state.stats.mission.kind, MissionType::Elimination);
        assert_eq!(state.stats.mission.target_value, 12);
    }

    #[test]
    fn test_player_lerps_toward_pointer() {
        let mut state = started_state();
        state.player.pos = Vec2::new(100.0, 500.0);
        let target = Vec2::new(300.0, 500.0) + state.player.size / 2.0;
        let input = TickInput {
            mode: GameMode::Playing,
            pointer: Some(target),
        };
        tick(&mut state, &input, &mut NullSink);
        // 15% of the 200px gap
        assert!((state.player.pos.x - 130.0).abs() < 1e-3);
        assert!((state.player.pos.y - 500.0).abs() < 1e-3);

        for _ in 0..200 {
            tick(&mut state, &playing(), &mut NullSink);
        }
        assert!((state.player.pos.x - 300.0).abs() < 0.5);
    }

    #[test]
    fn test_pointer_is_clamped() {
        let mut state = started_state();
        let input = TickInput {
            mode: GameMode::Playing,
            pointer: Some(Vec2::new(-5000.0, 99999.0)),
        };
        for _ in 0..300 {
            tick(&mut state, &input, &mut NullSink);
        }
        assert_eq!(state.pointer_target, Some(Vec2::new(0.0, state.screen.height)));
        assert!(state.player.pos.x >= 0.0);
        assert!(state.player.pos.y + state.player.size.y <= state.screen.height + 1e-3);

        // Non-finite input keeps the previous target
        let bad = TickInput {
            mode: GameMode::Playing,
            pointer: Some(Vec2::new(f32::NAN, 10.0)),
        };
        tick(&mut state, &bad, &mut NullSink);
        assert_eq!(state.pointer_target, Some(Vec2::new(0.0, state.screen.height)));
    }

    #[test]
    fn test_auto_fire_cadence() {
        let mut state = started_state();
        let mut events: Vec<GameEvent> = Vec::new();
        // Frame 1 already fired once
        assert_eq!(state.stats.shots_fired, 1);
        for _ in 0..15 {
            tick(&mut state, &playing(), &mut events);
        }
        assert_eq!(state.stats.shots_fired, 2);
        assert!(events.contains(&GameEvent::Sound(SoundEffect::Shoot(WeaponType::Blaster))));

        state.player.weapon = WeaponType::Rapid;
        let before = state.stats.shots_fired;
        for _ in 0..(15 + 8 * 4) {
            tick(&mut state, &playing(), &mut NullSink);
        }
        assert!(state.stats.shots_fired >= before + 4);
    }

    #[test]
    fn test_kamikaze_homes_with_speed_cap() {
        let mut state = started_state();
        state.projectiles.clear();
        state.timers.fire_cooldown = 1000;
        state.player.pos = Vec2::new(400.0, 700.0);
        let id = state.next_entity_id();
        let mut kamikaze = make_enemy(id, EnemyVariant::Kamikaze, 3, Vec2::new(0.0, 0.0));
        kamikaze.vel = Vec2::ZERO;
        state.enemies.push(kamikaze);

        tick(&mut state, &playing(), &mut NullSink);
        let vel = state.enemies[0].vel;
        assert!((vel.length() - KAMIKAZE_ACCEL).abs() < 1e-4);
        assert!(vel.x > 0.0 && vel.y > 0.0);

        for _ in 0..100 {
            tick(&mut state, &playing(), &mut NullSink);
            if let Some(e) = state.enemies.iter().find(|e| e.id == id) {
                assert!(e.vel.length() <= KAMIKAZE_MAX_SPEED + 1e-4);
            }
        }
    }

    #[test]
    fn test_basic_enemy_moves_straight() {
        let mut state = started_state();
        let id = state.next_entity_id();
        state
            .enemies
            .push(make_enemy(id, EnemyVariant::Basic, 1, Vec2::new(10.0, 10.0)));
        tick(&mut state, &playing(), &mut NullSink);
        let e = state.enemies.iter().find(|e| e.id == id).expect("enemy kept");
        assert_eq!(e.pos.x, 10.0);
        assert!((e.pos.y - 12.1).abs() < 1e-4);
    }

    #[test]
    fn test_boss_phase_two_and_attack_timer() {
        let mut state = started_state();
        state.stats.mission = MissionState::boss();
        spawn::spawn_boss(&mut state);
        state.enemies[0].pos.y = BOSS_HOVER_Y;
        state.player.pos = Vec2::new(0.0, 700.0);

        let enemy_shots = |s: &GameState| {
            s.projectiles
                .iter()
                .filter(|p| p.owner == Owner::Enemy)
                .count()
        };

        for _ in 0..BOSS_PHASE1_ATTACK_FRAMES - 1 {
            tick(&mut state, &playing(), &mut NullSink);
        }
        assert_eq!(enemy_shots(&state), 0);
        tick(&mut state, &playing(), &mut NullSink);
        assert_eq!(enemy_shots(&state), 5, "first volley is the spread");

        let boss = &mut state.enemies[0];
        boss.hp = boss.max_hp / 2 - 1;
        tick(&mut state, &playing(), &mut NullSink);
        match &state.enemies[0].kind {
            EnemyKind::Boss(ai) => {
                assert_eq!(ai.phase, BossPhase::Two);
                assert_eq!(ai.attack_interval(), BOSS_PHASE2_ATTACK_FRAMES);
            }
            other => panic!("expected boss, got {other:?}"),
        }
    }

    #[test]
    fn test_boss_mission_spawns_single_boss() {
        let mut state = started_state();
        state.stats.mission = MissionState::boss();
        state.timers.fire_cooldown = u32::MAX;
        for _ in 0..600 {
            tick(&mut state, &playing(), &mut NullSink);
        }
        assert_eq!(state.enemies.iter().filter(|e| e.is_boss()).count(), 1);
        assert_eq!(state.enemies.len(), 1, "no regular spawns while boss is alive");
    }

    #[test]
    fn test_wave_advances_exactly_120_frames_after_completion() {
        let mut state = started_state();
        state.powerups.push(PowerUp {
            id: 999,
            kind: PowerUpType::Health,
            pos: Vec2::new(0.0, 0.0),
            size: Vec2::splat(POWERUP_SIZE),
            vel: Vec2::ZERO,
            consumed: false,
        });
        state.stats.mission.current_value = 11;
        assert!(state.stats.mission.record_kill());
        let id = state.next_entity_id();
        state
            .enemies
            .push(make_enemy(id, EnemyVariant::Basic, 1, Vec2::new(10.0, 10.0)));
        let frozen_pos = state.enemies[0].pos;

        let mut events: Vec<GameEvent> = Vec::new();
        for _ in 0..WAVE_TRANSITION_FRAMES - 1 {
            tick(&mut state, &playing(), &mut events);
            assert_eq!(state.stats.wave, 1);
            assert_eq!(state.enemies[0].pos, frozen_pos, "gameplay frozen");
        }
        let cues = events
            .iter()
            .filter(|e| **e == GameEvent::Sound(SoundEffect::WaveTransition))
            .count();
        assert_eq!(cues, 1);

        tick(&mut state, &playing(), &mut events);
        assert_eq!(state.stats.wave, 2);
        assert!(!state.stats.mission.is_complete);
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.powerups.len(), 1, "powerups persist across waves");
    }

    #[test]
    fn test_combo_times_out() {
        let mut state = started_state();
        state.stats.combo = 4;
        state.timers.combo = 3;
        let mut events: Vec<GameEvent> = Vec::new();
        tick(&mut state, &playing(), &mut events);
        tick(&mut state, &playing(), &mut events);
        assert_eq!(state.stats.combo, 4);
        tick(&mut state, &playing(), &mut events);
        assert_eq!(state.stats.combo, 0);
        assert!(events.contains(&GameEvent::ComboChanged(0)));
    }

    #[test]
    fn test_customize_mode_skips_gameplay() {
        let mut state = GameState::new(7, Screen::default(), Loadout::default());
        let input = TickInput {
            mode: GameMode::Customize,
            pointer: None,
        };
        for _ in 0..300 {
            tick(&mut state, &input, &mut NullSink);
        }
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.stats.shots_fired, 0);
        assert!(!state.particles.is_empty(), "thrust trail still animates");
    }

    #[test]
    fn test_particles_keep_fading_during_transition() {
        let mut state = started_state();
        state.stats.mission.current_value = 11;
        assert!(state.stats.mission.record_kill());
        state.particles.clear();
        state.particles.push(Particle {
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::new(1.0, 0.0),
            life: 1.0,
            max_life: 1.0,
            color: 0xFFFFFF,
            size: 3.0,
        });

        for _ in 0..10 {
            tick(&mut state, &playing(), &mut NullSink);
        }
        assert_eq!(state.stats.wave, 1, "still transitioning");
        assert_eq!(state.particles.len(), 1);
        let particle = &state.particles[0];
        assert!((particle.life - (1.0 - 10.0 * PARTICLE_DECAY)).abs() < 1e-4);
        assert!(particle.pos.x > 100.0);

        for _ in 0..60 {
            tick(&mut state, &playing(), &mut NullSink);
        }
        assert!(state.particles.is_empty(), "faded out before the next wave");
    }

    #[test]
    fn test_survival_mission_completes_on_frames() {
        let mut state = started_state();
        state.stats.mission = MissionState::survival(3);
        state.player.hp = 1_000_000;
        state.player.max_hp = 1_000_000;
        let frames = 36 * FRAMES_PER_SECOND;
        for _ in 0..frames - 1 {
            tick(&mut state, &playing(), &mut NullSink);
        }
        assert!(!state.stats.mission.is_complete);
        tick(&mut state, &playing(), &mut NullSink);
        assert!(state.stats.mission.is_complete);
    }

    #[test]
    fn test_determinism() {
        let inputs = [
            TickInput {
                mode: GameMode::Playing,
                pointer: Some(Vec2::new(100.0, 600.0)),
            },
            playing(),
            TickInput {
                mode: GameMode::Playing,
                pointer: Some(Vec2::new(400.0, 650.0)),
            },
        ];
        let mut a = GameState::new(99999, Screen::default(), Loadout::default());
        let mut b = GameState::new(99999, Screen::default(), Loadout::default());
        for i in 0..900 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, &mut NullSink);
            tick(&mut b, input, &mut NullSink);
        }
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.player.pos, b.player.pos);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;
        use crate::sim::events::GameEvent;

        fn pointer() -> impl Strategy<Value = Option<Vec2>> {
            prop_oneof![
                3 => (-500.0f32..1500.0, -500.0f32..1500.0)
                    .prop_map(|(x, y)| Some(Vec2::new(x, y))),
                1 => Just(None),
                1 => Just(Some(Vec2::new(f32::NAN, f32::INFINITY))),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn player_stays_bounded(
                seed in any::<u64>(),
                pointers in prop::collection::vec(pointer(), 1..400),
            ) {
                let mut state = GameState::new(seed, Screen::default(), Loadout::default());
                let mut last_score = 0;
                for p in pointers {
                    let mut events: Vec<GameEvent> = Vec::new();
                    let input = TickInput { mode: GameMode::Playing, pointer: p };
                    tick(&mut state, &input, &mut events);

                    let (player, screen) = (&state.player, state.screen);
                    prop_assert!(player.hp >= 0 && player.hp <= player.max_hp);
                    prop_assert!(player.pos.is_finite());
                    prop_assert!(player.pos.x >= 0.0 && player.pos.x + player.size.x <= screen.width);
                    prop_assert!(player.pos.y >= 0.0 && player.pos.y + player.size.y <= screen.height);
                    prop_assert!(state.stats.score >= last_score);
                    prop_assert!(state.particles.len() <= state.particle_cap);
                    prop_assert!(state.enemies.iter().all(|e| e.pos.is_finite()));
                    for event in &events {
                        if let GameEvent::HealthChanged(pct) = event {
                            prop_assert!(*pct <= 100);
                        }
                    }
                    last_score = state.stats.score;
                }
            }

            #[test]
            fn reset_is_idempotent(seed in any::<u64>(), frames in 0usize..300) {
                let mut state = GameState::new(seed, Screen::default(), Loadout::default());
                for _ in 0..frames {
                    tick(&mut state, &playing(), &mut NullSink);
                }
                state.reset();
                let once = serde_json::to_value(&state).unwrap();
                state.reset();
                let twice = serde_json::to_value(&state).unwrap();
                prop_assert_eq!(once, twice);
                prop_assert_eq!(&state.stats, &GameStats::default());
                prop_assert!(!state.initialized);
            }
        }
    }
}

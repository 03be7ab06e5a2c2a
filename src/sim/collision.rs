//! Collision detection and resolution
//!
//! Every check is an AABB overlap run once per frame after motion. The four
//! passes always run in the same order so combo and score are reproducible:
//! player shots vs enemies, enemy shots vs player, bodies vs player, pickups
//! vs player. Removal is deferred to `cleanup` at the end of the frame.

use glam::Vec2;
use rand::Rng;

use super::events::{EventSink, GameEvent};
use super::mission::MissionType;
use super::spawn;
use super::state::{GameState, Owner, WeaponType};
use crate::audio::{ExplosionSize, SoundEffect};
use crate::consts::*;
use crate::rects_overlap;

/// Run all collision passes for this frame. Nothing touches the player
/// after the pass that killed it.
pub fn resolve_collisions(state: &mut GameState, sink: &mut dyn EventSink) {
    player_shots_vs_enemies(state, sink);
    enemy_shots_vs_player(state, sink);
    if state.game_over {
        return;
    }
    bodies_vs_player(state, sink);
    if state.game_over {
        return;
    }
    powerups_vs_player(state, sink);
}

/// Each live player shot hits at most one enemy: the first it overlaps
fn player_shots_vs_enemies(state: &mut GameState, sink: &mut dyn EventSink) {
    let mut kills = Vec::new();

    for shot in state
        .projectiles
        .iter_mut()
        .filter(|p| p.owner == Owner::Player && !p.is_spent())
    {
        let Some(index) = state.enemies.iter().position(|e| {
            e.is_alive() && rects_overlap(shot.pos, shot.extent(), e.pos, e.size)
        }) else {
            continue;
        };
        let damage = shot.damage;
        shot.damage = 0;
        if state.enemies[index].apply_damage(damage) {
            kills.push(index);
        }
    }

    for index in kills {
        enemy_destroyed(state, index, sink);
    }
}

/// Scoring, combo, effects, drops and mission progress for a shot-down enemy
fn enemy_destroyed(state: &mut GameState, index: usize, sink: &mut dyn EventSink) {
    let enemy = &state.enemies[index];
    let (center, color, is_boss, score_value) =
        (enemy.center(), enemy.color, enemy.is_boss(), enemy.score_value);

    state.stats.enemies_destroyed += 1;
    sink.emit(GameEvent::Sound(SoundEffect::Explosion(if is_boss {
        ExplosionSize::Large
    } else {
        ExplosionSize::Small
    })));
    state.timers.shake += if is_boss { SHAKE_BOSS_KILL } else { SHAKE_KILL };

    // Combo
    state.timers.combo = COMBO_TIMEOUT_FRAMES;
    state.stats.combo += 1;
    state.stats.max_combo = state.stats.max_combo.max(state.stats.combo);
    sink.emit(GameEvent::ComboChanged(state.stats.combo));

    let points = combo_points(score_value, state.stats.combo);
    state.stats.score += points;
    sink.emit(GameEvent::ScoreChanged(state.stats.score));

    if state.stats.mission.kind == MissionType::Elimination {
        state.stats.mission.record_kill();
    }

    let (count, speed) = if is_boss { (60, 6.0) } else { (15, 4.0) };
    spawn::spawn_burst(state, center, color, count, speed);
    spawn::spawn_text(state, center, format!("+{points}"), 0xFFFFFF);
    if state.stats.combo > 1 {
        let combo = state.stats.combo;
        spawn::spawn_text(
            state,
            center - Vec2::new(0.0, 18.0),
            format!("{combo}x COMBO"),
            0xFACC15,
        );
    }

    if is_boss || state.rng.random::<f32>() < POWERUP_DROP_CHANCE {
        spawn::spawn_powerup(state, center);
    }

    if is_boss {
        state.stats.mission.complete_boss();
        log::info!("Boss destroyed for {} points", points);
    }
}

/// Score awarded for a kill at the given combo: multiplier min(3, 1 + combo * 0.1), floored
pub fn combo_points(score_value: u64, combo: u32) -> u64 {
    // Tenths keep the multiplier exact
    let tenths = (10 + combo as u64).min((COMBO_MAX_MULTIPLIER * 10.0) as u64);
    score_value * tenths / 10
}

fn enemy_shots_vs_player(state: &mut GameState, sink: &mut dyn EventSink) {
    let (player_pos, player_size) = (state.player.pos, state.player.size);
    let mut hits = 0;
    for shot in state
        .projectiles
        .iter_mut()
        .filter(|p| p.owner == Owner::Enemy && !p.is_spent())
    {
        if rects_overlap(shot.pos, shot.extent(), player_pos, player_size) {
            shot.damage = 0;
            hits += 1;
        }
    }
    for _ in 0..hits {
        if state.game_over {
            break;
        }
        damage_player(state, ENEMY_SHOT_DAMAGE, SHAKE_SHOT_HIT, sink);
        let center = state.player.center();
        spawn::spawn_burst(state, center, 0xF87171, 10, 3.0);
    }
}

/// Ramming: the player takes damage, regular enemies are destroyed outright
fn bodies_vs_player(state: &mut GameState, sink: &mut dyn EventSink) {
    let (player_pos, player_size) = (state.player.pos, state.player.size);
    let rammed: Vec<usize> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive() && rects_overlap(e.pos, e.size, player_pos, player_size))
        .map(|(i, _)| i)
        .collect();

    for index in rammed {
        if state.game_over {
            break;
        }
        damage_player(state, BODY_COLLISION_DAMAGE, SHAKE_BODY_HIT, sink);

        let enemy = &mut state.enemies[index];
        if enemy.is_boss() {
            continue;
        }
        enemy.hp = 0;
        let (center, color) = (enemy.center(), enemy.color);
        state.stats.enemies_destroyed += 1;
        if state.stats.mission.kind == MissionType::Elimination {
            state.stats.mission.record_kill();
        }
        sink.emit(GameEvent::Sound(SoundEffect::Explosion(ExplosionSize::Small)));
        spawn::spawn_burst(state, center, color, 15, 4.0);
    }
}

fn powerups_vs_player(state: &mut GameState, sink: &mut dyn EventSink) {
    let (player_pos, player_size) = (state.player.pos, state.player.size);
    let mut collected = Vec::new();
    for pickup in state.powerups.iter_mut().filter(|p| !p.consumed) {
        if rects_overlap(pickup.pos, pickup.size, player_pos, player_size) {
            pickup.consumed = true;
            collected.push((pickup.kind, pickup.pos + pickup.size / 2.0));
        }
    }

    for (kind, center) in collected {
        match kind.weapon() {
            None => {
                state.player.heal(HEALTH_PICKUP_AMOUNT);
                sink.emit(GameEvent::HealthChanged(state.player.health_percent()));
                sink.emit(GameEvent::Sound(SoundEffect::PowerUp));
            }
            Some(weapon) => {
                state.player.weapon = weapon;
                sink.emit(GameEvent::Sound(SoundEffect::WeaponUpgrade));
            }
        }
        spawn::spawn_burst(state, center, kind.color(), 12, 3.0);
        spawn::spawn_text(state, center, kind.label(), kind.color());
    }
}

/// Apply damage to the player: weapon and combo reset, game over once at zero
fn damage_player(state: &mut GameState, amount: i32, shake: f32, sink: &mut dyn EventSink) {
    let player = &mut state.player;
    player.hp = (player.hp - amount).max(0);
    player.hit_timer = HIT_FLASH_FRAMES;
    player.weapon = WeaponType::Blaster;

    state.stats.combo = 0;
    state.timers.combo = 0;
    sink.emit(GameEvent::ComboChanged(0));

    state.timers.shake += shake;
    sink.emit(GameEvent::HealthChanged(state.player.health_percent()));

    if state.player.hp <= 0 && !state.game_over {
        state.game_over = true;
        let (center, color) = (state.player.center(), state.player.color);
        spawn::spawn_burst(state, center, color, 40, 5.0);
        sink.emit(GameEvent::Sound(SoundEffect::GameOver));
        sink.emit(GameEvent::GameOver(state.stats.clone()));
        log::info!(
            "Game over: score {} on wave {} ({} kills)",
            state.stats.score,
            state.stats.wave,
            state.stats.enemies_destroyed
        );
    }
}

/// End-of-frame removal of spent, dead and off-screen entities
pub fn cleanup(state: &mut GameState) {
    let (w, h) = (state.screen.width, state.screen.height);
    let on_screen = |pos: Vec2| {
        pos.y > -OFFSCREEN_MARGIN
            && pos.y < h + OFFSCREEN_MARGIN
            && pos.x > -OFFSCREEN_MARGIN
            && pos.x < w + OFFSCREEN_MARGIN
    };

    state.projectiles.retain(|p| !p.is_spent() && on_screen(p.pos));
    state
        .enemies
        .retain(|e| (e.is_alive() || e.is_boss()) && e.pos.y < h + OFFSCREEN_MARGIN);
    state
        .powerups
        .retain(|p| !p.consumed && p.pos.y < h + OFFSCREEN_MARGIN);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::NullSink;
    use crate::sim::mission::MissionState;
    use crate::sim::spawn::{EnemyVariant, make_boss, make_enemy};
    use crate::sim::state::{Loadout, PowerUp, PowerUpType, Projectile, ProjectileKind, Screen};

    fn test_state() -> GameState {
        let mut state = GameState::new(4242, Screen::default(), Loadout::default());
        state.initialized = true;
        state.stats.mission = MissionState::elimination(1);
        state.player.pos = Vec2::new(220.0, 700.0);
        state
    }

    fn player_shot(at: Vec2, damage: i32) -> Projectile {
        Projectile {
            pos: at,
            vel: Vec2::new(0.0, -10.0),
            owner: Owner::Player,
            damage,
            size: 6.0,
            kind: ProjectileKind::Blaster,
        }
    }

    fn enemy_shot_on_player(state: &GameState) -> Projectile {
        Projectile {
            pos: state.player.center(),
            vel: Vec2::ZERO,
            owner: Owner::Enemy,
            damage: ENEMY_SHOT_DAMAGE,
            size: 8.0,
            kind: ProjectileKind::BossBeam,
        }
    }

    /// Put a one-hp basic enemy at `pos` and a shot on top of it
    fn setup_kill(state: &mut GameState, pos: Vec2) {
        let id = state.next_entity_id();
        let mut enemy = make_enemy(id, EnemyVariant::Basic, 1, pos);
        enemy.hp = 1;
        state.enemies.push(enemy);
        state.projectiles.push(player_shot(pos + Vec2::splat(10.0), 1));
    }

    fn frame(state: &mut GameState, events: &mut dyn EventSink) {
        resolve_collisions(state, events);
        cleanup(state);
    }

    #[test]
    fn test_shot_hits_only_first_enemy() {
        let mut state = test_state();
        for _ in 0..2 {
            let id = state.next_entity_id();
            state
                .enemies
                .push(make_enemy(id, EnemyVariant::Basic, 1, Vec2::new(100.0, 100.0)));
        }
        state.projectiles.push(player_shot(Vec2::new(110.0, 110.0), 1));
        frame(&mut state, &mut NullSink);

        assert_eq!(state.enemies[0].hp, 2);
        assert_eq!(state.enemies[1].hp, 3);
        assert!(state.projectiles.is_empty(), "spent shot removed");
    }

    #[test]
    fn test_twelve_kills_complete_elimination() {
        let mut state = test_state();
        let mut events: Vec<GameEvent> = Vec::new();
        for i in 0..12 {
            assert!(!state.stats.mission.is_complete);
            setup_kill(&mut state, Vec2::new(20.0 + i as f32, 100.0));
            frame(&mut state, &mut events);
        }
        assert!(state.stats.mission.is_complete);
        assert_eq!(state.stats.mission.current_value, 12);
        assert_eq!(state.stats.combo, 12);
        assert_eq!(state.stats.max_combo, 12);
        assert_eq!(state.stats.enemies_destroyed, 12);
        assert!(events.contains(&GameEvent::ComboChanged(12)));
    }

    #[test]
    fn test_combo_multiplier_scoring() {
        assert_eq!(combo_points(100, 1), 110);
        assert_eq!(combo_points(100, 3), 130);
        assert_eq!(combo_points(150, 7), 255);
        assert_eq!(combo_points(100, 20), 300);
        assert_eq!(combo_points(100, 500), 300);

        let mut state = test_state();
        let mut events: Vec<GameEvent> = Vec::new();
        setup_kill(&mut state, Vec2::new(50.0, 50.0));
        frame(&mut state, &mut events);
        setup_kill(&mut state, Vec2::new(50.0, 50.0));
        frame(&mut state, &mut events);
        assert_eq!(state.stats.score, 110 + 120);
        assert!(events.contains(&GameEvent::ScoreChanged(230)));
    }

    #[test]
    fn test_body_collisions_damage_without_game_over() {
        let mut state = test_state();
        let mut events: Vec<GameEvent> = Vec::new();
        for _ in 0..3 {
            let id = state.next_entity_id();
            let pos = state.player.pos;
            state.enemies.push(make_enemy(id, EnemyVariant::Basic, 1, pos));
            frame(&mut state, &mut events);
        }
        assert_eq!(state.player.hp, 40);
        assert!(!state.game_over);
        assert!(state.enemies.is_empty(), "rammed enemies destroyed");
        assert_eq!(state.stats.mission.current_value, 3, "ram kills count");
        assert!(!events.iter().any(|e| matches!(e, GameEvent::GameOver(_))));
        assert!(events.contains(&GameEvent::HealthChanged(40)));
    }

    #[test]
    fn test_lethal_shot_fires_game_over_once() {
        let mut state = test_state();
        state.player.hp = 15;
        state.stats.score = 777;
        let mut events: Vec<GameEvent> = Vec::new();
        let shot = enemy_shot_on_player(&state);
        state.projectiles.push(shot);
        frame(&mut state, &mut events);

        assert_eq!(state.player.hp, 0);
        assert!(state.game_over);
        let overs: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::GameOver(stats) => Some(stats.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(overs.len(), 1);
        assert_eq!(overs[0].score, 777);

        // Further damage in later frames never re-fires
        let shot = enemy_shot_on_player(&state);
        state.projectiles.push(shot);
        let id = state.next_entity_id();
        let pos = state.player.pos;
        state.enemies.push(make_enemy(id, EnemyVariant::Fast, 1, pos));
        frame(&mut state, &mut events);
        let count = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver(_)))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_death_ends_resolution_for_the_frame() {
        let mut state = test_state();
        state.player.hp = 15;
        let shot = enemy_shot_on_player(&state);
        state.projectiles.push(shot);
        let second = enemy_shot_on_player(&state);
        state.projectiles.push(second);
        let id = state.next_entity_id();
        let pos = state.player.pos;
        state.enemies.push(make_enemy(id, EnemyVariant::Basic, 1, pos));
        state.powerups.push(PowerUp {
            id: 60,
            kind: PowerUpType::Health,
            pos: state.player.pos,
            size: Vec2::splat(POWERUP_SIZE),
            vel: Vec2::ZERO,
            consumed: false,
        });
        let mut events: Vec<GameEvent> = Vec::new();
        frame(&mut state, &mut events);

        assert!(state.game_over);
        assert_eq!(state.player.hp, 0);
        assert_eq!(state.powerups.len(), 1, "pickup left untouched");
        assert_eq!(state.enemies[0].hp, 3, "no ram after death");
        assert!(matches!(events.last(), Some(GameEvent::GameOver(_))));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::HealthChanged(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_regular_kills_drop_pickups_at_random() {
        let mut state = test_state();
        let mut events: Vec<GameEvent> = Vec::new();
        let kills = 200;
        for _ in 0..kills {
            setup_kill(&mut state, Vec2::new(60.0, 60.0));
            frame(&mut state, &mut events);
        }
        assert_eq!(state.stats.enemies_destroyed, kills);
        let drops = state.powerups.len() as u32;
        assert!(drops > 0, "some kills drop");
        assert!(drops < kills / 2, "most kills do not: {drops}");

        // Same seed, same drops
        let mut replay = test_state();
        for _ in 0..kills {
            setup_kill(&mut replay, Vec2::new(60.0, 60.0));
            frame(&mut replay, &mut NullSink);
        }
        let kinds: Vec<_> = state.powerups.iter().map(|p| p.kind).collect();
        let replayed: Vec<_> = replay.powerups.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, replayed);
    }

    #[test]
    fn test_plasma_hit_on_boss() {
        let mut state = test_state();
        state.stats.mission = MissionState::boss();
        let mut boss = make_boss(2, 5, 480.0);
        boss.hp = 500;
        boss.max_hp = 500;
        boss.pos = Vec2::new(100.0, 60.0);
        state.enemies.push(boss);
        state.projectiles.push(Projectile {
            kind: ProjectileKind::Plasma,
            size: 14.0,
            ..player_shot(Vec2::new(150.0, 100.0), 3)
        });
        let mut events: Vec<GameEvent> = Vec::new();
        frame(&mut state, &mut events);

        assert_eq!(state.enemies[0].hp, 497);
        assert!(!state.stats.mission.is_complete);
        assert_eq!(state.stats.enemies_destroyed, 0);
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(SoundEffect::Explosion(_)))));
    }

    #[test]
    fn test_boss_kill_completes_mission_and_drops() {
        let mut state = test_state();
        state.stats.mission = MissionState::boss();
        let mut boss = make_boss(2, 5, 480.0);
        boss.hp = 1;
        boss.pos = Vec2::new(100.0, 60.0);
        state.enemies.push(boss);
        state.projectiles.push(player_shot(Vec2::new(150.0, 100.0), 1));
        let mut events: Vec<GameEvent> = Vec::new();
        frame(&mut state, &mut events);

        assert!(state.stats.mission.is_complete);
        assert_eq!(state.powerups.len(), 1, "boss always drops");
        assert_eq!(state.stats.score, combo_points(5000, 1));
        assert_eq!(state.timers.shake, SHAKE_BOSS_KILL);
        assert_eq!(state.enemies.len(), 1, "dead boss stays until the wave ends");
        assert!(events.contains(&GameEvent::Sound(SoundEffect::Explosion(ExplosionSize::Large))));
    }

    #[test]
    fn test_spread_pickup_then_hit_reverts_to_blaster() {
        let mut state = test_state();
        let mut events: Vec<GameEvent> = Vec::new();
        state.powerups.push(PowerUp {
            id: 50,
            kind: PowerUpType::WeaponSpread,
            pos: state.player.pos,
            size: Vec2::splat(POWERUP_SIZE),
            vel: Vec2::ZERO,
            consumed: false,
        });
        frame(&mut state, &mut events);
        assert_eq!(state.player.weapon, WeaponType::Spread);
        assert!(state.powerups.is_empty());
        assert!(events.contains(&GameEvent::Sound(SoundEffect::WeaponUpgrade)));

        let shot = enemy_shot_on_player(&state);
        state.projectiles.push(shot);
        frame(&mut state, &mut events);
        assert_eq!(state.player.weapon, WeaponType::Blaster);
        assert_eq!(state.player.hp, PLAYER_MAX_HP - ENEMY_SHOT_DAMAGE);
    }

    #[test]
    fn test_health_pickup_is_capped() {
        let mut state = test_state();
        state.player.hp = 90;
        state.powerups.push(PowerUp {
            id: 51,
            kind: PowerUpType::Health,
            pos: state.player.pos,
            size: Vec2::splat(POWERUP_SIZE),
            vel: Vec2::ZERO,
            consumed: false,
        });
        let mut events: Vec<GameEvent> = Vec::new();
        frame(&mut state, &mut events);
        assert_eq!(state.player.hp, PLAYER_MAX_HP);
        assert!(events.contains(&GameEvent::HealthChanged(100)));
        assert!(events.contains(&GameEvent::Sound(SoundEffect::PowerUp)));
    }

    #[test]
    fn test_player_damage_breaks_combo() {
        let mut state = test_state();
        let mut events: Vec<GameEvent> = Vec::new();
        for _ in 0..3 {
            setup_kill(&mut state, Vec2::new(60.0, 60.0));
            frame(&mut state, &mut events);
        }
        assert_eq!(state.stats.combo, 3);
        let shot = enemy_shot_on_player(&state);
        state.projectiles.push(shot);
        frame(&mut state, &mut events);
        assert_eq!(state.stats.combo, 0);
        assert_eq!(state.stats.max_combo, 3);
        assert_eq!(events.last(), Some(&GameEvent::HealthChanged(85)));
    }

    #[test]
    fn test_cleanup_margins() {
        let mut state = test_state();
        let h = state.screen.height;
        state.projectiles.push(player_shot(Vec2::new(10.0, -OFFSCREEN_MARGIN - 1.0), 1));
        state.projectiles.push(player_shot(Vec2::new(10.0, 10.0), 1));
        let mut boss = make_boss(3, 5, 480.0);
        boss.hp = 0;
        state.enemies.push(boss);
        let mut gone = make_boss(4, 5, 480.0);
        gone.pos.y = h + OFFSCREEN_MARGIN + 1.0;
        state.enemies.push(gone);
        cleanup(&mut state);

        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, 3);
    }
}

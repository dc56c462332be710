//! Fixed timestep simulation tick
//!
//! Core game loop that advances the playfield deterministically. Order per
//! tick: spawn timer, player, enemies, lasers, collisions, reaping,
//! background.

use glam::Vec2;

use super::collision::{CollisionReport, resolve_collisions};
use super::enemy::{Spawns, StepContext};
use super::spawn::{RandomSource, run_spawn_timer};
use super::state::{Faction, GameEvent, GameState, Laser, Lifecycle};

/// Input commands for a single tick, polled once by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

/// Advance the game state by one tick using the state's own RNG
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let mut rng = state.rng.clone();
    tick_with_rng(state, input, dt, &mut rng);
    state.rng = rng;
}

/// Advance the game state by one tick with an external random source
pub fn tick_with_rng(
    state: &mut GameState,
    input: &TickInput,
    dt: f32,
    rng: &mut impl RandomSource,
) {
    state.time_ticks += 1;

    run_spawn_timer(state, dt, rng);

    if state.player.is_dead() {
        // Nothing but the explosion animation runs for a dead player
        state.player.body.advance_explosion(dt);
    } else {
        step_player(state, input, dt);
    }

    step_enemies(state, dt);
    step_lasers(state, dt);

    let report = resolve_collisions(state, dt);
    if report != CollisionReport::default() {
        log::trace!(
            "Tick {}: {} rammed, {} shot down, {} player hits",
            state.time_ticks,
            report.player_enemy,
            report.laser_enemy,
            report.player_laser
        );
    }

    reap(state, dt);

    let strip_height = state.settings.playfield_height;
    for layer in state.backgrounds.iter_mut() {
        layer.step(dt, strip_height);
    }
}

/// Cooldown/fire, movement, then latch the fire input for the next tick
fn step_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let settings = &state.settings;
    let player = &mut state.player;

    // Fire uses the shooting flag latched on the previous tick
    if player.is_shooting {
        if player.shoot_tick < player.shoot_delay {
            player.shoot_tick += 1;
        } else {
            let id = state.ids.next_id();
            let pos = player.body.pos;
            state.player_lasers.push(Laser::new(
                id,
                Faction::Player,
                pos,
                Vec2::new(0.0, -settings.player_laser_speed),
                settings.sizes.player_laser,
            ));
            state.events.push(GameEvent::LaserFired {
                faction: Faction::Player,
                pos,
            });
            player.shoot_tick = 0;
        }
    }

    player.body.vel.x = if input.left {
        -settings.player_speed
    } else if input.right {
        settings.player_speed
    } else {
        0.0
    };
    player.body.integrate(dt);

    if input.fire {
        player.is_shooting = true;
    } else {
        // Released: the next press fires on its second held tick
        player.shoot_tick = player.shoot_delay - 1;
        player.is_shooting = false;
    }
}

fn step_enemies(state: &mut GameState, dt: f32) {
    let ctx = StepContext {
        dt,
        player_pos: (!state.player.is_dead()).then_some(state.player.body.pos),
        settings: &state.settings,
    };
    let mut spawns = Spawns::new(&mut state.ids);

    for enemy in state.enemies.iter_mut() {
        enemy.step(&ctx, &mut spawns);
    }

    spawns.commit(&mut state.enemies, &mut state.enemy_lasers, &mut state.events);
}

fn step_lasers(state: &mut GameState, dt: f32) {
    for laser in state.enemy_lasers.iter_mut().chain(state.player_lasers.iter_mut()) {
        laser.body.integrate(dt);
    }
}

/// Remove entities that left the playfield, spent lasers and finished wrecks
fn reap(state: &mut GameState, dt: f32) {
    let width = state.settings.playfield_width;
    let height = state.settings.playfield_height;
    let ctx = StepContext {
        dt,
        player_pos: (!state.player.is_dead()).then_some(state.player.body.pos),
        settings: &state.settings,
    };
    let mut spawns = Spawns::new(&mut state.ids);

    for enemy in state.enemies.iter_mut() {
        if enemy.body.removed {
            continue;
        }
        if enemy.body.out_of_bounds(width, height) {
            // A wreck already ran its cleanup (or skipped it) when it died
            if !enemy.is_dead() {
                enemy.on_destroy(&ctx, &mut spawns);
            }
            log::trace!("Reaped {:?} {} out of bounds", enemy.kind(), enemy.body.id);
            enemy.body.removed = true;
        } else if enemy.body.lifecycle == Lifecycle::Dead {
            enemy.body.removed = true;
        }
    }

    for laser in state.enemy_lasers.iter_mut().chain(state.player_lasers.iter_mut()) {
        if laser.body.out_of_bounds(width, height) {
            laser.body.removed = true;
        }
    }

    state.enemies.retain(|e| !e.body.removed);
    state.enemy_lasers.retain(|l| !l.body.removed);
    state.player_lasers.retain(|l| !l.body.removed);

    // Anything released at an off-field position would already be past the margin
    spawns.discard_out_of_bounds(width, height);
    spawns.commit(&mut state.enemies, &mut state.enemy_lasers, &mut state.events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::enemy::Enemy;
    use crate::sim::spawn::ScriptedRandom;
    use crate::sim::state::EntityKind;
    use proptest::prelude::*;

    /// State whose spawn timer never fires within a test
    fn quiet_state() -> GameState {
        let mut settings = crate::Settings::default();
        settings.spawn_interval_secs = 1.0e6;
        GameState::with_settings(5, settings)
    }

    fn fire_ticks(state: &GameState) -> usize {
        state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::LaserFired { faction: Faction::Player, .. }))
            .count()
    }

    #[test]
    fn test_player_moves_without_clamping() {
        let mut state = quiet_state();
        let start = state.player.body.pos;
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..60 {
            tick(&mut state, &left, SIM_DT);
        }
        assert!((state.player.body.pos.x - (start.x - 200.0)).abs() < 0.1);

        // Keeps going past the left edge
        for _ in 0..120 {
            tick(&mut state, &left, SIM_DT);
        }
        assert!(state.player.body.pos.x < 0.0);
        assert_eq!(state.player.body.pos.y, start.y);
    }

    #[test]
    fn test_left_wins_over_right() {
        let mut state = quiet_state();
        let start = state.player.body.pos.x;
        let both = TickInput {
            left: true,
            right: true,
            fire: false,
        };
        tick(&mut state, &both, SIM_DT);
        assert!(state.player.body.pos.x < start);
    }

    #[test]
    fn test_fire_cooldown_quirk() {
        // Documented quirk: release resets the counter to delay - 1, so a
        // fresh press fires on its second held tick, then every delay + 1.
        let mut state = quiet_state();
        let delay = state.player.shoot_delay as usize;
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };

        let mut fired_at = Vec::new();
        for t in 0..(2 + 3 * (delay + 1)) {
            let before = fire_ticks(&state);
            tick(&mut state, &fire, SIM_DT);
            if fire_ticks(&state) > before {
                fired_at.push(t);
            }
        }
        // Tick 0 latches the press, tick 1 counts to the delay, tick 2 fires
        let expected: Vec<usize> = (0..3).map(|n| 2 + n * (delay + 1)).collect();
        assert_eq!(&fired_at[..3], &expected[..]);
        assert_eq!(state.player_lasers.len(), fired_at.len());
    }

    #[test]
    fn test_release_resets_cooldown() {
        let mut state = quiet_state();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &fire, SIM_DT);
        tick(&mut state, &fire, SIM_DT);
        tick(&mut state, &fire, SIM_DT);
        assert_eq!(state.player_lasers.len(), 1);
        assert_eq!(state.player.shoot_tick, 0);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(!state.player.is_shooting);
        assert_eq!(state.player.shoot_tick, state.player.shoot_delay - 1);
    }

    #[test]
    fn test_player_laser_travels_up() {
        let mut state = quiet_state();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        for _ in 0..3 {
            tick(&mut state, &fire, SIM_DT);
        }
        let laser = &state.player_lasers[0];
        assert_eq!(laser.faction, Faction::Player);
        assert!(laser.body.pos.y < state.player.body.pos.y);
    }

    #[test]
    fn test_laser_hits_carrier_releases_fragments() {
        let mut state = quiet_state();
        let id = state.next_entity_id();
        let carrier_pos = Vec2::new(100.0, 200.0);
        state.enemies.push(Enemy::new(
            id,
            EntityKind::CarrierShip,
            carrier_pos,
            Vec2::ZERO,
            &state.settings,
        ));
        let laser_id = state.next_entity_id();
        state.player_lasers.push(Laser::new(
            laser_id,
            Faction::Player,
            carrier_pos,
            Vec2::ZERO,
            state.settings.sizes.player_laser,
        ));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.player_lasers.is_empty());
        let carrier = state.enemies.iter().find(|e| e.body.id == id).unwrap();
        assert!(carrier.is_dead());
        assert_eq!(state.count_enemies_of_kind(EntityKind::Fragment), 2);

        // Every fragment is announced to the host
        let mut announced: Vec<u32> = state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::EnemySpawned { id, kind: EntityKind::Fragment, .. } => Some(*id),
                _ => None,
            })
            .collect();
        let mut fragments: Vec<u32> = state
            .enemies_of_kind(EntityKind::Fragment)
            .map(|e| e.body.id)
            .collect();
        announced.sort_unstable();
        fragments.sort_unstable();
        assert_eq!(announced, fragments);

        // Carrier wreck is cleared once its explosion finishes
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.enemies.iter().all(|e| e.body.id != id));
        assert_eq!(state.count_enemies_of_kind(EntityKind::CarrierShip), 0);
    }

    #[test]
    fn test_explode_hooks_fire_once() {
        let mut state = quiet_state();
        let pos = state.player.body.pos;
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(
            id,
            EntityKind::GunShip,
            pos,
            Vec2::ZERO,
            &state.settings,
        ));

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        let explosions = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Explosion { .. }))
            .count();
        let destroyed = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::PlayerDestroyed)
            .count();
        assert_eq!(explosions, 1);
        assert_eq!(destroyed, 1);
        assert_eq!(state.player.body.lifecycle, Lifecycle::Dead);
    }

    #[test]
    fn test_dead_player_is_not_stepped() {
        let mut state = quiet_state();
        let settings = state.settings.clone();
        state.player.explode(false, &settings, &mut state.events);
        let pos = state.player.body.pos;

        let input = TickInput {
            left: true,
            right: false,
            fire: true,
        };
        for _ in 0..10 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.player.body.pos, pos);
        assert!(state.player_lasers.is_empty());
    }

    #[test]
    fn test_out_of_bounds_carrier_runs_hook() {
        let mut state = quiet_state();
        let id = state.next_entity_id();
        // Below the bottom margin
        state.enemies.push(Enemy::new(
            id,
            EntityKind::CarrierShip,
            Vec2::new(100.0, 700.0),
            Vec2::ZERO,
            &state.settings,
        ));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.enemies.is_empty());
        // The hook allocated two fragment ids, but both were released past
        // the margin and never joined the playfield
        assert_eq!(state.next_entity_id(), id + 3);
        assert!(
            !state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::EnemySpawned { .. }))
        );
    }

    #[test]
    fn test_gunship_fire_reaches_enemy_lasers() {
        let mut state = quiet_state();
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(
            id,
            EntityKind::GunShip,
            Vec2::new(50.0, 50.0),
            Vec2::ZERO,
            &state.settings,
        ));
        for _ in 0..61 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.enemy_lasers.len(), 1);
        assert_eq!(state.enemy_lasers[0].faction, Faction::Enemy);
        let enemy_shots = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::LaserFired { faction: Faction::Enemy, .. }))
            .count();
        assert_eq!(enemy_shots, 1);
    }

    #[test]
    fn test_background_scrolls() {
        let mut state = quiet_state();
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.backgrounds[0].offset, 0.0);
        assert!((state.backgrounds[1].offset - 10.0).abs() < 0.01);
        assert!((state.backgrounds[2].offset - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_scripted_rng_drives_spawns() {
        let mut state = GameState::new(3);
        // Gun at x=240 every second
        let mut rng = ScriptedRandom::new([9, 240, 50, 10]);
        for _ in 0..121 {
            tick_with_rng(&mut state, &TickInput::default(), SIM_DT, &mut rng);
        }
        assert_eq!(state.count_enemies_of_kind(EntityKind::GunShip), 2);
    }

    #[test]
    fn test_ten_spawn_intervals_with_scripted_draws() {
        let mut settings = crate::Settings::default();
        settings.chaser_cap = 2;
        let mut state = GameState::with_settings(3, settings);
        // Keep chasers descending and nothing colliding with the player
        let player_settings = state.settings.clone();
        state.player.explode(false, &player_settings, &mut state.events);

        // Policy draws, then x, descent, scale for every spawn that happens
        let mut rng = ScriptedRandom::new([
            4, 10, 50, 10, // gun
            2, 6, 20, 50, 10, // chaser
            1, 3, 30, 50, 10, // carrier
            0, 9, 40, 50, 10, // chaser (cap reached)
            2, 5, // chaser capped: nothing spawns
            9, 60, 50, 10, // gun
            0, 0, 70, 50, 10, // carrier
            3, 80, 50, 10, // gun
            1, 8, // chaser capped
            7, 100, 50, 20, // gun
        ]);

        // One-second ticks: the timer fires exactly once per tick
        for _ in 0..10 {
            tick_with_rng(&mut state, &TickInput::default(), 1.0, &mut rng);
        }

        let (gun, chaser, carrier) = (
            EntityKind::GunShip,
            EntityKind::ChaserShip,
            EntityKind::CarrierShip,
        );
        let kinds: Vec<EntityKind> = state.enemies.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, [gun, chaser, carrier, chaser, gun, carrier, gun, gun]);
        let xs: Vec<f32> = state.enemies.iter().map(|e| e.body.pos.x).collect();
        assert_eq!(xs, [10.0, 20.0, 30.0, 40.0, 60.0, 70.0, 80.0, 100.0]);
        assert!(state.enemies.iter().all(|e| e.body.vel == Vec2::new(0.0, 50.0)));
        assert!((state.enemies[7].body.scale - 2.0).abs() < 1e-5);
        // First spawn has descended ten ticks
        assert_eq!(state.enemies[0].body.pos.y, 500.0);

        let spawned = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, 8);
        assert_eq!(rng.consumed(), 40);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                left: true,
                ..Default::default()
            },
            TickInput {
                fire: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                fire: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..2000 {
            let input = &inputs[(i / 37) % inputs.len()];
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        assert_eq!(state1.events, state2.events);
        assert!((state1.player.body.pos.x - state2.player.body.pos.x).abs() < 0.0001);
    }

    #[test]
    fn test_state_serializes() {
        let mut state = GameState::new(11);
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.enemies.len(), state.enemies.len());
        assert_eq!(restored.time_ticks, state.time_ticks);
    }

    proptest! {
        #[test]
        fn prop_fire_events_spaced_by_delay(delay in 1u32..20, ticks in 10usize..200) {
            let mut settings = crate::Settings::default();
            settings.spawn_interval_secs = 1.0e6;
            settings.shoot_delay = delay;
            let mut state = GameState::with_settings(1, settings);
            let fire = TickInput { fire: true, ..Default::default() };

            let mut last_fire: Option<usize> = None;
            for t in 0..ticks {
                let before = fire_ticks(&state);
                tick(&mut state, &fire, SIM_DT);
                if fire_ticks(&state) > before {
                    if let Some(last) = last_fire {
                        prop_assert!(t - last >= delay as usize);
                    }
                    last_fire = Some(t);
                }
            }
        }

        #[test]
        fn prop_reaping_removes_everything_out_of_bounds(
            xs in proptest::collection::vec(-200.0f32..700.0, 1..20),
            ys in proptest::collection::vec(-300.0f32..900.0, 1..20),
        ) {
            let mut state = quiet_state();
            let (width, height) = (state.settings.playfield_width, state.settings.playfield_height);
            let kinds = [EntityKind::GunShip, EntityKind::CarrierShip, EntityKind::ChaserShip];
            for (i, (&x, &y)) in xs.iter().zip(ys.iter()).enumerate() {
                let kind = kinds[i % kinds.len()];
                let pos = Vec2::new(x, y);
                let sizes = state.settings.sizes.clone();
                let id = state.next_entity_id();
                state.enemies.push(Enemy::new(id, kind, pos, Vec2::ZERO, &state.settings));
                let id = state.next_entity_id();
                let laser = Laser::new(id, Faction::Enemy, pos, Vec2::ZERO, sizes.enemy_laser);
                state.enemy_lasers.push(laser);
                let id = state.next_entity_id();
                let laser = Laser::new(id, Faction::Player, pos, Vec2::ZERO, sizes.player_laser);
                state.player_lasers.push(laser);
            }

            reap(&mut state, SIM_DT);

            for enemy in &state.enemies {
                prop_assert!(!enemy.body.out_of_bounds(width, height));
            }
            for laser in state.enemy_lasers.iter().chain(state.player_lasers.iter()) {
                prop_assert!(!laser.body.out_of_bounds(width, height));
            }
        }
    }
}

//! Enemy spawn policy
//!
//! A fixed-interval accumulator triggers one spawn decision per interval.
//! The draw order (policy draws, then x, descent speed, scale) is part of
//! the deterministic contract.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::enemy::Enemy;
use super::state::{EntityKind, GameEvent, GameState};
use crate::consts::*;

/// Uniform integer draws over closed ranges
pub trait RandomSource {
    /// Integer in `[min, max]`
    fn between(&mut self, min: i32, max: i32) -> i32;
}

impl RandomSource for Pcg32 {
    fn between(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.random_range(min..=max)
    }
}

/// Replays a fixed cycle of draws, clamped to the requested range
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<i32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(draws: impl Into<Vec<i32>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }

    /// Number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn between(&mut self, min: i32, max: i32) -> i32 {
        if self.draws.is_empty() {
            return min;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value.clamp(min, max.max(min))
    }
}

/// Result of one spawn decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnDecision {
    Spawn(EntityKind),
    /// Chaser picked but the population cap was reached
    ChaserCapped,
}

/// Pick what to spawn. Consumes one or two policy draws.
pub fn decide_spawn(
    rng: &mut impl RandomSource,
    live_chasers: usize,
    chaser_cap: usize,
) -> SpawnDecision {
    if rng.between(0, SPAWN_DRAW_MAX) >= GUNSHIP_THRESHOLD {
        SpawnDecision::Spawn(EntityKind::GunShip)
    } else if rng.between(0, SPAWN_DRAW_MAX) >= CHASER_THRESHOLD {
        if live_chasers < chaser_cap {
            SpawnDecision::Spawn(EntityKind::ChaserShip)
        } else {
            SpawnDecision::ChaserCapped
        }
    } else {
        SpawnDecision::Spawn(EntityKind::CarrierShip)
    }
}

/// Make one spawn decision and, if it yields an enemy, place it at the top
/// edge. Returns the new enemy's id.
pub fn spawn_wave_enemy(state: &mut GameState, rng: &mut impl RandomSource) -> Option<u32> {
    let live_chasers = state.count_enemies_of_kind(EntityKind::ChaserShip);
    let kind = match decide_spawn(rng, live_chasers, state.settings.chaser_cap) {
        SpawnDecision::Spawn(kind) => kind,
        SpawnDecision::ChaserCapped => {
            log::debug!("Chaser cap reached ({} live), skipping spawn", live_chasers);
            return None;
        }
    };

    let x = rng.between(0, state.settings.playfield_width as i32) as f32;
    let descent = rng.between(DESCENT_SPEED_MIN, DESCENT_SPEED_MAX) as f32;
    let scale = rng.between(SCALE_DRAW_MIN, SCALE_DRAW_MAX) as f32 * 0.1;

    let id = state.next_entity_id();
    let pos = Vec2::new(x, 0.0);
    let mut enemy = Enemy::new(id, kind, pos, Vec2::new(0.0, descent), &state.settings);
    enemy.body.scale = scale;
    state.enemies.push(enemy);
    state.events.push(GameEvent::EnemySpawned { id, kind, pos });

    log::debug!("Spawned {:?} {} at x={} (scale {:.1})", kind, id, x, scale);
    Some(id)
}

/// Advance the spawn accumulator, making one decision per elapsed interval
pub fn run_spawn_timer(state: &mut GameState, dt: f32, rng: &mut impl RandomSource) -> u32 {
    let interval = state.settings.spawn_interval_secs;
    if interval <= 0.0 {
        return 0;
    }

    state.spawn_accumulator += dt;
    let mut decisions = 0;
    while state.spawn_accumulator >= interval {
        state.spawn_accumulator -= interval;
        spawn_wave_enemy(state, rng);
        decisions += 1;
    }
    decisions
}

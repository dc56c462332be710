//! Collision detection and resolution
//!
//! Bodies collide as axis-aligned boxes centered on their position. Three
//! checks run every tick in a fixed order; each finishes before the next
//! starts, so deaths from an earlier check are visible to later ones.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Spawns, StepContext};
use super::state::GameState;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; boxes that only touch along an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Outcome counts of one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub player_enemy: u32,
    pub laser_enemy: u32,
    pub player_laser: u32,
}

/// Run all collision checks for this tick
pub fn resolve_collisions(state: &mut GameState, dt: f32) -> CollisionReport {
    CollisionReport {
        player_enemy: player_vs_enemies(state),
        laser_enemy: player_lasers_vs_enemies(state, dt),
        player_laser: player_vs_enemy_lasers(state),
    }
}

/// Ramming: both explode. The enemy's destroy hook does not run.
fn player_vs_enemies(state: &mut GameState) -> u32 {
    let mut hits = 0;
    for enemy in state.enemies.iter_mut() {
        if state.player.is_dead() {
            break;
        }
        if enemy.is_dead() || enemy.body.removed {
            continue;
        }
        if !state.player.body.aabb().overlaps(&enemy.body.aabb()) {
            continue;
        }

        state.player.explode(false, &state.settings, &mut state.events);
        state.player.on_destroy(&mut state.events);
        enemy.explode(true, &state.settings, &mut state.events);
        hits += 1;
    }
    hits
}

/// Player laser hits: enemy cleanup hook, explosion, laser consumed
fn player_lasers_vs_enemies(state: &mut GameState, dt: f32) -> u32 {
    let ctx = StepContext {
        dt,
        player_pos: (!state.player.is_dead()).then_some(state.player.body.pos),
        settings: &state.settings,
    };
    let mut spawns = Spawns::new(&mut state.ids);
    let mut hits = 0;

    for laser in state.player_lasers.iter_mut() {
        if laser.is_spent() {
            continue;
        }
        let laser_box = laser.body.aabb();

        for enemy in state.enemies.iter_mut() {
            if enemy.is_dead() || enemy.body.removed {
                continue;
            }
            if !laser_box.overlaps(&enemy.body.aabb()) {
                continue;
            }

            enemy.on_destroy(&ctx, &mut spawns);
            enemy.explode(true, ctx.settings, &mut state.events);
            laser.body.removed = true;
            hits += 1;
            break;
        }
    }

    // Fragments join after the check so they are not hit by the same volley
    spawns.commit(&mut state.enemies, &mut state.enemy_lasers, &mut state.events);
    hits
}

/// Enemy fire hitting the player
fn player_vs_enemy_lasers(state: &mut GameState) -> u32 {
    let mut hits = 0;
    for laser in state.enemy_lasers.iter_mut() {
        if state.player.is_dead() {
            break;
        }
        if laser.is_spent() {
            continue;
        }
        if !state.player.body.aabb().overlaps(&laser.body.aabb()) {
            continue;
        }

        state.player.explode(false, &state.settings, &mut state.events);
        state.player.on_destroy(&mut state.events);
        laser.body.removed = true;
        hits += 1;
    }
    hits
}

//! Enemy ships
//!
//! Every variant implements [`EnemyBehavior`]. The closed [`Behavior`] enum
//! dispatches to them so enemies stay `Clone` and serializable.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Body, EntityIds, EntityKind, Faction, GameEvent, Laser};
use crate::consts::*;
use crate::settings::Settings;

/// Read-only view of the world an enemy needs while stepping
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub dt: f32,
    /// Player position, `None` once the player is dead
    pub player_pos: Option<Vec2>,
    pub settings: &'a Settings,
}

/// Entities created while stepping or destroying enemies.
///
/// Buffered so the collections being iterated are never mutated in place.
#[derive(Debug)]
pub struct Spawns<'a> {
    ids: &'a mut EntityIds,
    pub lasers: Vec<Laser>,
    pub enemies: Vec<Enemy>,
}

impl<'a> Spawns<'a> {
    pub fn new(ids: &'a mut EntityIds) -> Self {
        Self {
            ids,
            lasers: Vec::new(),
            enemies: Vec::new(),
        }
    }

    pub fn fire_laser(&mut self, faction: Faction, pos: Vec2, vel: Vec2, size: Vec2) {
        let id = self.ids.next_id();
        self.lasers.push(Laser::new(id, faction, pos, vel, size));
    }

    pub fn spawn_enemy(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2, settings: &Settings) {
        let id = self.ids.next_id();
        self.enemies.push(Enemy::new(id, kind, pos, vel, settings));
    }

    /// True when nothing was buffered
    pub fn is_empty(&self) -> bool {
        self.lasers.is_empty() && self.enemies.is_empty()
    }

    /// Drop buffered entities that would already be beyond the reaping margin
    pub fn discard_out_of_bounds(&mut self, width: f32, height: f32) {
        self.enemies.retain(|e| {
            let keep = !e.body.out_of_bounds(width, height);
            if !keep {
                log::trace!("Discarded {:?} {} spawned out of bounds", e.kind(), e.body.id);
            }
            keep
        });
        self.lasers.retain(|l| !l.body.out_of_bounds(width, height));
    }

    /// Move buffered entities into the world, announcing each one
    pub fn commit(
        self,
        enemies: &mut Vec<Enemy>,
        lasers: &mut Vec<Laser>,
        events: &mut Vec<GameEvent>,
    ) {
        for laser in self.lasers {
            events.push(GameEvent::LaserFired {
                faction: laser.faction,
                pos: laser.body.pos,
            });
            lasers.push(laser);
        }
        for enemy in self.enemies {
            events.push(GameEvent::EnemySpawned {
                id: enemy.body.id,
                kind: enemy.kind(),
                pos: enemy.body.pos,
            });
            enemies.push(enemy);
        }
    }
}

/// Per-variant motion, fire and cleanup
pub trait EnemyBehavior {
    /// Advance motion and fire for one tick
    fn step(&mut self, body: &mut Body, ctx: &StepContext<'_>, spawns: &mut Spawns<'_>);

    /// Variant cleanup, invoked before the enemy explodes or is reaped
    fn on_destroy(&mut self, _body: &Body, _ctx: &StepContext<'_>, _spawns: &mut Spawns<'_>) {}
}

/// Straight descent, fires down at a fixed interval
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GunShip {
    /// Seconds since the last shot
    pub fire_timer: f32,
}

impl EnemyBehavior for GunShip {
    fn step(&mut self, body: &mut Body, ctx: &StepContext<'_>, spawns: &mut Spawns<'_>) {
        body.integrate(ctx.dt);

        self.fire_timer += ctx.dt;
        let interval = ctx.settings.gunship_fire_interval_secs;
        if interval > 0.0 && self.fire_timer >= interval {
            self.fire_timer -= interval;
            spawns.fire_laser(
                Faction::Enemy,
                body.pos,
                Vec2::new(0.0, ctx.settings.enemy_laser_speed),
                ctx.settings.sizes.enemy_laser,
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChaseState {
    #[default]
    MoveDown,
    Chase,
}

/// Descends until the player is close, then homes in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChaserShip {
    pub state: ChaseState,
    /// Cosmetic sprite rotation
    pub rotation_deg: f32,
}

impl EnemyBehavior for ChaserShip {
    fn step(&mut self, body: &mut Body, ctx: &StepContext<'_>, _spawns: &mut Spawns<'_>) {
        if let Some(player) = ctx.player_pos {
            if self.state == ChaseState::MoveDown
                && body.pos.distance(player) < ctx.settings.chase_radius
            {
                self.state = ChaseState::Chase;
            }

            if self.state == ChaseState::Chase {
                let to_player = player - body.pos;
                let angle = to_player.y.atan2(to_player.x);
                body.vel = Vec2::new(angle.cos(), angle.sin()) * ctx.settings.chase_speed;

                if body.pos.x < player.x {
                    self.rotation_deg -= CHASER_TURN_DEGREES;
                } else {
                    self.rotation_deg += CHASER_TURN_DEGREES;
                }
            }
        }
        // With the player gone a chaser keeps its last heading
        body.integrate(ctx.dt);
    }
}

/// Straight descent; breaks into escort fragments when destroyed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarrierShip;

impl EnemyBehavior for CarrierShip {
    fn step(&mut self, body: &mut Body, ctx: &StepContext<'_>, _spawns: &mut Spawns<'_>) {
        body.integrate(ctx.dt);
    }

    fn on_destroy(&mut self, body: &Body, ctx: &StepContext<'_>, spawns: &mut Spawns<'_>) {
        for i in 0..CARRIER_FRAGMENTS {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let vel = Vec2::new(side * FRAGMENT_DRIFT, FRAGMENT_DESCENT);
            spawns.spawn_enemy(EntityKind::Fragment, body.pos, vel, ctx.settings);
        }
        log::debug!(
            "Carrier {} released {} fragments",
            body.id,
            CARRIER_FRAGMENTS
        );
    }
}

/// Escort fragment: drifts with constant velocity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fragment;

impl EnemyBehavior for Fragment {
    fn step(&mut self, body: &mut Body, ctx: &StepContext<'_>, _spawns: &mut Spawns<'_>) {
        body.integrate(ctx.dt);
    }
}

/// Variant state for an enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    GunShip(GunShip),
    ChaserShip(ChaserShip),
    CarrierShip(CarrierShip),
    Fragment(Fragment),
}

impl Behavior {
    /// Fresh behavior state for an enemy kind. Non-enemy kinds get a Fragment.
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::GunShip => Behavior::GunShip(GunShip::default()),
            EntityKind::ChaserShip => Behavior::ChaserShip(ChaserShip::default()),
            EntityKind::CarrierShip => Behavior::CarrierShip(CarrierShip),
            _ => Behavior::Fragment(Fragment),
        }
    }

    fn as_dyn(&mut self) -> &mut dyn EnemyBehavior {
        match self {
            Behavior::GunShip(b) => b,
            Behavior::ChaserShip(b) => b,
            Behavior::CarrierShip(b) => b,
            Behavior::Fragment(b) => b,
        }
    }
}

impl EnemyBehavior for Behavior {
    fn step(&mut self, body: &mut Body, ctx: &StepContext<'_>, spawns: &mut Spawns<'_>) {
        self.as_dyn().step(body, ctx, spawns);
    }

    fn on_destroy(&mut self, body: &Body, ctx: &StepContext<'_>, spawns: &mut Spawns<'_>) {
        self.as_dyn().on_destroy(body, ctx, spawns);
    }
}

/// An enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, vel: Vec2, settings: &Settings) -> Self {
        let mut body = Body::new(id, kind, pos, settings.sizes.for_kind(kind));
        body.vel = vel;
        Self {
            body,
            behavior: Behavior::for_kind(kind),
        }
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.body.kind
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.body.is_dead()
    }

    /// Step behavior while alive; only the explosion advances once dead
    pub fn step(&mut self, ctx: &StepContext<'_>, spawns: &mut Spawns<'_>) {
        if self.body.is_dead() {
            self.body.advance_explosion(ctx.dt);
            return;
        }
        self.behavior.step(&mut self.body, ctx, spawns);
    }

    /// Run the variant's destroy hook
    pub fn on_destroy(&mut self, ctx: &StepContext<'_>, spawns: &mut Spawns<'_>) {
        self.behavior.on_destroy(&self.body, ctx, spawns);
    }

    /// Mark dead and start the explosion. `play_fx` emits the explosion
    /// sound event. No-op on an enemy that is already dead.
    pub fn explode(
        &mut self,
        play_fx: bool,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if !self.body.start_explosion(settings.explosion_secs) {
            return false;
        }
        log::debug!("{:?} {} exploded", self.body.kind, self.body.id);
        if play_fx {
            events.push(GameEvent::Explosion {
                id: self.body.id,
                kind: self.body.kind,
                pos: self.body.pos,
            });
        }
        true
    }
}

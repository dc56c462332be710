//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-supplied timestep, one tick per frame
//! - Replaceable, seedable random source
//! - Stable iteration order (insertion order, removal by id)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod enemy;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionReport, resolve_collisions};
pub use enemy::{
    Behavior, CarrierShip, ChaseState, ChaserShip, Enemy, EnemyBehavior, Fragment, GunShip,
    Spawns, StepContext,
};
pub use spawn::{
    RandomSource, ScriptedRandom, SpawnDecision, decide_spawn, run_spawn_timer, spawn_wave_enemy,
};
pub use state::{
    BackgroundLayer, Body, EntityIds, EntityKind, Faction, GameEvent, GameState, Laser, Lifecycle,
    Player,
};
pub use tick::{TickInput, tick, tick_with_rng};

//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`], owned by the host.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::enemy::Enemy;
use crate::consts::*;
use crate::settings::Settings;

/// Entity type tag, used for filtering and sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    GunShip,
    ChaserShip,
    CarrierShip,
    /// Escort fragment released by a destroyed CarrierShip
    Fragment,
    Laser,
}

/// Ownership tag routing projectiles to the right collision group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// Life/death state shared by every body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    Alive,
    /// Explosion animation playing, seconds left
    Exploding { remaining: f32 },
    /// Animation finished
    Dead,
}

/// Position, motion and bounds shared by every entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub kind: EntityKind,
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    /// Unscaled sprite size
    pub base_size: Vec2,
    pub scale: f32,
    pub lifecycle: Lifecycle,
    /// Marked for removal at the end of the tick
    #[serde(default)]
    pub removed: bool,
}

impl Body {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, base_size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            base_size,
            scale: 1.0,
            lifecycle: Lifecycle::Alive,
            removed: false,
        }
    }

    /// Size on screen (base size times scale)
    #[inline]
    pub fn display_size(&self) -> Vec2 {
        self.base_size * self.scale
    }

    /// True once an explosion has started
    #[inline]
    pub fn is_dead(&self) -> bool {
        !matches!(self.lifecycle, Lifecycle::Alive)
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.display_size())
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Begin the explosion animation. Returns false if already dead.
    pub fn start_explosion(&mut self, duration: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.vel = Vec2::ZERO;
        self.lifecycle = if duration > 0.0 {
            Lifecycle::Exploding { remaining: duration }
        } else {
            Lifecycle::Dead
        };
        true
    }

    /// Advance the explosion animation
    pub fn advance_explosion(&mut self, dt: f32) {
        if let Lifecycle::Exploding { remaining } = self.lifecycle {
            let remaining = remaining - dt;
            self.lifecycle = if remaining <= 0.0 {
                Lifecycle::Dead
            } else {
                Lifecycle::Exploding { remaining }
            };
        }
    }

    /// Whether the center has left the playfield plus margin.
    ///
    /// One display size of margin left, right and below; four display
    /// heights above so enemies can enter from the top.
    pub fn out_of_bounds(&self, width: f32, height: f32) -> bool {
        let size = self.display_size();
        self.pos.x < -size.x
            || self.pos.x > width + size.x
            || self.pos.y < -size.y * TOP_MARGIN_HEIGHTS
            || self.pos.y > height + size.y
    }
}

/// A laser bolt. Constant velocity, no AI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub body: Body,
    pub faction: Faction,
}

impl Laser {
    pub fn new(id: u32, faction: Faction, pos: Vec2, vel: Vec2, size: Vec2) -> Self {
        let mut body = Body::new(id, EntityKind::Laser, pos, size);
        body.vel = vel;
        Self { body, faction }
    }

    /// Consumed by a hit or reaped
    #[inline]
    pub fn is_spent(&self) -> bool {
        self.body.removed
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Fire input was held on the previous tick
    pub is_shooting: bool,
    /// Cooldown counter, fires when it reaches `shoot_delay`
    pub shoot_tick: u32,
    pub shoot_delay: u32,
}

impl Player {
    pub fn new(id: u32, pos: Vec2, settings: &Settings) -> Self {
        let shoot_delay = settings.shoot_delay.max(1);
        Self {
            body: Body::new(id, EntityKind::Player, pos, settings.sizes.player),
            is_shooting: false,
            shoot_tick: shoot_delay - 1,
            shoot_delay,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.body.is_dead()
    }

    /// Start the death explosion; `play_fx` controls the explosion sound
    pub fn explode(
        &mut self,
        play_fx: bool,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if !self.body.start_explosion(settings.explosion_secs) {
            return false;
        }
        if play_fx {
            events.push(GameEvent::Explosion {
                id: self.body.id,
                kind: EntityKind::Player,
                pos: self.body.pos,
            });
        }
        true
    }

    /// Destroy hook, runs right after the player explodes
    pub fn on_destroy(&mut self, events: &mut Vec<GameEvent>) {
        log::info!("Player destroyed at ({:.1}, {:.1})", self.body.pos.x, self.body.pos.y);
        events.push(GameEvent::PlayerDestroyed);
    }
}

/// One parallax strip; purely cosmetic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundLayer {
    pub index: usize,
    /// Scroll speed (units/s, downward)
    pub speed: f32,
    /// Current scroll offset in `[0, strip_height)`
    pub offset: f32,
}

impl BackgroundLayer {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            speed: index as f32 * BACKGROUND_STAGGER,
            offset: 0.0,
        }
    }

    pub fn step(&mut self, dt: f32, strip_height: f32) {
        if strip_height <= 0.0 {
            return;
        }
        self.offset = (self.offset + self.speed * dt).rem_euclid(strip_height);
    }
}

/// Things that happened during a tick, for the host's audio and sprites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: u32, kind: EntityKind, pos: Vec2 },
    LaserFired { faction: Faction, pos: Vec2 },
    Explosion { id: u32, kind: EntityKind, pos: Vec2 },
    PlayerDestroyed,
}

/// Monotonic entity ID allocator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Default random source for `tick`
    pub rng: Pcg32,
    pub settings: Settings,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seconds accumulated toward the next spawn decision
    pub spawn_accumulator: f32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub player_lasers: Vec<Laser>,
    pub enemy_lasers: Vec<Laser>,
    pub backgrounds: Vec<BackgroundLayer>,
    /// Events since the host last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub ids: EntityIds,
}

impl GameState {
    /// Create a new game state with the given seed and default settings
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    pub fn with_settings(seed: u64, settings: Settings) -> Self {
        let mut ids = EntityIds::default();
        let spawn_pos = Vec2::new(
            settings.playfield_width * 0.5,
            settings.playfield_height * 0.9,
        );
        let player = Player::new(ids.next_id(), spawn_pos, &settings);

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            time_ticks: 0,
            spawn_accumulator: 0.0,
            player,
            enemies: Vec::new(),
            player_lasers: Vec::new(),
            enemy_lasers: Vec::new(),
            backgrounds: (0..BACKGROUND_LAYERS).map(BackgroundLayer::new).collect(),
            events: Vec::new(),
            ids,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next_id()
    }

    /// Enemies of the given kind, exploding ones included
    pub fn enemies_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(move |e| e.body.kind == kind)
    }

    pub fn count_enemies_of_kind(&self, kind: EntityKind) -> usize {
        self.enemies_of_kind(kind).count()
    }

    /// Hand accumulated events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

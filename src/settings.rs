//! Simulation settings and tuning
//!
//! Loaded from JSON by the host. Every field has a default, so partial
//! files are accepted.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::EntityKind;

/// Base (unscaled) sprite sizes, as reported by the host's display surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSizes {
    pub player: Vec2,
    pub gun_ship: Vec2,
    pub chaser_ship: Vec2,
    pub carrier_ship: Vec2,
    pub fragment: Vec2,
    pub player_laser: Vec2,
    pub enemy_laser: Vec2,
}

impl Default for SpriteSizes {
    fn default() -> Self {
        Self {
            player: Vec2::new(28.0, 21.0),
            gun_ship: Vec2::new(16.0, 16.0),
            chaser_ship: Vec2::new(16.0, 16.0),
            carrier_ship: Vec2::new(16.0, 16.0),
            fragment: Vec2::new(8.0, 8.0),
            player_laser: Vec2::new(4.0, 16.0),
            enemy_laser: Vec2::new(4.0, 16.0),
        }
    }
}

impl SpriteSizes {
    /// Base size for a given entity kind (lasers resolve by faction elsewhere)
    pub fn for_kind(&self, kind: EntityKind) -> Vec2 {
        match kind {
            EntityKind::Player => self.player,
            EntityKind::GunShip => self.gun_ship,
            EntityKind::ChaserShip => self.chaser_ship,
            EntityKind::CarrierShip => self.carrier_ship,
            EntityKind::Fragment => self.fragment,
            EntityKind::Laser => self.player_laser,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, Vec2)> {
        [
            ("sizes.player", self.player),
            ("sizes.gun_ship", self.gun_ship),
            ("sizes.chaser_ship", self.chaser_ship),
            ("sizes.carrier_ship", self.carrier_ship),
            ("sizes.fragment", self.fragment),
            ("sizes.player_laser", self.player_laser),
            ("sizes.enemy_laser", self.enemy_laser),
        ]
        .into_iter()
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    /// Playfield width (spawn x range and reaping bounds)
    pub playfield_width: f32,
    /// Playfield height
    pub playfield_height: f32,

    // === Spawning ===
    /// Seconds between spawn decisions
    pub spawn_interval_secs: f32,
    /// Maximum live ChaserShips
    pub chaser_cap: usize,

    // === Player ===
    /// Horizontal speed (units/s)
    pub player_speed: f32,
    /// Ticks the fire cooldown counts through between shots
    pub shoot_delay: u32,
    /// Player laser speed (units/s, travels up)
    pub player_laser_speed: f32,

    // === Enemies ===
    /// Enemy laser speed (units/s, travels down)
    pub enemy_laser_speed: f32,
    /// Seconds between GunShip shots
    pub gunship_fire_interval_secs: f32,
    /// Distance at which a ChaserShip starts homing
    pub chase_radius: f32,
    /// ChaserShip homing speed (units/s)
    pub chase_speed: f32,

    // === Effects ===
    /// Explosion animation length before the wreck is cleared
    pub explosion_secs: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    /// Base sprite sizes
    pub sizes: SpriteSizes,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playfield_width: 480.0,
            playfield_height: 640.0,

            spawn_interval_secs: 1.0,
            chaser_cap: 5,

            player_speed: 200.0,
            shoot_delay: 10,
            player_laser_speed: 200.0,

            enemy_laser_speed: 200.0,
            gunship_fire_interval_secs: 1.0,
            chase_radius: 320.0,
            chase_speed: 100.0,

            // 8 frames at 20 fps
            explosion_secs: 0.4,

            master_volume: 0.8,
            sfx_volume: 1.0,

            sizes: SpriteSizes::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.playfield_width > 0.0) {
            return Err(SettingsError::invalid("playfield_width", "must be positive"));
        }
        if !(self.playfield_height > 0.0) {
            return Err(SettingsError::invalid("playfield_height", "must be positive"));
        }
        if !(self.spawn_interval_secs > 0.0) {
            return Err(SettingsError::invalid("spawn_interval_secs", "must be positive"));
        }
        if !(self.gunship_fire_interval_secs > 0.0) {
            return Err(SettingsError::invalid(
                "gunship_fire_interval_secs",
                "must be positive",
            ));
        }
        if self.shoot_delay == 0 {
            return Err(SettingsError::invalid("shoot_delay", "must be at least 1"));
        }
        if self.explosion_secs < 0.0 {
            return Err(SettingsError::invalid("explosion_secs", "must not be negative"));
        }
        for (field, size) in self.sizes.iter() {
            if !(size.x > 0.0 && size.y > 0.0) {
                return Err(SettingsError::invalid(field, "width and height must be positive"));
            }
        }
        Ok(())
    }
}

/// Errors that can occur while loading settings
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: &'static str },
}

impl SettingsError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        SettingsError::Invalid { field, reason }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Settings parse error: {}", e),
            SettingsError::Invalid { field, reason } => {
                write!(f, "Invalid setting `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

//! Space Shooter - playfield simulation for a vertical scrolling arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, entity stepping, collisions, reaping)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `audio`: Maps simulation events onto a host-provided sound service

pub mod audio;
pub mod settings;
pub mod sim;

pub use audio::{AudioManager, AudioSink, SoundEffect};
pub use settings::{Settings, SettingsError, SpriteSizes};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per rendered frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Spawn policy: first draw at or above this picks a GunShip
    pub const GUNSHIP_THRESHOLD: i32 = 3;
    /// Spawn policy: second draw at or above this picks a ChaserShip
    pub const CHASER_THRESHOLD: i32 = 5;
    /// Upper bound (inclusive) of both spawn policy draws
    pub const SPAWN_DRAW_MAX: i32 = 10;
    /// Enemy scale is drawn as an integer in this range, times 0.1
    pub const SCALE_DRAW_MIN: i32 = 10;
    pub const SCALE_DRAW_MAX: i32 = 20;
    /// Enemy descent speed range (units/s)
    pub const DESCENT_SPEED_MIN: i32 = 50;
    pub const DESCENT_SPEED_MAX: i32 = 100;

    /// ChaserShip turns this many degrees per tick toward the player's side
    pub const CHASER_TURN_DEGREES: f32 = 5.0;

    /// Fragments released by a destroyed CarrierShip
    pub const CARRIER_FRAGMENTS: usize = 2;
    /// Fragment sideways drift (units/s, mirrored per fragment)
    pub const FRAGMENT_DRIFT: f32 = 40.0;
    /// Fragment descent speed (units/s)
    pub const FRAGMENT_DESCENT: f32 = 80.0;

    /// Parallax background strips
    pub const BACKGROUND_LAYERS: usize = 3;
    /// Scroll speed stagger between strips (units/s per index)
    pub const BACKGROUND_STAGGER: f32 = 10.0;

    /// Out-of-bounds margin above the playfield, in display heights
    pub const TOP_MARGIN_HEIGHTS: f32 = 4.0;
}

//! Audio bridge
//!
//! The simulation never plays sound itself. It records [`GameEvent`]s, and
//! the host drains them through an [`AudioManager`] into whatever backend
//! implements [`AudioSink`].

use crate::settings::Settings;
use crate::sim::{Faction, GameEvent, RandomSource};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player laser fired
    Laser,
    /// First explosion sample
    Explode0,
    /// Second explosion sample
    Explode1,
}

impl SoundEffect {
    /// Asset key the host uses to look the sample up
    pub fn asset_key(&self) -> &'static str {
        match self {
            SoundEffect::Laser => "sndLaser",
            SoundEffect::Explode0 => "sndExplode0",
            SoundEffect::Explode1 => "sndExplode1",
        }
    }
}

/// Host playback service. Fire-and-forget.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("play {} at {:.2}", effect.asset_key(), volume);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Take volumes from settings
    pub fn with_settings(sink: S, settings: &Settings) -> Self {
        let mut manager = Self::new(sink);
        manager.set_master_volume(settings.master_volume);
        manager.set_sfx_volume(settings.sfx_volume);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play the sounds for a batch of drained simulation events.
    ///
    /// Explosions pick one of the two samples at random.
    pub fn play_events(&mut self, events: &[GameEvent], rng: &mut impl RandomSource) {
        for event in events {
            if let Some(effect) = sound_for(event, rng) {
                self.play(effect);
            }
        }
    }
}

/// Which sound an event makes, if any. Enemy fire is silent.
pub fn sound_for(event: &GameEvent, rng: &mut impl RandomSource) -> Option<SoundEffect> {
    match event {
        GameEvent::LaserFired {
            faction: Faction::Player,
            ..
        } => Some(SoundEffect::Laser),
        GameEvent::Explosion { .. } => Some(if rng.between(0, 1) == 0 {
            SoundEffect::Explode0
        } else {
            SoundEffect::Explode1
        }),
        _ => None,
    }
}

//! Space Shooter headless runner
//!
//! Drives the simulation with a scripted autopilot the way a host
//! application would: variable frame times feed a fixed-step accumulator,
//! events are drained into the audio bridge after each frame.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use space_shooter::audio::LogSink;
use space_shooter::consts::*;
use space_shooter::sim::{Faction, GameEvent, GameState, TickInput, tick};
use space_shooter::{AudioManager, Settings};

#[derive(Parser, Debug)]
#[command(name = "space-shooter", about = "Run the playfield simulation headless")]
struct Args {
    /// Run seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Rendered frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u32,
    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Game instance holding all state
struct Game {
    state: GameState,
    audio: AudioManager<LogSink>,
    audio_rng: Pcg32,
    accumulator: f32,
    input: TickInput,
    kills: u32,
    shots: u32,
}

impl Game {
    fn new(seed: u64, settings: Settings) -> Self {
        let audio = AudioManager::with_settings(LogSink, &settings);
        Self {
            state: GameState::with_settings(seed, settings),
            audio,
            audio_rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            accumulator: 0.0,
            input: TickInput::default(),
            kills: 0,
            shots: 0,
        }
    }

    /// Sweep across the playfield, holding fire in bursts
    fn autopilot(&mut self) {
        let player = &self.state.player.body;
        let width = self.state.settings.playfield_width;
        if player.pos.x < width * 0.2 {
            self.input.left = false;
            self.input.right = true;
        } else if player.pos.x > width * 0.8 {
            self.input.right = false;
            self.input.left = true;
        } else if !self.input.left && !self.input.right {
            self.input.left = true;
        }
        self.input.fire = (self.state.time_ticks / 90) % 3 != 2;
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.autopilot();
            let input = self.input;
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        let events = self.state.drain_events();
        for event in &events {
            match event {
                GameEvent::Explosion { .. } => self.kills += 1,
                GameEvent::LaserFired {
                    faction: Faction::Player,
                    ..
                } => self.shots += 1,
                GameEvent::LaserFired { .. } => {}
                GameEvent::PlayerDestroyed => {
                    log::info!("Player down after {} ticks", self.state.time_ticks)
                }
                GameEvent::EnemySpawned { .. } => {}
            }
        }
        self.audio.play_events(&events, &mut self.audio_rng);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };

    log::info!("Starting run: seed={} frames={}", args.seed, args.frames);
    let mut game = Game::new(args.seed, settings);

    // Jittered frame times around 60 fps
    for frame in 0..args.frames {
        let jitter = if frame % 7 == 0 { 0.004 } else { -0.0005 };
        game.update(SIM_DT + jitter);
    }

    let state = &game.state;
    println!(
        "ticks={} enemies={} enemy_lasers={} player_lasers={} \
         explosions={} shots={} player_dead={}",
        state.time_ticks,
        state.enemies.len(),
        state.enemy_lasers.len(),
        state.player_lasers.len(),
        game.kills,
        game.shots,
        state.player.is_dead(),
    );
}

//! VoV - a scrolling asteroid-dodging arcade game
//!
//! Core modules:
//! - `sim`: Simulation (physics, spawning, collisions, particles, game state)
//! - `renderer`: Draw-call abstraction and sprite rect computation
//! - `audio`: Sound sink abstraction and event-to-sound mapping
//! - `platform`: Time and input collaborators
//! - `persistence`: JSON save/load for settings and scores
//! - `screens` / `scene`: Screen stack and the per-frame orchestrator

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod screens;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use scene::Scene;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Milliseconds in one simulation tick (1/20th of a second at unit speed)
    pub const TICK_MS: f64 = 50.0;
    /// Ticks per second at unit game speed
    pub const TICKS_PER_SECOND: f64 = 20.0;

    /// Small margin that keeps coordinates off the exact viewport edges
    pub const SMIDGE: f64 = 0.0001;

    /// Number of state columns in the ship and power-up sprite strips
    pub const STATE_FRAMES: u32 = 6;

    /// Rocks at least this wide use the large explosion strip
    pub const LARGE_EXPLOSION_WIDTH: f64 = 48.0;

    /// Extra clip margin for power-ups (right, top and bottom edges)
    pub const POW_UP_CLIP_MARGIN: f64 = 100.0;

    /// Speed of bang-dot bursts (px/tick)
    pub const BANG_SPEED: f64 = 45.0;

    /// Bang dots emitted per pixel of a dying rock / ship
    pub const ROCK_BANG_PASSES: u32 = 5;
    pub const SHIP_BANG_PASSES: u32 = 10;

    /// Rock life per pixel of sprite area
    pub const ROCK_LIFE_PER_PIXEL: f64 = 300.0;

    /// Game state timers count down this many times faster than ticks
    pub const GAME_TIMER_RATE: f64 = 3.0;
}

/// Convert seconds to simulation ticks at the given game speed
#[inline]
pub fn ticks_from_seconds(seconds: f64, game_speed: f64) -> f64 {
    seconds * consts::TICKS_PER_SECOND * game_speed
}

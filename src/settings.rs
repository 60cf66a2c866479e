//! Game settings and tunables
//!
//! Everything the simulation reads lives here. The simulation never writes
//! to `Settings`; temporary power-up overrides go through
//! [`crate::sim::Modifiers`].

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError};

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio / HUD ===
    pub music_enabled: bool,
    pub sounds_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub show_fps: bool,
    /// Frame-rate cap
    pub max_fps: u32,

    // === Viewport ===
    pub win_width: f64,
    pub win_height: f64,

    // === Ship & camera ===
    /// Base scroll speed (px/tick)
    pub barrier_speed: f64,
    /// Ship restitution off the screen edges
    pub bounciness: f64,
    /// Ship acceleration while a thruster fires (px/tick²)
    pub thruster_strength: f64,
    /// Ship speed clamp while thrusting
    pub max_ship_speed: f64,
    pub ship_lives: u32,

    // === Rocks ===
    /// Upper bound on distinct rock sprites
    pub n_rock_prototypes: usize,
    /// Rock pool capacity
    pub max_rocks: usize,
    /// Animation frames per rock / explosion strip
    pub n_frames: u32,
    pub initial_rocks: u32,
    pub final_rocks: u32,
    /// Ticks to ramp from `initial_rocks` to `final_rocks`
    pub rock_ramp_ticks: f64,
    /// Ticks for a speed-1 rock to cross the screen horizontally
    pub kh: f64,
    /// Ticks for a speed-1 rock to cross the screen vertically
    pub kv: f64,
    /// Rock dx jitter range (+/-)
    pub rdx: f64,
    /// Rock dy jitter range (+/-)
    pub rdy: f64,

    // === Power-ups ===
    /// Power-up pool capacity
    pub max_pow_ups: usize,
    /// Milliseconds between power-up attempts
    pub pow_ups_timeout: f64,
    /// Milliseconds a power mode lasts
    pub pow_up_state_timeout: f64,
    /// Initial banner scale after a pickup
    pub pow_up_text_scale: f64,
    /// Banner fade time (ms)
    pub pow_up_text_timeout: f64,
    /// Multiplier on the engine-dot budget in EngineBlast
    pub engine_blast_factor: f64,
    /// Multiplier on game speed in Slowdown
    pub slowdown_factor: f64,

    // === Speed ===
    pub game_speed: f64,

    // === Dust ===
    pub max_dust_depth: f64,
    pub n_dust_motes: usize,
    pub n_dust_groups: usize,

    // === Dots ===
    pub max_ship_dots: usize,
    pub n_ship_dot_groups: usize,
    pub max_bang_dots: usize,
    pub n_bang_dot_groups: usize,
    /// Engine dots per thruster per frame
    pub engine_dots: usize,
    /// Heat palette ramp width and peak channel value
    pub heat_width: u32,
    pub heat_max: u32,
    /// How hard dots push rocks; 0 disables pushing
    pub dot_mass_unit: f64,

    // === Timers ===
    /// Dead-pause length (game timer units)
    pub dead_pause_length: f64,
    /// Invincibility after respawn (ms)
    pub invincible_pause_length: f64,
    /// Game-over length (game timer units)
    pub game_over_length: f64,
    /// Score table length
    pub n_scores: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_enabled: true,
            sounds_enabled: true,
            master_volume: 0.8,
            show_fps: false,
            max_fps: 60,

            win_width: 1024.0,
            win_height: 640.0,

            barrier_speed: 7.5,
            bounciness: 0.5,
            thruster_strength: 1.2,
            max_ship_speed: 50.0,
            ship_lives: 4,

            n_rock_prototypes: 65,
            max_rocks: 130,
            n_frames: 16,
            initial_rocks: 8,
            final_rocks: 25,
            rock_ramp_ticks: 2.0 * 60.0 * 20.0,
            kh: 32.0 * 20.0,
            kv: 24.0 * 20.0,
            rdx: 2.5,
            rdy: 2.5,

            max_pow_ups: 30,
            pow_ups_timeout: 3000.0,
            pow_up_state_timeout: 10000.0,
            pow_up_text_scale: 2.5,
            pow_up_text_timeout: 1000.0,
            engine_blast_factor: 3.0,
            slowdown_factor: 0.5,

            game_speed: 1.0,

            max_dust_depth: 1.0,
            n_dust_motes: 1500,
            n_dust_groups: 15,

            max_ship_dots: 1500,
            n_ship_dot_groups: 5,
            max_bang_dots: 1500,
            n_bang_dot_groups: 10,
            engine_dots: 1000,
            heat_width: 100,
            heat_max: 255,
            dot_mass_unit: 0.07,

            dead_pause_length: 40.0,
            invincible_pause_length: 2000.0,
            game_over_length: 250.0,
            n_scores: 8,
        }
    }
}

impl Settings {
    /// Viewport size as a vector
    pub fn window(&self) -> DVec2 {
        DVec2::new(self.win_width, self.win_height)
    }

    /// Horizontal point the camera keeps the ship centred on
    pub fn x_scroll_to(&self) -> f64 {
        self.win_width / 3.0
    }

    /// Vertical point the camera keeps the ship centred on
    pub fn y_scroll_to(&self) -> f64 {
        self.win_height / 2.0
    }

    /// Furthest the camera may run ahead of the barrier
    pub fn max_dist_ahead(&self) -> f64 {
        self.win_width
    }

    /// Target frame length in milliseconds
    pub fn frame_ms(&self) -> u32 {
        if self.max_fps == 0 {
            0
        } else {
            1000 / self.max_fps
        }
    }

    /// Load settings from a JSON file
    pub fn load_from(path: &Path) -> Result<Self, PersistError> {
        persistence::load_json(path)
    }

    /// Load settings, falling back to defaults when missing or corrupt
    pub fn load_or_default(path: &Path) -> Self {
        persistence::load_json_or_default(path)
    }

    /// Save settings to a JSON file
    pub fn save_to(&self, path: &Path) -> Result<(), PersistError> {
        persistence::save_json(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

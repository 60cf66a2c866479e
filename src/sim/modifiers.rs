//! Temporary overrides applied by power modes
//!
//! Slowdown scales the game speed and EngineBlast scales the engine-dot
//! budget. Both are applied when the mode is entered and dropped when it
//! ends or the ship dies; `Settings` itself is never written.

use super::entity::PowerMode;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifiers {
    speed_factor: f64,
    dots_factor: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            speed_factor: 1.0,
            dots_factor: 1.0,
        }
    }
}

impl Modifiers {
    /// Apply whatever override `mode` carries
    pub fn enter(&mut self, mode: PowerMode, settings: &Settings) {
        match mode {
            PowerMode::Slowdown => self.speed_factor = settings.slowdown_factor,
            PowerMode::EngineBlast => self.dots_factor = settings.engine_blast_factor,
            _ => {}
        }
    }

    /// Drop the override `mode` applied
    pub fn exit(&mut self, mode: PowerMode) {
        match mode {
            PowerMode::Slowdown => self.speed_factor = 1.0,
            PowerMode::EngineBlast => self.dots_factor = 1.0,
            _ => {}
        }
    }

    /// Drop every override
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }

    /// Effective game speed
    pub fn game_speed(&self, settings: &Settings) -> f64 {
        settings.game_speed * self.speed_factor
    }

    /// Effective engine-dot budget, never more than the pool holds
    pub fn engine_dots(&self, settings: &Settings) -> usize {
        let budget = (settings.engine_dots as f64 * self.dots_factor).round() as usize;
        budget.min(settings.max_ship_dots)
    }
}

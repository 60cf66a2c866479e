//! Scroll camera
//!
//! The viewport moves at `scroll` px/tick. It chases the ship like a damped
//! spring so the ship settles at (`x_scroll_to`, `y_scroll_to`), and it never
//! falls behind the barrier: a virtual wall advancing at `barrier_speed`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::settings::Settings;
use crate::ticks_from_seconds;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Viewport velocity (px/tick)
    pub scroll: DVec2,
    /// How far the viewport is ahead of the barrier
    pub dist_ahead: f64,
}

impl Camera {
    pub fn new(barrier_speed: f64) -> Self {
        Self {
            scroll: DVec2::new(barrier_speed, 0.0),
            dist_ahead: 0.0,
        }
    }

    /// Pull the scroll toward the ship, then apply the barrier taper
    pub fn track(&mut self, ship: &Entity, dt: f64, game_speed: f64, settings: &Settings) {
        let target = DVec2::new(settings.x_scroll_to(), settings.y_scroll_to());
        let centre = ship.pos + ship.size() * 0.5;
        let pull = (centre + ship.vel * dt - target) / 25.0 + (ship.vel - self.scroll);
        self.scroll += pull * dt / 12.0;

        // If the barrier would catch up in under 2 seconds, stretch it to 2
        let horizon = ticks_from_seconds(2.0, game_speed);
        let barrier = settings.barrier_speed;
        if horizon > 0.0 && self.dist_ahead + (self.scroll.x - barrier) * horizon < 0.0 {
            self.scroll.x = barrier - self.dist_ahead / horizon;
        }
        self.dist_ahead += (self.scroll.x - barrier) * dt;
        let max_ahead = settings.max_dist_ahead();
        if max_ahead >= 0.0 {
            self.dist_ahead = self.dist_ahead.min(max_ahead);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mask::SpriteId;

    fn ship_at(pos: DVec2, vel: DVec2) -> Entity {
        let mut ship = Entity::ship(SpriteId(0), 40.0, 20.0, 4);
        ship.pos = pos;
        ship.vel = vel;
        ship
    }

    #[test]
    fn test_settled_ship_keeps_scroll() {
        let settings = Settings::default();
        let mut camera = Camera::new(settings.barrier_speed);
        // Centred on the target and moving with the camera
        let pos = DVec2::new(settings.x_scroll_to() - 20.0, settings.y_scroll_to() - 10.0);
        let vel = DVec2::new(settings.barrier_speed, 0.0);
        let ship = ship_at(pos - vel * 1.0, vel);
        camera.track(&ship, 1.0, 1.0, &settings);
        assert!((camera.scroll.x - settings.barrier_speed).abs() < 1e-9);
        assert!(camera.scroll.y.abs() < 1e-9);
    }

    #[test]
    fn test_ship_ahead_speeds_scroll_up() {
        let settings = Settings::default();
        let mut camera = Camera::new(settings.barrier_speed);
        let ship = ship_at(DVec2::new(800.0, 310.0), DVec2::new(12.0, 0.0));
        camera.track(&ship, 1.0, 1.0, &settings);
        assert!(camera.scroll.x > settings.barrier_speed);
        assert!(camera.dist_ahead > 0.0);
    }

    #[test]
    fn test_barrier_taper_limits_backing_off() {
        let settings = Settings::default();
        let mut camera = Camera::new(settings.barrier_speed);
        camera.dist_ahead = 40.0;
        // Ship far behind and flying backwards
        let ship = ship_at(DVec2::new(0.0, 310.0), DVec2::new(-50.0, 0.0));
        camera.track(&ship, 1.0, 1.0, &settings);
        assert!((camera.scroll.x - (settings.barrier_speed - 40.0 / 40.0)).abs() < 1e-9);
        assert!(camera.dist_ahead >= 0.0);
    }

    #[test]
    fn test_dist_ahead_capped() {
        let settings = Settings::default();
        let mut camera = Camera::new(settings.barrier_speed);
        camera.dist_ahead = settings.max_dist_ahead() - 1.0;
        let ship = ship_at(DVec2::new(1000.0, 310.0), DVec2::new(50.0, 0.0));
        camera.track(&ship, 1.0, 1.0, &settings);
        assert_eq!(camera.dist_ahead, settings.max_dist_ahead());
    }
}

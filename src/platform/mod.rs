//! Platform abstraction layer
//!
//! Handles the collaborators the game core polls each frame:
//! - Time (milliseconds, frame-cap sleep)
//! - Input (held directions, pause, quit)
//!
//! The core never reads devices itself; a windowing front end implements
//! these traits, and the headless binary uses [`SystemTimeSource`] plus a
//! scripted input.

use std::time::{Duration, Instant};

/// Held direction keys (or stick/touch zones) this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directions {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Directions {
    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// One frame of polled input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub directions: Directions,
    /// Pause toggle pressed this frame
    pub pause: bool,
    /// Confirm / start pressed this frame (menus)
    pub confirm: bool,
    /// Back / quit pressed this frame
    pub back: bool,
}

pub trait TimeSource {
    /// Monotonic milliseconds
    fn now_ms(&self) -> u64;
    fn sleep_ms(&mut self, ms: u64);
}

pub trait InputSource {
    /// Current input state; called once per frame
    fn poll(&mut self) -> InputState;
}

/// Wall-clock time backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}

/// Deterministic time that only advances when slept (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now_ms: u64,
}

impl ManualTimeSource {
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_time_advances_on_sleep() {
        let mut time = ManualTimeSource::default();
        time.sleep_ms(16);
        time.advance(4);
        assert_eq!(time.now_ms(), 20);
    }

    #[test]
    fn test_directions_any() {
        assert!(!Directions::default().any());
        let dirs = Directions {
            up: true,
            ..Directions::default()
        };
        assert!(dirs.any());
    }
}

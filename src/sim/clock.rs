//! Pausable simulation clock and per-frame timing
//!
//! The clock is fed wall-clock milliseconds by its owner; it never reads the
//! system time itself. While paused, elapsed time is frozen, so frames
//! started during a pause carry zero ticks.

use serde::{Deserialize, Serialize};

use crate::consts::TICK_MS;

/// Timing of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Movement scale for this frame: `game_speed * delta_ms / 50`
    pub ticks: f64,
    /// Clock milliseconds since the previous frame started
    pub delta_ms: f64,
    /// Clock milliseconds since `start`
    pub elapsed_ms: u64,
}

impl Frame {
    /// A frame with an explicit delta (tests and fixed-step runs)
    pub fn fixed(delta_ms: f64, game_speed: f64, elapsed_ms: u64) -> Self {
        Self {
            ticks: game_speed * delta_ms / TICK_MS,
            delta_ms,
            elapsed_ms,
        }
    }

    /// True when nothing should move this frame
    pub fn is_still(&self) -> bool {
        self.ticks <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum ClockState {
    #[default]
    Stopped,
    Running {
        start_ms: u64,
    },
    Paused {
        elapsed_ms: u64,
    },
}

/// Start → pause/unpause → stop lifecycle plus frame bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationClock {
    state: ClockState,
    last_frame_ms: Option<u64>,
    frames: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_ms: u64) {
        self.state = ClockState::Running { start_ms: now_ms };
        self.last_frame_ms = None;
        self.frames = 0;
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.last_frame_ms = None;
    }

    pub fn pause(&mut self, now_ms: u64) {
        if let ClockState::Running { start_ms } = self.state {
            self.state = ClockState::Paused {
                elapsed_ms: now_ms.saturating_sub(start_ms),
            };
            log::debug!("Clock paused");
        }
    }

    pub fn unpause(&mut self, now_ms: u64) {
        if let ClockState::Paused { elapsed_ms } = self.state {
            self.state = ClockState::Running {
                start_ms: now_ms.saturating_sub(elapsed_ms),
            };
            log::debug!("Clock resumed");
        }
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.state, ClockState::Stopped)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, ClockState::Paused { .. })
    }

    /// Milliseconds since start, frozen while paused, zero when stopped
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            ClockState::Stopped => 0,
            ClockState::Running { start_ms } => now_ms.saturating_sub(start_ms),
            ClockState::Paused { elapsed_ms } => elapsed_ms,
        }
    }

    /// Unpaused frames completed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Begin a frame. The delta is measured between consecutive frame
    /// starts, so it includes any cap sleep of the previous frame.
    pub fn start_frame(&mut self, now_ms: u64, game_speed: f64) -> Frame {
        let elapsed = self.elapsed_ms(now_ms);
        let delta = match self.last_frame_ms {
            Some(prev) => elapsed.saturating_sub(prev),
            None => 0,
        };
        self.last_frame_ms = Some(elapsed);
        Frame::fixed(delta as f64, game_speed, elapsed)
    }

    /// Finish a frame. Returns how long to sleep to honor `frame_ms`.
    pub fn end_frame(&mut self, frame: &Frame, now_ms: u64, frame_ms: u32) -> u64 {
        if !self.is_paused() {
            self.frames += 1;
        }
        let spent = self.elapsed_ms(now_ms).saturating_sub(frame.elapsed_ms);
        (frame_ms as u64).saturating_sub(spent)
    }

    /// Average frames per second since start
    pub fn fps(&self, now_ms: u64) -> f64 {
        let elapsed = self.elapsed_ms(now_ms);
        if elapsed == 0 {
            0.0
        } else {
            self.frames as f64 / (elapsed as f64 / 1000.0)
        }
    }
}

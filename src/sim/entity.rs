//! Movable, drawable, collidable objects
//!
//! One flat struct covers the ship, rocks, power-ups and scenery. Fields that
//! only matter to one kind (`life`, `direction`, `lives`, `state`) are kept
//! inline so the collision code can treat every kind uniformly.

use std::ops::{BitOr, BitOrAssign};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::mask::SpriteId;
use crate::consts::ROCK_LIFE_PER_PIXEL;

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Ship,
    Rock,
    PowUp,
    /// Massless scenery and effects
    Particle,
}

/// Behaviour bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const MOVE: Flags = Flags(1);
    pub const DRAW: Flags = Flags(2);
    pub const COLLIDE: Flags = Flags(4);
    pub const ALL: Flags = Flags(1 | 2 | 4);

    #[inline]
    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

/// Which way a rock's animation strip plays (also flips its hit mask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpinDirection {
    #[default]
    Forward,
    Reverse,
}

impl SpinDirection {
    pub fn flipped(self) -> Self {
        match self {
            SpinDirection::Forward => SpinDirection::Reverse,
            SpinDirection::Reverse => SpinDirection::Forward,
        }
    }
}

/// Ship power mode, also used as the power-up flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum PowerMode {
    /// Ordinary ship; as a power-up flavour this is the extra life
    #[default]
    Plain,
    Invincible,
    EngineBlast,
    Shields,
    Attack,
    Slowdown,
}

impl PowerMode {
    pub const ALL: [PowerMode; 6] = [
        PowerMode::Plain,
        PowerMode::Invincible,
        PowerMode::EngineBlast,
        PowerMode::Shields,
        PowerMode::Attack,
        PowerMode::Slowdown,
    ];

    /// Column in the ship / power-up sprite strip
    pub fn column(self) -> u32 {
        self as u32
    }

    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerMode::Plain => "Life",
            PowerMode::Invincible => "Invincible",
            PowerMode::EngineBlast => "Engine Blast",
            PowerMode::Shields => "Shields",
            PowerMode::Attack => "Attack",
            PowerMode::Slowdown => "Slowdown",
        }
    }
}

/// A simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub flags: Flags,
    pub pos: DVec2,
    pub vel: DVec2,
    size: DVec2,
    pub active: bool,
    pub sprite: SpriteId,
    /// Current animation frame (rocks)
    pub frame: u32,
    /// Damage budget (rocks)
    pub life: i64,
    /// Animation / orbit direction (rocks)
    pub direction: SpinDirection,
    /// Remaining lives (ship)
    pub lives: u32,
    /// Power mode (ship) or flavour (power-up)
    pub state: PowerMode,
    /// Explosion animation frame while one is playing
    pub explosion: Option<u32>,
}

impl Entity {
    fn new(kind: EntityKind, sprite: SpriteId, width: f64, height: f64) -> Self {
        Self {
            kind,
            flags: Flags::ALL,
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            size: DVec2::new(width, height),
            active: false,
            sprite,
            frame: 0,
            life: 0,
            direction: SpinDirection::Forward,
            lives: 0,
            state: PowerMode::Plain,
            explosion: None,
        }
    }

    /// The player's ship, active and fully interactive
    pub fn ship(sprite: SpriteId, width: f64, height: f64, lives: u32) -> Self {
        let mut ship = Self::new(EntityKind::Ship, sprite, width, height);
        ship.active = true;
        ship.lives = lives;
        ship
    }

    /// A fresh rock with full life, not yet placed or activated
    pub fn rock(sprite: SpriteId, width: f64, height: f64, direction: SpinDirection) -> Self {
        let mut rock = Self::new(EntityKind::Rock, sprite, width, height);
        rock.direction = direction;
        rock.life = (width * height * ROCK_LIFE_PER_PIXEL) as i64;
        rock
    }

    /// An inactive power-up of the given flavour
    pub fn pow_up(sprite: SpriteId, width: f64, height: f64, flavour: PowerMode) -> Self {
        let mut pow_up = Self::new(EntityKind::PowUp, sprite, width, height);
        pow_up.state = flavour;
        pow_up
    }

    /// Draw-only scenery (fog layers)
    pub fn scenery(sprite: SpriteId, width: f64, height: f64) -> Self {
        let mut scenery = Self::new(EntityKind::Particle, sprite, width, height);
        scenery.flags = Flags::DRAW;
        scenery.active = true;
        scenery
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.size.y
    }

    #[inline]
    pub fn size(&self) -> DVec2 {
        self.size
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.pos + self.size * 0.5
    }

    /// Mass used by bounces and pushes; a pure function of kind and extent
    pub fn mass(&self) -> f64 {
        match self.kind {
            EntityKind::Ship | EntityKind::PowUp => self.size.x * self.size.y,
            EntityKind::Rock => 3.0 * self.size.x * self.size.y,
            EntityKind::Particle => 0.0,
        }
    }

    #[inline]
    pub fn is_collidable(&self) -> bool {
        self.flags.contains(Flags::COLLIDE)
    }

    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.flags.contains(Flags::DRAW)
    }

    #[inline]
    pub fn is_movable(&self) -> bool {
        self.flags.contains(Flags::MOVE)
    }

    /// Advance position by `dt` ticks relative to the scrolling viewport
    pub fn integrate(&mut self, scroll: DVec2, dt: f64) {
        if !self.active || !self.is_movable() {
            return;
        }
        self.pos += (self.vel - scroll) * dt;
    }

    /// Strip every behaviour and start the explosion animation
    pub fn kill(&mut self) {
        self.flags = Flags::NONE;
        self.explosion = Some(0);
    }

    /// Step the explosion animation by one frame.
    ///
    /// A rock whose explosion finishes keeps drifting (invisible, harmless)
    /// until it is clipped.
    pub fn advance_explosion(&mut self, n_frames: u32) {
        let Some(frame) = self.explosion else {
            return;
        };
        if frame + 1 >= n_frames {
            if self.kind == EntityKind::Rock {
                self.flags = Flags::MOVE;
            }
            self.explosion = None;
        } else {
            self.explosion = Some(frame + 1);
        }
    }

    /// Update the rock animation frame from elapsed milliseconds
    pub fn animate(&mut self, elapsed_ms: u64, n_frames: u32) {
        if self.kind == EntityKind::Rock && n_frames > 0 {
            self.frame = ((elapsed_ms / 50) % n_frames as u64) as u32;
        }
    }

    /// Column of the sprite strip currently shown
    pub fn sheet_column(&self, n_frames: u32) -> u32 {
        match self.kind {
            EntityKind::Rock => {
                let n = n_frames.max(1);
                let frame = self.frame % n;
                match self.direction {
                    SpinDirection::Forward => frame,
                    SpinDirection::Reverse => n - 1 - frame,
                }
            }
            EntityKind::Ship | EntityKind::PowUp => self.state.column(),
            EntityKind::Particle => 0,
        }
    }

    /// True once a rock has fully left the viewport
    pub fn is_off_screen(&self, win: DVec2) -> bool {
        self.pos.x < -self.size.x
            || self.pos.x >= win.x
            || self.pos.y < -self.size.y
            || self.pos.y >= win.y
    }
}

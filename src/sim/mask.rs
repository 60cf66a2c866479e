//! Opaque-pixel masks used for pixel-accurate hit testing
//!
//! Images come from outside the simulation; all the collision engine needs is
//! one bit per pixel saying "fully opaque". Sprite sheets are horizontal
//! strips of equally sized frames.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle shared by the renderer and the mask atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpriteId(pub usize);

#[derive(Error, Debug)]
pub enum MaskError {
    #[error("RGBA buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BadBufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Mask has zero area")]
    Empty,
}

/// One opacity bit per pixel, row-major
#[derive(Debug, Clone)]
pub struct PixelMask {
    width: u32,
    height: u32,
    opaque: Vec<bool>,
}

impl PixelMask {
    /// Build from 8-bit RGBA pixels; only alpha == 255 counts as opaque
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, MaskError> {
        if width == 0 || height == 0 {
            return Err(MaskError::Empty);
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(MaskError::BadBufferLength {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        let opaque = rgba.chunks_exact(4).map(|px| px[3] == u8::MAX).collect();
        Ok(Self {
            width,
            height,
            opaque,
        })
    }

    /// Build from a predicate over pixel coordinates
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let mut opaque = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                opaque.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            opaque,
        }
    }

    /// Fully opaque rectangle
    pub fn solid(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Opacity at sheet coordinates; anything outside the sheet is transparent
    #[inline]
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.opaque[y as usize * self.width as usize + x as usize]
    }
}

/// All masks known to the simulation, indexed by `SpriteId`
#[derive(Debug, Clone, Default)]
pub struct MaskAtlas {
    masks: Vec<PixelMask>,
}

impl MaskAtlas {
    pub fn new() -> Self {
        Self { masks: Vec::new() }
    }

    /// Register a mask and return its handle
    pub fn insert(&mut self, mask: PixelMask) -> SpriteId {
        self.masks.push(mask);
        SpriteId(self.masks.len() - 1)
    }

    pub fn get(&self, id: SpriteId) -> Option<&PixelMask> {
        self.masks.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

/// Sprite handles the simulation needs for spawning and drawing
#[derive(Debug, Clone, Default)]
pub struct SpriteSet {
    /// Ship strip, one column per power mode
    pub ship: SpriteId,
    /// Thrust glow around the ship
    pub ship_glow: Option<SpriteId>,
    /// Power-up strip, one column per flavour
    pub pow_up: SpriteId,
    /// Animated glow behind power-ups
    pub pow_up_glow: Option<SpriteId>,
    /// Rock strips, one per prototype
    pub rocks: Vec<SpriteId>,
    /// Explosion strips
    pub explosion_large: Option<SpriteId>,
    pub explosion_small: Option<SpriteId>,
    /// Fog backgrounds (one is picked per game)
    pub backgrounds: Vec<SpriteId>,
    /// Power-up name banners, indexed by flavour column
    pub banners: Vec<SpriteId>,
}

//! Collision detection and response
//!
//! Detection is pixel-exact: a cheap bounding-box reject, then a scan of the
//! overlap for a pixel that is opaque in both sprites. Response is either an
//! elastic bounce along the line between centres, or the asymmetric
//! push/damage model used by dots and rocks.

use glam::DVec2;

use super::entity::{Entity, EntityKind};
use super::mask::MaskAtlas;

/// Integer screen rectangle (sprite positions truncate toward zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covered by an entity
    pub fn of(entity: &Entity) -> Self {
        Self {
            x: entity.pos.x as i64,
            y: entity.pos.y as i64,
            w: entity.width() as i64,
            h: entity.height() as i64,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Overlapping area, if any
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w).min(other.x + other.w);
        let y1 = (self.y + self.h).min(other.y + other.h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// Opacity of `entity` at a world pixel, honoring sprite strips (rock
/// animation frames, ship and power-up state columns).
///
/// An entity without a registered mask counts as a solid box.
fn opaque_at(entity: &Entity, rect: &PixelRect, wx: i64, wy: i64, masks: &MaskAtlas, n_frames: u32) -> bool {
    let Some(mask) = masks.get(entity.sprite) else {
        return true;
    };
    let mut x = wx - rect.x;
    let y = wy - rect.y;
    let columns = mask.width() as i64 / rect.w.max(1);
    if columns > 1 && entity.kind != EntityKind::Particle {
        x += rect.w * (entity.sheet_column(n_frames) as i64 % columns);
    }
    mask.is_opaque(x, y)
}

/// Pixel-exact overlap test between two collidable entities
pub fn collide(a: &Entity, b: &Entity, masks: &MaskAtlas, n_frames: u32) -> bool {
    if !a.is_collidable() || !b.is_collidable() {
        return false;
    }
    let a_rect = PixelRect::of(a);
    let b_rect = PixelRect::of(b);
    let Some(overlap) = a_rect.intersect(&b_rect) else {
        return false;
    };
    for wy in overlap.y..overlap.y + overlap.h {
        for wx in overlap.x..overlap.x + overlap.w {
            if opaque_at(a, &a_rect, wx, wy, masks, n_frames)
                && opaque_at(b, &b_rect, wx, wy, masks, n_frames)
            {
                return true;
            }
        }
    }
    false
}

/// Elastic two-body bounce along the line joining the centres.
///
/// Only the velocity components along that line change. Bodies already
/// separating are left alone, as are bodies sharing a centre.
pub fn bounce(a: &mut Entity, b: &mut Entity) {
    let axis = b.center() - a.center();
    let dist = axis.length();
    if dist <= 0.0 || !dist.is_finite() {
        return;
    }
    let unit = axis / dist;

    let va = unit.dot(a.vel);
    let vb = unit.dot(b.vel);
    if vb - va > 0.0 {
        return;
    }

    let ma = a.mass();
    let mb = b.mass();
    if ma + mb <= 0.0 {
        return;
    }
    let vc = (va * ma + vb * mb) / (ma + mb);

    a.vel += 2.0 * unit * (vc - va);
    b.vel += 2.0 * unit * (vc - vb);
}

/// Nudge `target` toward the pusher's velocity, weighted by the mass ratio
pub fn push(target: &mut Entity, pusher_vel: DVec2, pusher_mass: f64, mass_unit: f64) {
    let mass = target.mass();
    if mass <= 0.0 {
        return;
    }
    target.vel += mass_unit * pusher_mass * (pusher_vel - target.vel) / mass;
}

/// Take life from `target` by the squared relative speed of the striker
pub fn fry(target: &mut Entity, striker_vel: DVec2, multiplier: f64) {
    let rel = striker_vel - target.vel;
    target.life -= (rel.length_squared() * multiplier) as i64;
}

/// Whether a one-pixel dot at `point` touches a collidable entity's box
pub fn point_hits(point: DVec2, entity: &Entity) -> bool {
    if !entity.is_collidable() {
        return false;
    }
    let dot = PixelRect::new(point.x as i64, point.y as i64, 1, 1);
    dot.intersect(&PixelRect::of(entity)).is_some()
}

/// Two distinct mutable elements of a slice
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i != j);
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

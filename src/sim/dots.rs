//! Particle "dots": engine exhaust and explosion debris
//!
//! Dots live in two fixed pools. Engine dots refill any inactive slot within
//! the current budget each frame a thruster fires; bang dots are written
//! round-robin, so a big explosion recycles the oldest debris. Each pool is
//! split into colour groups drawn with one colour from the heat palette.
//!
//! Dots are massive: they push power-ups and rocks, and bang dots (or engine
//! dots during EngineBlast) burn rock life.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{fry, point_hits, push};
use super::entity::Entity;
use super::physics::{clip, frnd};
use super::spawner::{PowUpField, RockField};
use crate::consts::{BANG_SPEED, ROCK_BANG_PASSES, SHIP_BANG_PASSES};
use crate::settings::Settings;

/// Engine exhaust decay rate
const ENGINE_DECAY: f64 = 3.5;

/// Extra burn applied by engine dots in EngineBlast
const ENGINE_BLAST_BURN: f64 = 1.5;

/// Sideways offset of each thruster nozzle, in half ship extents
const NOZZLE: [f64; 4] = [2.0, 1.0, 0.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotKind {
    Engine,
    Bang,
}

/// Thruster bitmask: bit 0 left, bit 1 down, bit 2 right, bit 3 up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Jets(pub u8);

impl Jets {
    pub const LEFT: u8 = 1 << 0;
    pub const DOWN: u8 = 1 << 1;
    pub const RIGHT: u8 = 1 << 2;
    pub const UP: u8 = 1 << 3;

    #[inline]
    pub fn bit(self, dir: usize) -> f64 {
        ((self.0 >> dir) & 1) as f64
    }

    #[inline]
    pub fn fires(self, dir: usize) -> bool {
        self.0 & (1 << dir) != 0
    }

    #[inline]
    pub fn any(self) -> bool {
        self.0 != 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dot {
    pub pos: DVec2,
    pub vel: DVec2,
    pub mass: f64,
    /// Mass lost per tick
    pub decay: f64,
    pub active: bool,
}

impl Dot {
    /// Move and decay; returns whether the dot is still alive
    fn step(&mut self, scroll: DVec2, dt: f64, win: DVec2) -> bool {
        self.pos += (self.vel - scroll) * dt;
        self.mass -= dt * self.decay;
        if self.mass < 0.0 || clip(self.pos.x, win.x) || clip(self.pos.y, win.y) {
            self.active = false;
        }
        self.active
    }
}

/// Black → red → yellow → white ramp, `3 * width` entries
pub fn heat_palette(width: u32, max: u32) -> Vec<[u8; 4]> {
    let w = width.max(1);
    let m = max.min(255);
    (0..w * 3)
        .map(|i| {
            let r = if i < w { i * m / w } else { m };
            let g = if i < w {
                0
            } else if i < 2 * w {
                (i - w) * m / w
            } else {
                m
            };
            let b = if i < 2 * w { 0 } else { (i - 2 * w) * m / w };
            [r as u8, g as u8, b as u8, 255]
        })
        .collect()
}

/// Fixed-size dot pool split into colour groups
#[derive(Debug, Clone)]
pub struct DotPool {
    pub kind: DotKind,
    dots: Vec<Dot>,
    colours: Vec<[u8; 4]>,
}

impl DotPool {
    fn new(kind: DotKind, capacity: usize, n_groups: usize, palette: &[[u8; 4]], rng: &mut impl Rng) -> Self {
        let n_groups = n_groups.max(1);
        let per_group = capacity / n_groups;
        let colours = (0..n_groups)
            .map(|_| match palette.len() {
                0 => [255, 255, 255, 255],
                n => palette[rng.random_range(0..n)],
            })
            .collect();
        Self {
            kind,
            dots: vec![Dot::default(); per_group * n_groups],
            colours,
        }
    }

    pub fn capacity(&self) -> usize {
        self.dots.len()
    }

    pub fn n_groups(&self) -> usize {
        self.colours.len()
    }

    pub fn colour(&self, group: usize) -> [u8; 4] {
        self.colours[group % self.colours.len()]
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn active_count(&self) -> usize {
        self.dots.iter().filter(|d| d.active).count()
    }

    /// Active dots of one colour group; dot `i` belongs to group `i % n_groups`
    pub fn group(&self, group: usize) -> impl Iterator<Item = &Dot> {
        self.dots
            .iter()
            .skip(group)
            .step_by(self.colours.len().max(1))
            .filter(|d| d.active)
    }

    pub fn clear(&mut self) {
        self.dots.iter_mut().for_each(|d| d.active = false);
    }
}

/// Both dot pools and the bang-dot cursor
#[derive(Debug, Clone)]
pub struct Dots {
    pub engine: DotPool,
    pub bang: DotPool,
    bang_cursor: usize,
    killed: Vec<usize>,
}

impl Dots {
    pub fn new(rng: &mut impl Rng, settings: &Settings) -> Self {
        let palette = heat_palette(settings.heat_width, settings.heat_max);
        let engine = DotPool::new(
            DotKind::Engine,
            settings.max_ship_dots,
            settings.n_ship_dot_groups,
            &palette,
            rng,
        );
        let bang = DotPool::new(
            DotKind::Bang,
            settings.max_bang_dots,
            settings.n_bang_dot_groups,
            &palette,
            rng,
        );
        Self {
            engine,
            bang,
            bang_cursor: 0,
            killed: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.engine.clear();
        self.bang.clear();
        self.bang_cursor = 0;
    }

    /// Emit exhaust for every firing thruster.
    ///
    /// Each dot is born at a random moment within the last `dt` ticks. Its
    /// start position assumes the ship moved at constant speed over the
    /// frame; its velocity uses the ship's speed at that moment, undoing the
    /// thrust applied since.
    #[allow(clippy::too_many_arguments)]
    pub fn emit_engine(
        &mut self,
        ship: &Entity,
        jets: Jets,
        budget: usize,
        thrust: f64,
        scroll: DVec2,
        dt: f64,
        win: DVec2,
        rng: &mut impl Rng,
    ) {
        let budget = budget.min(self.engine.dots.len());
        let accel_dir = DVec2::new(jets.bit(2) - jets.bit(0), jets.bit(1) - jets.bit(3));
        for dir in 0..4 {
            if !jets.fires(dir) {
                continue;
            }
            for dot in self.engine.dots[..budget].iter_mut().filter(|d| !d.active) {
                let angle = frnd(rng) * PI + (dir as f64 - 1.0) * FRAC_PI_2;
                let r = (frnd(rng) * PI).sin();
                // Screen y grows downward
                let spray = DVec2::new(r * angle.cos(), -r * angle.sin());

                let age = frnd(rng) * dt;
                let past_vel = ship.vel - accel_dir * thrust * age;

                dot.pos = ship.pos - (ship.vel - scroll) * age
                    + DVec2::new(
                        NOZZLE[dir] * ship.width() / 2.0,
                        NOZZLE[(dir + 1) & 3] * ship.height() / 2.0,
                    );
                if dir & 1 != 0 {
                    dot.vel = past_vel + DVec2::new(2.0 * spray.x, 20.0 * spray.y);
                    dot.mass = 60.0 * spray.y.abs();
                } else {
                    dot.vel = past_vel + DVec2::new(20.0 * spray.x, 2.0 * spray.y);
                    dot.mass = 60.0 * spray.x.abs();
                }
                dot.decay = ENGINE_DECAY;
                dot.pos += (dot.vel - scroll) * age;
                dot.active = !clip(dot.pos.x, win.x) && !clip(dot.pos.y, win.y);
            }
        }
    }

    /// Burst `passes` dots per pixel of `source`'s box, flying out from each
    /// pixel with a centre-heavy speed distribution
    pub fn emit_bang(&mut self, source: &Entity, passes: u32, decay_spread: f64, rng: &mut impl Rng) {
        let n = self.bang.dots.len();
        if n == 0 {
            return;
        }
        let (w, h) = (source.width() as i64, source.height() as i64);
        for _ in 0..passes {
            for y in 0..h {
                for x in 0..w {
                    let theta = frnd(rng) * TAU;
                    let s = frnd(rng);
                    let r = 1.0 - s * s;
                    let dot = &mut self.bang.dots[self.bang_cursor];
                    dot.vel = DVec2::new(theta.cos(), theta.sin()) * BANG_SPEED * r + source.vel;
                    dot.pos = source.pos + DVec2::new(x as f64, y as f64);
                    dot.mass = frnd(rng) * 99.0;
                    dot.decay = frnd(rng) * decay_spread + 0.5;
                    dot.active = true;
                    self.bang_cursor = (self.bang_cursor + 1) % n;
                }
            }
        }
    }

    /// Debris from a destroyed rock
    pub fn bang_rock(&mut self, rock: &Entity, rng: &mut impl Rng) {
        self.emit_bang(rock, ROCK_BANG_PASSES, 1.5, rng);
    }

    /// Debris from the destroyed ship
    pub fn bang_ship(&mut self, ship: &Entity, rng: &mut impl Rng) {
        self.emit_bang(ship, SHIP_BANG_PASSES, 4.5, rng);
    }

    /// Place a single bang dot at the cursor (scripted effects)
    pub fn spawn_bang_dot(&mut self, pos: DVec2, vel: DVec2, mass: f64, decay: f64) {
        let n = self.bang.dots.len();
        if n == 0 {
            return;
        }
        self.bang.dots[self.bang_cursor] = Dot {
            pos,
            vel,
            mass,
            decay,
            active: true,
        };
        self.bang_cursor = (self.bang_cursor + 1) % n;
    }

    /// Move every dot, then let the survivors push and burn what they touch.
    ///
    /// Rocks whose life runs out are killed and burst into fresh bang dots
    /// after the pass. Returns how many rocks died.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        scroll: DVec2,
        dt: f64,
        win: DVec2,
        rocks: &mut RockField,
        pow_ups: &mut PowUpField,
        engine_blast: bool,
        mass_unit: f64,
        rng: &mut impl Rng,
    ) -> usize {
        self.killed.clear();
        for pool in [&mut self.engine, &mut self.bang] {
            let kind = pool.kind;
            for dot in pool.dots.iter_mut().filter(|d| d.active) {
                if !dot.step(scroll, dt, win) {
                    continue;
                }
                for pow_up in pow_ups.iter_active_mut() {
                    if point_hits(dot.pos, pow_up) {
                        push(pow_up, dot.vel, dot.mass, mass_unit);
                    }
                }
                for (i, slot) in rocks.slots_mut().iter_mut().enumerate() {
                    let Some(rock) = slot else {
                        continue;
                    };
                    if !point_hits(dot.pos, rock) {
                        continue;
                    }
                    match kind {
                        DotKind::Bang => fry(rock, dot.vel, 1.0),
                        DotKind::Engine if engine_blast => fry(rock, dot.vel, ENGINE_BLAST_BURN),
                        DotKind::Engine => {}
                    }
                    push(rock, dot.vel, dot.mass, mass_unit);
                    if rock.life <= 0 {
                        rock.kill();
                        self.killed.push(i);
                    }
                }
            }
        }

        let killed = std::mem::take(&mut self.killed);
        for &i in &killed {
            if let Some(Some(rock)) = rocks.slots().get(i) {
                let rock = rock.clone();
                self.bang_rock(&rock, rng);
            }
        }
        let count = killed.len();
        self.killed = killed;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Flags, SpinDirection};
    use crate::sim::mask::SpriteId;
    use crate::sim::spawner::RockPrototype;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (Settings, Pcg32, Dots, RockField, PowUpField) {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let dots = Dots::new(&mut rng, &settings);
        let rocks = RockField::new(
            vec![RockPrototype {
                sprite: SpriteId(0),
                width: 4.0,
                height: 4.0,
            }],
            &settings,
        );
        let pow_ups = PowUpField::new(&mut rng, SpriteId(1), 30.0, 30.0, &settings);
        (settings, rng, dots, rocks, pow_ups)
    }

    #[test]
    fn test_heat_palette_ramp() {
        let palette = heat_palette(100, 255);
        assert_eq!(palette.len(), 300);
        assert_eq!(palette[0], [0, 0, 0, 255]);
        assert_eq!(palette[100], [255, 0, 0, 255]);
        assert_eq!(palette[200], [255, 255, 0, 255]);
        assert_eq!(palette[299][2], 252);
        // Monotone non-decreasing in every channel
        for pair in palette.windows(2) {
            for c in 0..3 {
                assert!(pair[1][c] >= pair[0][c]);
            }
        }
    }

    #[test]
    fn test_pools_and_groups() {
        let (_, _, dots, _, _) = setup();
        assert_eq!(dots.engine.capacity(), 1500);
        assert_eq!(dots.engine.n_groups(), 5);
        assert_eq!(dots.bang.n_groups(), 10);
        assert_eq!(dots.bang.group(3).count(), 0);
    }

    #[test]
    fn test_rock_killed_by_single_bang_dot() {
        let (settings, mut rng, mut dots, mut rocks, mut pow_ups) = setup();
        let mut rock = Entity::rock(SpriteId(0), 4.0, 4.0, SpinDirection::Forward);
        rock.pos = DVec2::new(100.0, 100.0);
        rock.vel = DVec2::new(2.0, 1.0);
        rock.life = 100;
        rocks.insert(0, rock);

        // Relative velocity (10, 0): burns exactly 100
        dots.spawn_bang_dot(DVec2::new(101.0, 101.0), DVec2::new(12.0, 1.0), 1.0, 0.0);
        let killed = dots.update(
            DVec2::ZERO,
            0.01,
            settings.window(),
            &mut rocks,
            &mut pow_ups,
            false,
            settings.dot_mass_unit,
            &mut rng,
        );

        assert_eq!(killed, 1);
        let rock = rocks.iter().next().unwrap();
        assert_eq!(rock.life, 0);
        assert_eq!(rock.flags, Flags::NONE);
        assert_eq!(rock.explosion, Some(0));
        // The striking dot plus five dots per pixel of the 4x4 rock
        assert_eq!(dots.bang.active_count(), 1 + 5 * 16);
    }

    #[test]
    fn test_engine_dots_only_push_outside_engine_blast() {
        let (settings, mut rng, mut dots, mut rocks, mut pow_ups) = setup();
        let mut rock = Entity::rock(SpriteId(0), 4.0, 4.0, SpinDirection::Forward);
        rock.pos = DVec2::new(100.0, 100.0);
        rock.life = 1000;
        rocks.insert(0, rock);
        dots.engine.dots[0] = Dot {
            pos: DVec2::new(101.0, 101.0),
            vel: DVec2::new(20.0, 0.0),
            mass: 10.0,
            decay: 0.0,
            active: true,
        };
        dots.update(
            DVec2::ZERO,
            0.001,
            settings.window(),
            &mut rocks,
            &mut pow_ups,
            false,
            settings.dot_mass_unit,
            &mut rng,
        );
        let rock = rocks.iter().next().unwrap();
        assert_eq!(rock.life, 1000);
        assert!(rock.vel.x > 0.0);

        let before = rock.vel.x;
        dots.update(
            DVec2::ZERO,
            0.001,
            settings.window(),
            &mut rocks,
            &mut pow_ups,
            true,
            settings.dot_mass_unit,
            &mut rng,
        );
        let rock = rocks.iter().next().unwrap();
        let rel = 20.0 - before;
        assert_eq!(rock.life, 1000 - (rel * rel * 1.5) as i64);
    }

    #[test]
    fn test_dots_expire_on_mass_and_clip() {
        let (settings, mut rng, mut dots, mut rocks, mut pow_ups) = setup();
        dots.spawn_bang_dot(DVec2::new(500.0, 300.0), DVec2::ZERO, 1.0, 2.0);
        dots.spawn_bang_dot(DVec2::new(1023.0, 300.0), DVec2::new(5.0, 0.0), 50.0, 0.0);
        dots.spawn_bang_dot(DVec2::new(200.0, 300.0), DVec2::ZERO, 50.0, 0.0);
        dots.update(
            DVec2::ZERO,
            1.0,
            settings.window(),
            &mut rocks,
            &mut pow_ups,
            false,
            settings.dot_mass_unit,
            &mut rng,
        );
        assert_eq!(dots.bang.active_count(), 1);
    }

    #[test]
    fn test_bang_cursor_wraps() {
        let settings = Settings {
            max_bang_dots: 20,
            n_bang_dot_groups: 4,
            ..Settings::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut dots = Dots::new(&mut rng, &settings);
        let rock = Entity::rock(SpriteId(0), 3.0, 3.0, SpinDirection::Forward);
        dots.bang_rock(&rock, &mut rng);
        assert_eq!(dots.bang_cursor, (5 * 9) % 20);
        assert_eq!(dots.bang.active_count(), 20);
    }

    #[test]
    fn test_engine_emission_behind_nozzle() {
        let (settings, mut rng, mut dots, _, _) = setup();
        let mut ship = Entity::ship(SpriteId(0), 40.0, 20.0, 4);
        ship.pos = DVec2::new(300.0, 300.0);
        ship.vel = DVec2::new(7.5, 0.0);
        let scroll = DVec2::new(7.5, 0.0);
        // Thrusting left: exhaust leaves the right-hand nozzle heading right
        dots.emit_engine(
            &ship,
            Jets(Jets::LEFT),
            200,
            settings.thruster_strength,
            scroll,
            0.0,
            settings.window(),
            &mut rng,
        );
        assert_eq!(dots.engine.active_count(), 200);
        for dot in dots.engine.dots().iter().filter(|d| d.active) {
            assert_eq!(dot.pos, DVec2::new(340.0, 310.0));
            assert!(dot.vel.x >= ship.vel.x);
            assert!(dot.mass >= 0.0 && dot.mass <= 60.0);
            assert_eq!(dot.decay, ENGINE_DECAY);
        }
        // Budget caps refills
        assert!(dots.engine.dots()[200..].iter().all(|d| !d.active));
    }
}

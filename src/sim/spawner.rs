//! Rock and power-up arrival from the screen edges
//!
//! Rocks arrive at a rate derived from the target rock count and the current
//! scroll speed, split over the four edges. Power-ups use one interval timer.
//! Both live in fixed-capacity pools that never overwrite an active slot.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{bounce, collide, pair_mut};
use super::entity::{Entity, PowerMode, SpinDirection};
use super::mask::{MaskAtlas, SpriteId};
use super::physics::{crnd, frnd, weighted_random_range};
use crate::consts::POW_UP_CLIP_MARGIN;
use crate::settings::Settings;

/// Screen edge an object enters through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Right,
    Up,
    Down,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Up, Edge::Down];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Per-edge arrival rate (objects per tick) and speed range
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeRates {
    pub rate: [f64; 4],
    pub speed_min: [f64; 4],
    pub speed_max: [f64; 4],
}

impl EdgeRates {
    pub fn rate(&self, edge: Edge) -> f64 {
        self.rate[edge.index()]
    }

    pub fn speed_range(&self, edge: Edge) -> (f64, f64) {
        (self.speed_min[edge.index()], self.speed_max[edge.index()])
    }
}

/// Split one axis into the edges objects cross, given the relative velocity
/// range `[v0, v1]`. Returns `(rate_neg, rate_pos)`; `neg` is the edge that
/// objects with negative relative speed enter through.
fn split_axis(rates: &mut EdgeRates, neg: Edge, pos: Edge, v0: f64, v1: f64, factor: f64) {
    let (n, p) = (neg.index(), pos.index());
    if v0 < 0.0 {
        rates.speed_max[n] = -v0;
        if v1 < 0.0 {
            rates.speed_min[n] = -v1;
            rates.rate[n] = -(v0 + v1) / 2.0;
        } else {
            // Range straddles zero: both edges feed
            rates.speed_max[p] = v1;
            rates.rate[n] = -v0 / 2.0;
            rates.rate[p] = v1 / 2.0;
        }
    } else {
        rates.speed_min[p] = v0;
        rates.speed_max[p] = v1;
        rates.rate[p] = (v0 + v1) / 2.0;
    }
    rates.rate[n] *= factor;
    rates.rate[p] *= factor;
}

/// Arrival rates for `count` objects with velocity jitter `±rdx, ±rdy`
/// against a camera moving at `scroll`.
///
/// `kh` / `kv` are the ticks a speed-1 object needs to cross the screen.
pub fn compute_edge_rates(scroll: DVec2, rdx: f64, rdy: f64, count: f64, kh: f64, kv: f64) -> EdgeRates {
    let mut rates = EdgeRates::default();
    let hfactor = if kh > 0.0 { count / kh } else { 0.0 };
    let vfactor = if kv > 0.0 { count / kv } else { 0.0 };
    split_axis(&mut rates, Edge::Right, Edge::Left, -rdx - scroll.x, rdx - scroll.x, hfactor);
    split_axis(&mut rates, Edge::Down, Edge::Up, -rdy - scroll.y, rdy - scroll.y, vfactor);
    rates
}

/// Put `entity` just outside `edge`, moving on-screen.
///
/// The main-axis speed is drawn from the edge's range and carries the scroll;
/// the cross-axis speed is plain jitter.
fn place_at_edge(
    entity: &mut Entity,
    edge: Edge,
    rates: &EdgeRates,
    rng: &mut impl Rng,
    scroll: DVec2,
    settings: &Settings,
) {
    let (w, h) = (entity.width(), entity.height());
    let (min, max) = rates.speed_range(edge);
    match edge {
        Edge::Right | Edge::Left => {
            let speed = weighted_random_range(rng, min, max);
            entity.pos.y = frnd(rng) * (settings.win_height + h);
            if edge == Edge::Right {
                entity.pos.x = settings.win_width;
                entity.vel.x = -speed + scroll.x;
            } else {
                entity.pos.x = -w;
                entity.vel.x = speed + scroll.x;
            }
            entity.vel.y = settings.rdy * crnd(rng);
        }
        Edge::Down | Edge::Up => {
            let speed = weighted_random_range(rng, min, max);
            entity.pos.x = frnd(rng) * (settings.win_width + w) - w;
            if edge == Edge::Down {
                entity.pos.y = settings.win_height;
                entity.vel.y = -speed + scroll.y;
            } else {
                entity.pos.y = -h;
                entity.vel.y = speed + scroll.y;
            }
            entity.vel.x = settings.rdx * crnd(rng);
        }
    }
}

/// Sprite and frame size a rock is built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RockPrototype {
    pub sprite: SpriteId,
    /// Width of one animation frame
    pub width: f64,
    pub height: f64,
}

impl RockPrototype {
    /// A fresh rock of this shape
    pub fn build(&self, direction: SpinDirection) -> Entity {
        Entity::rock(self.sprite, self.width, self.height, direction)
    }
}

/// Rock pool with the count ramp and per-edge arrival accumulators
#[derive(Debug, Clone)]
pub struct RockField {
    slots: Vec<Option<Entity>>,
    prototypes: Vec<RockPrototype>,
    cursor: usize,
    target: u32,
    initial: u32,
    final_count: u32,
    ramp_timer: f64,
    ramp_step_ticks: f64,
    edge_timers: [f64; 4],
    rates: EdgeRates,
}

impl RockField {
    pub fn new(mut prototypes: Vec<RockPrototype>, settings: &Settings) -> Self {
        prototypes.truncate(settings.n_rock_prototypes);
        let steps = settings.final_rocks.saturating_sub(settings.initial_rocks);
        let ramp_step_ticks = if steps > 0 {
            settings.rock_ramp_ticks / steps as f64
        } else {
            f64::INFINITY
        };
        Self {
            slots: vec![None; settings.max_rocks],
            prototypes,
            cursor: 0,
            target: settings.initial_rocks,
            initial: settings.initial_rocks,
            final_count: settings.final_rocks,
            ramp_timer: 0.0,
            ramp_step_ticks,
            edge_timers: [0.0; 4],
            rates: EdgeRates::default(),
        }
    }

    /// Empty the pool and restart the ramp
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.cursor = 0;
        self.target = self.initial;
        self.ramp_timer = 0.0;
        self.edge_timers = [0.0; 4];
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Next slot a spawn will try
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current target rock count
    pub fn target_count(&self) -> u32 {
        self.target
    }

    /// Rates used by the last spawn pass
    pub fn rates(&self) -> &EdgeRates {
        &self.rates
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn slots(&self) -> &[Option<Entity>] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Option<Entity>] {
        &mut self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().flatten()
    }

    /// Place a rock directly into a slot (tests and scripted scenes)
    pub fn insert(&mut self, index: usize, mut rock: Entity) {
        if let Some(slot) = self.slots.get_mut(index) {
            rock.active = true;
            *slot = Some(rock);
        }
    }

    /// Move every rock and free the ones that left the screen
    pub fn update(&mut self, scroll: DVec2, dt: f64, win: DVec2) {
        for slot in &mut self.slots {
            let Some(rock) = slot else {
                continue;
            };
            rock.integrate(scroll, dt);
            if rock.is_off_screen(win) {
                *slot = None;
            }
        }
    }

    /// Update animation frames and running explosions
    pub fn animate(&mut self, elapsed_ms: u64, n_frames: u32, advance_explosions: bool) {
        for rock in self.iter_mut() {
            rock.animate(elapsed_ms, n_frames);
            if advance_explosions {
                rock.advance_explosion(n_frames);
            }
        }
    }

    /// Step the ramp, recompute edge rates and emit the arrivals due this
    /// frame. Returns how many rocks were placed.
    pub fn spawn(&mut self, rng: &mut impl Rng, scroll: DVec2, dt: f64, settings: &Settings) -> usize {
        if self.target < self.final_count {
            self.ramp_timer += dt;
            if self.ramp_timer >= self.ramp_step_ticks {
                self.ramp_timer -= self.ramp_step_ticks;
                self.target += 1;
                log::debug!("Rock target raised to {}", self.target);
            }
        }

        self.rates = compute_edge_rates(
            scroll,
            settings.rdx,
            settings.rdy,
            self.target as f64,
            settings.kh,
            settings.kv,
        );

        let mut placed = 0;
        for edge in Edge::ALL {
            self.edge_timers[edge.index()] += self.rates.rate(edge) * dt;
            while self.edge_timers[edge.index()] >= 1.0 {
                self.edge_timers[edge.index()] -= 1.0;
                if self.slots.is_empty() || self.prototypes.is_empty() {
                    continue;
                }
                // An occupied slot stalls the cursor: the arrival is dropped
                if self.slots[self.cursor].is_some() {
                    continue;
                }
                let proto = self.prototypes[rng.random_range(0..self.prototypes.len())];
                let direction = if rng.random_bool(0.5) {
                    SpinDirection::Reverse
                } else {
                    SpinDirection::Forward
                };
                let mut rock = proto.build(direction);
                place_at_edge(&mut rock, edge, &self.rates, rng, scroll, settings);
                rock.active = true;
                self.slots[self.cursor] = Some(rock);
                self.cursor = (self.cursor + 1) % self.slots.len();
                placed += 1;
            }
        }
        placed
    }

    /// Bounce overlapping rocks; the lighter rock of a pair reverses its spin
    pub fn collide_rocks(&mut self, masks: &MaskAtlas, n_frames: u32) {
        let n = self.slots.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = pair_mut(&mut self.slots, i, j);
                let (Some(a), Some(b)) = (a, b) else {
                    continue;
                };
                if !collide(a, b, masks, n_frames) {
                    continue;
                }
                bounce(a, b);
                if a.mass() < b.mass() {
                    a.direction = a.direction.flipped();
                } else if b.mass() < a.mass() {
                    b.direction = b.direction.flipped();
                }
            }
        }
    }
}

/// Power-up pool with a single interval timer
#[derive(Debug, Clone)]
pub struct PowUpField {
    slots: Vec<Entity>,
    timer_ms: f64,
}

impl PowUpField {
    /// Pre-build the pool; each slot gets a random flavour for the whole game
    pub fn new(rng: &mut impl Rng, sprite: SpriteId, width: f64, height: f64, settings: &Settings) -> Self {
        let slots = (0..settings.max_pow_ups)
            .map(|_| {
                let flavour = PowerMode::from_index(rng.random_range(0..PowerMode::ALL.len()));
                Entity::pow_up(sprite, width, height, flavour)
            })
            .collect();
        Self { slots, timer_ms: 0.0 }
    }

    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|p| p.active = false);
        self.timer_ms = 0.0;
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn timer_ms(&self) -> f64 {
        self.timer_ms
    }

    pub fn slots(&self) -> &[Entity] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Entity] {
        &mut self.slots
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|p| p.active)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter(|p| p.active)
    }

    /// Advance the interval timer, move power-ups and clip them
    pub fn update(&mut self, scroll: DVec2, dt: f64, frame_ms: f64, win: DVec2) {
        self.timer_ms += frame_ms;
        for pow_up in self.slots.iter_mut().filter(|p| p.active) {
            pow_up.integrate(scroll, dt);
            let m = POW_UP_CLIP_MARGIN;
            if pow_up.pos.x < -pow_up.width()
                || pow_up.pos.x >= win.x + m
                || pow_up.pos.y < -(pow_up.height() + m)
                || pow_up.pos.y >= win.y + m
            {
                pow_up.active = false;
            }
        }
    }

    /// Once per interval, try to launch one power-up from a random edge.
    /// Returns the slot used, if any.
    pub fn spawn(&mut self, rng: &mut impl Rng, scroll: DVec2, settings: &Settings) -> Option<usize> {
        if self.timer_ms < settings.pow_ups_timeout || self.slots.is_empty() {
            return None;
        }
        self.timer_ms = 0.0;

        let i = rng.random_range(0..self.slots.len());
        if self.slots[i].active {
            return None;
        }
        let rates = compute_edge_rates(scroll, settings.rdx, settings.rdy, 1.0, settings.kh, settings.kv);
        let edge = Edge::ALL[rng.random_range(0..Edge::ALL.len())];
        let pow_up = &mut self.slots[i];
        place_at_edge(pow_up, edge, &rates, rng, scroll, settings);
        pow_up.active = true;
        Some(i)
    }

    /// Bounce power-ups off rocks
    pub fn collide_rocks(&mut self, rocks: &mut RockField, masks: &MaskAtlas, n_frames: u32) {
        for pow_up in self.slots.iter_mut().filter(|p| p.active) {
            for rock in rocks.iter_mut() {
                if collide(pow_up, rock, masks, n_frames) {
                    bounce(pow_up, rock);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn protos() -> Vec<RockPrototype> {
        vec![
            RockPrototype {
                sprite: SpriteId(0),
                width: 20.0,
                height: 20.0,
            },
            RockPrototype {
                sprite: SpriteId(1),
                width: 50.0,
                height: 40.0,
            },
        ]
    }

    #[test]
    fn test_rates_at_rest_feed_both_sides_of_each_axis() {
        let rates = compute_edge_rates(DVec2::ZERO, 2.5, 2.5, 8.0, 640.0, 480.0);
        assert_eq!(rates.speed_range(Edge::Right), (0.0, 2.5));
        assert_eq!(rates.speed_range(Edge::Left), (0.0, 2.5));
        assert!((rates.rate(Edge::Right) - 1.25 * 8.0 / 640.0).abs() < 1e-12);
        assert!((rates.rate(Edge::Left) - 1.25 * 8.0 / 640.0).abs() < 1e-12);
        assert!((rates.rate(Edge::Up) - 1.25 * 8.0 / 480.0).abs() < 1e-12);
        assert!((rates.rate(Edge::Down) - 1.25 * 8.0 / 480.0).abs() < 1e-12);
    }

    #[test]
    fn test_rates_fast_scroll_uses_right_edge_only() {
        let rates = compute_edge_rates(DVec2::new(7.5, 0.0), 2.5, 2.5, 10.0, 640.0, 480.0);
        assert_eq!(rates.rate(Edge::Left), 0.0);
        assert_eq!(rates.speed_range(Edge::Right), (5.0, 10.0));
        assert!((rates.rate(Edge::Right) - 7.5 * 10.0 / 640.0).abs() < 1e-12);
    }

    #[test]
    fn test_rates_backward_scroll_uses_left_edge_only() {
        let rates = compute_edge_rates(DVec2::new(-5.0, 0.0), 2.5, 2.5, 10.0, 640.0, 480.0);
        assert_eq!(rates.rate(Edge::Right), 0.0);
        assert_eq!(rates.speed_range(Edge::Left), (2.5, 7.5));
        assert!((rates.rate(Edge::Left) - 5.0 * 10.0 / 640.0).abs() < 1e-12);
    }

    #[test]
    fn test_placement_is_off_screen_and_heading_in() {
        let settings = Settings::default();
        let scroll = DVec2::new(7.5, 0.0);
        let rates = compute_edge_rates(scroll, 2.5, 2.5, 10.0, 640.0, 480.0);
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let mut rock = protos()[1].build(SpinDirection::Forward);
            place_at_edge(&mut rock, Edge::Right, &rates, &mut rng, scroll, &settings);
            assert_eq!(rock.pos.x, settings.win_width);
            assert!(rock.pos.y >= 0.0 && rock.pos.y < settings.win_height + rock.height());
            // Relative to the camera the rock moves left
            assert!(rock.vel.x - scroll.x <= -5.0 + 1e-9);
            assert!(rock.vel.y.abs() <= settings.rdy / 2.0);
        }
    }

    #[test]
    fn test_ramp_raises_target_to_final() {
        let settings = Settings::default();
        let mut field = RockField::new(protos(), &settings);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(field.target_count(), 8);
        let step = settings.rock_ramp_ticks / 17.0;
        for _ in 0..((step as usize) + 2) {
            field.spawn(&mut rng, DVec2::new(7.5, 0.0), 1.0, &settings);
        }
        assert_eq!(field.target_count(), 9);
        for _ in 0..3000 {
            field.spawn(&mut rng, DVec2::new(7.5, 0.0), 1.0, &settings);
        }
        assert_eq!(field.target_count(), 25);
    }

    #[test]
    fn test_spawn_fills_pool_then_stalls() {
        let settings = Settings {
            max_rocks: 4,
            ..Settings::default()
        };
        let mut field = RockField::new(protos(), &settings);
        let mut rng = Pcg32::seed_from_u64(9);
        // Large dt: many arrivals in one pass
        let placed = field.spawn(&mut rng, DVec2::new(7.5, 0.0), 2000.0, &settings);
        assert_eq!(placed, 4);
        assert_eq!(field.active_count(), 4);
        assert_eq!(field.cursor(), 0);
        let placed = field.spawn(&mut rng, DVec2::new(7.5, 0.0), 2000.0, &settings);
        assert_eq!(placed, 0);

        field.slots_mut()[0] = None;
        let placed = field.spawn(&mut rng, DVec2::new(7.5, 0.0), 2000.0, &settings);
        assert_eq!(placed, 1);
        assert_eq!(field.cursor(), 1);
    }

    #[test]
    fn test_new_rock_defaults() {
        let settings = Settings::default();
        let mut field = RockField::new(protos(), &settings);
        let mut rng = Pcg32::seed_from_u64(5);
        field.spawn(&mut rng, DVec2::new(7.5, 0.0), 500.0, &settings);
        let rock = field.iter().next().unwrap();
        assert!(rock.active);
        assert!(rock.is_collidable() && rock.is_drawable() && rock.is_movable());
        assert_eq!(rock.life, (rock.width() * rock.height() * 300.0) as i64);
    }

    #[test]
    fn test_update_clips_departed_rocks() {
        let settings = Settings::default();
        let mut field = RockField::new(protos(), &settings);
        let mut rock = protos()[0].build(SpinDirection::Forward);
        rock.pos = DVec2::new(-15.0, 100.0);
        rock.vel = DVec2::new(-10.0, 0.0);
        field.insert(3, rock);
        field.update(DVec2::ZERO, 1.0, settings.window());
        assert_eq!(field.active_count(), 0);
    }

    #[test]
    fn test_rock_pair_bounce_flips_lighter() {
        let settings = Settings::default();
        let mut field = RockField::new(protos(), &settings);
        let masks = MaskAtlas::new();
        let mut small = protos()[0].build(SpinDirection::Forward);
        small.pos = DVec2::new(100.0, 100.0);
        small.vel = DVec2::new(3.0, 0.0);
        let mut big = protos()[1].build(SpinDirection::Forward);
        big.pos = DVec2::new(110.0, 90.0);
        big.vel = DVec2::new(-3.0, 0.0);
        field.insert(0, small);
        field.insert(1, big);
        field.collide_rocks(&masks, 16);
        let rocks: Vec<_> = field.iter().collect();
        assert_eq!(rocks[0].direction, SpinDirection::Reverse);
        assert_eq!(rocks[1].direction, SpinDirection::Forward);
        assert!(rocks[0].vel.x < 3.0);
    }

    #[test]
    fn test_pow_up_interval_and_clip() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut field = PowUpField::new(&mut rng, SpriteId(7), 30.0, 30.0, &settings);
        assert_eq!(field.capacity(), 30);

        assert_eq!(field.spawn(&mut rng, DVec2::new(7.5, 0.0), &settings), None);
        field.update(DVec2::new(7.5, 0.0), 1.0, 3000.0, settings.window());
        let slot = field.spawn(&mut rng, DVec2::new(7.5, 0.0), &settings).unwrap();
        assert_eq!(field.timer_ms(), 0.0);
        assert!(field.slots()[slot].active);

        // Far past the right margin
        field.slots_mut()[slot].pos = DVec2::new(settings.win_width + 150.0, 10.0);
        field.slots_mut()[slot].vel = DVec2::new(7.5, 0.0);
        field.update(DVec2::new(7.5, 0.0), 1.0, 16.0, settings.window());
        assert!(!field.slots()[slot].active);
    }

    #[test]
    fn test_pow_up_keeps_within_right_margin() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut field = PowUpField::new(&mut rng, SpriteId(7), 30.0, 30.0, &settings);
        let p = &mut field.slots_mut()[0];
        p.active = true;
        p.pos = DVec2::new(settings.win_width + 50.0, -80.0);
        field.update(DVec2::ZERO, 1.0, 16.0, settings.window());
        assert!(field.slots()[0].active);
    }

    proptest! {
        #[test]
        fn prop_spawn_never_overwrites_active(
            seed in 0u64..1000,
            sx in -20.0f64..20.0,
            sy in -10.0f64..10.0,
            dt in 0.1f64..200.0,
            cap in 1usize..12,
        ) {
            let settings = Settings { max_rocks: cap, ..Settings::default() };
            let mut field = RockField::new(protos(), &settings);
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..5 {
                let before: Vec<Option<DVec2>> =
                    field.slots().iter().map(|s| s.as_ref().map(|r| r.pos)).collect();
                field.spawn(&mut rng, DVec2::new(sx, sy), dt, &settings);
                for (prev, now) in before.iter().zip(field.slots()) {
                    if let Some(pos) = prev {
                        prop_assert_eq!(now.as_ref().map(|r| r.pos), Some(*pos));
                    }
                }
                prop_assert!(field.cursor() < field.capacity());
            }
        }
    }
}

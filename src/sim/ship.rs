//! The player's ship
//!
//! Wraps the ship [`Entity`] with the power-mode timer, the translucency
//! timer used for blinking and invincible contacts, the thruster bitmask and
//! the power-up banner.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::bounce;
use super::dots::Jets;
use super::entity::{Entity, Flags, PowerMode};
use super::mask::SpriteId;
use super::modifiers::Modifiers;
use super::physics::{constrain, constrain_range};
use crate::settings::Settings;

/// Opaque ship
pub const ALPHA_OPAQUE: u8 = 255;
/// Translucency while phasing through a rock
pub const ALPHA_PHASED: u8 = 100;
/// Translucency of a blink
pub const ALPHA_BLINK: u8 = 80;

const PHASE_MS: f64 = 200.0;
const BLINK_MS: f64 = 100.0;
/// A power mode with less than this left makes the ship blink
const BLINK_WARNING_MS: f64 = 1000.0;
const BANNER_SHRINK: f64 = 0.03;

/// Name of the power-up just collected, zooming in then fading out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowUpBanner {
    pub flavour: PowerMode,
    /// Divides the banner size; shrinks toward 1.0
    pub scale: f64,
    pub timeout_ms: f64,
}

impl PowUpBanner {
    pub fn alpha(&self) -> u8 {
        self.timeout_ms.clamp(0.0, 255.0) as u8
    }
}

/// What a lost life leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// Lives remain; the ship respawns after a pause
    DeadPause,
    /// That was the last life
    GameOver,
}

/// Result of the ship touching a rock, by power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RockContact {
    /// Ship and rock both died
    Destroyed(KillOutcome),
    /// Shields: elastic bounce
    Bounced,
    /// Attack: bounce and the rock dies
    Smashed,
    /// Invincible: the ship turns translucent
    Phased,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub entity: Entity,
    /// Milliseconds left in the current power mode
    pub state_timeout: f64,
    /// Milliseconds left of translucency
    pub transp_timeout: f64,
    pub transparent: bool,
    pub alpha: u8,
    /// Thrusters fired this frame
    pub jets: Jets,
    /// Engine running (glow drawn, engine sound playing)
    pub moving: bool,
    pub banner: Option<PowUpBanner>,
}

impl Ship {
    pub fn new(sprite: SpriteId, width: f64, height: f64, settings: &Settings) -> Self {
        let mut entity = Entity::ship(sprite, width, height, settings.ship_lives);
        entity.pos = DVec2::new(
            settings.win_width / 2.2,
            settings.win_height / 2.0 - height / 2.0,
        );
        entity.vel = DVec2::new(settings.barrier_speed, 0.0);
        Self {
            entity,
            state_timeout: 0.0,
            transp_timeout: 0.0,
            transparent: false,
            alpha: ALPHA_OPAQUE,
            jets: Jets::default(),
            moving: false,
            banner: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> PowerMode {
        self.entity.state
    }

    #[inline]
    pub fn lives(&self) -> u32 {
        self.entity.lives
    }

    /// Enter a power mode for `timeout_ms`, replacing the current one
    pub fn set_mode(&mut self, mode: PowerMode, timeout_ms: f64) {
        self.entity.state = mode;
        self.state_timeout = timeout_ms;
    }

    /// Accelerate along every firing thruster, clamping speed while thrusting
    pub fn thrust(&mut self, jets: Jets, dt: f64, settings: &Settings) {
        let step = settings.thruster_strength * dt;
        let vel = &mut self.entity.vel;
        if jets.fires(0) {
            vel.x -= step;
        }
        if jets.fires(1) {
            vel.y += step;
        }
        if jets.fires(2) {
            vel.x += step;
        }
        if jets.fires(3) {
            vel.y -= step;
        }
        if jets.any() {
            let max = settings.max_ship_speed;
            vel.x = constrain_range(vel.x, -max, max);
            vel.y = constrain_range(vel.y, -max, max);
        }
        self.jets = jets;
    }

    /// Collect a power-up. Returns its flavour.
    pub fn pickup(&mut self, pow_up: &mut Entity, settings: &Settings, modifiers: &mut Modifiers) -> PowerMode {
        pow_up.active = false;
        let flavour = pow_up.state;
        let current = self.mode();

        if flavour != PowerMode::Plain {
            modifiers.exit(current);
        }
        modifiers.enter(flavour, settings);

        self.banner = Some(PowUpBanner {
            flavour,
            scale: settings.pow_up_text_scale,
            timeout_ms: settings.pow_up_text_timeout,
        });

        if flavour == PowerMode::Plain {
            self.entity.lives += 1;
        } else {
            if current == flavour {
                self.state_timeout += settings.pow_up_state_timeout;
            } else {
                self.state_timeout = settings.pow_up_state_timeout;
            }
            self.entity.state = flavour;
        }
        log::info!("Picked up {} ({} lives)", flavour.as_str(), self.entity.lives);
        flavour
    }

    /// Lose a life.
    ///
    /// With lives left the ship keeps drifting invisibly at the square root
    /// of its speed (never slower than the barrier) so it stays near the
    /// debris; on the last life it stops dead at the barrier speed.
    pub fn kill(&mut self, settings: &Settings, modifiers: &mut Modifiers) -> KillOutcome {
        self.entity.kill();
        self.entity.lives = self.entity.lives.saturating_sub(1);
        self.moving = false;
        self.jets = Jets::default();
        self.banner = None;
        modifiers.clear();

        let barrier = settings.barrier_speed;
        if self.entity.lives == 0 {
            self.entity.flags = Flags::NONE;
            self.entity.vel = DVec2::new(barrier, 0.0);
            log::info!("Ship destroyed, no lives left");
            KillOutcome::GameOver
        } else {
            self.entity.flags = Flags::MOVE;
            let signed_sqrt = |v: f64| v.signum() * v.abs().sqrt();
            let vel = self.entity.vel;
            self.entity.vel = DVec2::new(signed_sqrt(vel.x).max(barrier), signed_sqrt(vel.y));
            log::info!("Ship destroyed, {} lives left", self.entity.lives);
            KillOutcome::DeadPause
        }
    }

    /// Bring the ship back after a dead pause, briefly invincible
    pub fn respawn(&mut self, settings: &Settings) {
        self.entity.flags = Flags::ALL;
        self.entity.explosion = None;
        self.set_mode(PowerMode::Invincible, settings.invincible_pause_length);
    }

    /// React to touching `rock` according to the current power mode
    pub fn hit_rock(&mut self, rock: &mut Entity, settings: &Settings, modifiers: &mut Modifiers) -> RockContact {
        match self.mode() {
            PowerMode::Plain | PowerMode::Slowdown | PowerMode::EngineBlast => {
                let outcome = self.kill(settings, modifiers);
                rock.kill();
                RockContact::Destroyed(outcome)
            }
            PowerMode::Shields => {
                bounce(&mut self.entity, rock);
                RockContact::Bounced
            }
            PowerMode::Attack => {
                bounce(&mut self.entity, rock);
                rock.kill();
                RockContact::Smashed
            }
            PowerMode::Invincible => {
                self.alpha = ALPHA_PHASED;
                self.transparent = true;
                self.transp_timeout = PHASE_MS;
                RockContact::Phased
            }
        }
    }

    /// Count the power mode down. Returns the mode that just ran out.
    pub fn update_state(&mut self, frame_ms: f64, modifiers: &mut Modifiers) -> Option<PowerMode> {
        if self.state_timeout > 0.0 {
            self.state_timeout -= frame_ms;
            return None;
        }
        let expired = self.mode();
        if expired == PowerMode::Plain {
            return None;
        }
        modifiers.exit(expired);
        self.entity.state = PowerMode::Plain;
        Some(expired)
    }

    pub fn update_transparency(&mut self, frame_ms: f64) {
        if self.transp_timeout > 0.0 {
            self.transp_timeout -= frame_ms;
            return;
        }
        if self.transparent {
            self.alpha = ALPHA_OPAQUE;
            self.transparent = false;
        }
    }

    /// Flash when the power mode is about to run out
    pub fn blink(&mut self) {
        if self.state_timeout > 0.0 && self.state_timeout < BLINK_WARNING_MS && !self.transparent {
            self.alpha = ALPHA_BLINK;
            self.transparent = true;
            self.transp_timeout = BLINK_MS;
        }
    }

    /// Shrink the banner to full size, then fade it out
    pub fn step_banner(&mut self, frame_ms: f64) {
        let Some(banner) = &mut self.banner else {
            return;
        };
        if banner.scale > 1.0 {
            banner.scale -= BANNER_SHRINK;
            return;
        }
        banner.timeout_ms -= frame_ms;
        if banner.timeout_ms <= 0.0 {
            self.banner = None;
        }
    }

    /// Move with the world and bounce off the viewport edges
    pub fn integrate_and_bounce(&mut self, scroll: DVec2, dt: f64, settings: &Settings) {
        let e = &mut self.entity;
        e.integrate(scroll, dt);
        let (w, h) = (e.width(), e.height());

        if e.pos.x < 0.0 || e.pos.x + w > settings.win_width {
            e.pos.x -= (e.vel.x - scroll.x) * dt;
            e.vel.x = scroll.x - (e.vel.x - scroll.x) * settings.bounciness;
            e.pos.x = constrain(e.pos.x, settings.win_width - w);
        }
        if e.pos.y < 0.0 || e.pos.y + h > settings.win_height {
            e.pos.y -= (e.vel.y - scroll.y) * dt;
            e.vel.y = scroll.y - (e.vel.y - scroll.y) * settings.bounciness;
            e.pos.y = constrain(e.pos.y, settings.win_height - h);
        }
    }
}

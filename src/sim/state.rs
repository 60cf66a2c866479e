//! Game state and core simulation types
//!
//! Everything one game owns lives in [`GameState`]: the seeded RNG, the
//! phase machine, the ship, the entity pools, particles, background and
//! camera. Gameplay outcomes are queued as [`GameEvent`]s for the
//! orchestrator to turn into sound and screen changes.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::dots::Dots;
use super::dust::{DustField, Fog};
use super::entity::PowerMode;
use super::mask::{MaskAtlas, PixelMask, SpriteId, SpriteSet};
use super::modifiers::Modifiers;
use super::ship::Ship;
use super::spawner::{PowUpField, RockField, RockPrototype};
use crate::consts::STATE_FRAMES;
use crate::settings::Settings;

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ship flying
    Playing,
    /// Ship destroyed, waiting to respawn
    DeadPause,
    /// Last life lost; the world keeps running for a moment
    GameOver,
    /// Game finished, ready to leave the screen
    Quit,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted,
    /// Ship and rock collided fatally
    ShipDestroyed { lives_left: u32 },
    GameOver { score_ms: u64 },
    /// A rock burned out under dots or was rammed in Attack mode
    RockDestroyed,
    ShieldBounce,
    /// Invincible ship passed through a rock
    PhaseThrough,
    PowerUpCollected(PowerMode),
    PowerExpired(PowerMode),
    EngineStarted { blast: bool },
    EngineStopped,
    PauseToggled { paused: bool },
    Respawned,
    Quit,
}

/// Size of one column of a sprite strip, or zero if the sprite has no mask
fn frame_size(masks: &MaskAtlas, id: SpriteId, columns: u32) -> DVec2 {
    match masks.get(id) {
        Some(mask) => DVec2::new(
            (mask.width() / columns.max(1)) as f64,
            mask.height() as f64,
        ),
        None => {
            log::warn!("No mask for sprite {}", id.0);
            DVec2::ZERO
        }
    }
}

/// Complete state of one game
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    /// Overlay pause; freezes the simulation without changing phase
    pub paused: bool,
    /// Phase timer in ticks (counts down 3x faster than ticks)
    pub state_timeout: f64,
    /// Survival time
    pub score_ms: u64,
    pub ship: Ship,
    pub rocks: RockField,
    pub pow_ups: PowUpField,
    pub dots: Dots,
    pub dust: DustField,
    pub fog: Fog,
    pub camera: Camera,
    pub modifiers: Modifiers,
    pub masks: MaskAtlas,
    pub sprites: SpriteSet,
    /// Clock time of the last tick
    pub elapsed_ms: u64,
    /// Grows until the owner calls [`GameState::drain_events`]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Start a new game with the given seed and art
    pub fn new(seed: u64, settings: &Settings, masks: MaskAtlas, sprites: SpriteSet) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let ship_size = frame_size(&masks, sprites.ship, STATE_FRAMES);
        let ship = Ship::new(sprites.ship, ship_size.x, ship_size.y, settings);

        let prototypes = sprites
            .rocks
            .iter()
            .filter(|&&id| masks.get(id).is_some())
            .map(|&id| {
                let size = frame_size(&masks, id, settings.n_frames);
                RockPrototype {
                    sprite: id,
                    width: size.x,
                    height: size.y,
                }
            })
            .collect();
        let rocks = RockField::new(prototypes, settings);

        let pow_up_size = frame_size(&masks, sprites.pow_up, STATE_FRAMES);
        let pow_ups = PowUpField::new(&mut rng, sprites.pow_up, pow_up_size.x, pow_up_size.y, settings);

        let dots = Dots::new(&mut rng, settings);
        let dust = DustField::new(&mut rng, settings);

        let background = match sprites.backgrounds.len() {
            0 => None,
            n => Some(sprites.backgrounds[rng.random_range(0..n)]),
        };
        let fog_width = background
            .and_then(|id| masks.get(id))
            .map_or(settings.win_width, |mask| mask.width() as f64);
        let fog = Fog::new(background, fog_width);

        log::info!(
            "New game: seed {seed}, {} rock shapes, {} lives",
            sprites.rocks.len(),
            settings.ship_lives
        );

        Self {
            seed,
            rng,
            phase: GamePhase::Playing,
            paused: false,
            state_timeout: 0.0,
            score_ms: 0,
            ship,
            rocks,
            pow_ups,
            dots,
            dust,
            fog,
            camera: Camera::new(settings.barrier_speed),
            modifiers: Modifiers::default(),
            masks,
            sprites,
            elapsed_ms: 0,
            events: vec![GameEvent::GameStarted],
        }
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take every queued event. Whoever drives `tick` owns
    /// the queue and must drain it once per frame.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Game speed with any Slowdown applied
    pub fn game_speed(&self, settings: &Settings) -> f64 {
        self.modifiers.game_speed(settings)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Quit
    }

    /// Toggle the overlay pause; a finished game cannot be paused
    pub fn toggle_pause(&mut self) {
        if matches!(self.phase, GamePhase::GameOver | GamePhase::Quit) {
            return;
        }
        self.paused = !self.paused;
        if self.paused && self.ship.moving {
            self.ship.moving = false;
            self.events.push(GameEvent::EngineStopped);
        }
        log::debug!("Pause toggled: {}", self.paused);
        self.events.push(GameEvent::PauseToggled { paused: self.paused });
    }
}

/// Procedural stand-in art: solid ship and power-up strips, disc rocks.
///
/// Lets the simulation run headless and in tests without image files.
pub fn placeholder_art(settings: &Settings) -> (MaskAtlas, SpriteSet) {
    let mut masks = MaskAtlas::new();
    let n_frames = settings.n_frames.max(1);

    let ship = masks.insert(PixelMask::solid(40 * STATE_FRAMES, 20));
    let pow_up = masks.insert(PixelMask::from_fn(30 * STATE_FRAMES, 30, |x, y| {
        disc(x % 30, y, 30)
    }));

    let rocks = [16u32, 24, 32, 40, 48, 64]
        .iter()
        .map(|&size| masks.insert(PixelMask::from_fn(size * n_frames, size, move |x, y| disc(x % size, y, size))))
        .collect();

    let explosion_large = masks.insert(PixelMask::from_fn(64 * n_frames, 64, |_, _| false));
    let explosion_small = masks.insert(PixelMask::from_fn(32 * n_frames, 32, |_, _| false));
    let background = masks.insert(PixelMask::from_fn(
        settings.win_width as u32,
        1,
        |_, _| false,
    ));

    let sprites = SpriteSet {
        ship,
        ship_glow: None,
        pow_up,
        pow_up_glow: None,
        rocks,
        explosion_large: Some(explosion_large),
        explosion_small: Some(explosion_small),
        backgrounds: vec![background],
        banners: Vec::new(),
    };
    (masks, sprites)
}

fn disc(x: u32, y: u32, size: u32) -> bool {
    let r = size as f64 / 2.0;
    let dx = x as f64 + 0.5 - r;
    let dy = y as f64 + 0.5 - r;
    dx * dx + dy * dy <= r * r
}

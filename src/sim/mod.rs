//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time arrives as normalised ticks in a [`Frame`]
//! - Seeded RNG only
//! - Stable iteration order (pool slot order)
//! - No rendering or audio dependencies; outcomes leave as [`GameEvent`]s

pub mod camera;
pub mod clock;
pub mod collision;
pub mod dots;
pub mod dust;
pub mod entity;
pub mod mask;
pub mod modifiers;
pub mod physics;
pub mod ship;
pub mod spawner;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use clock::{Frame, SimulationClock};
pub use collision::{bounce, collide, fry, point_hits, push};
pub use dots::{Dot, DotKind, Dots, Jets};
pub use entity::{Entity, EntityKind, Flags, PowerMode, SpinDirection};
pub use mask::{MaskAtlas, MaskError, PixelMask, SpriteId, SpriteSet};
pub use modifiers::Modifiers;
pub use ship::{KillOutcome, RockContact, Ship};
pub use spawner::{Edge, EdgeRates, PowUpField, RockField, RockPrototype, compute_edge_rates};
pub use state::{GameEvent, GamePhase, GameState, placeholder_art};
pub use tick::{TickInput, tick};

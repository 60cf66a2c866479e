//! Per-frame simulation step
//!
//! One call advances the game by the frame's normalised ticks in a fixed
//! order: phase timer and thrust, ship, world movement, spawning,
//! world collisions, then score, exhaust and ship collisions.

use super::clock::Frame;
use super::collision::collide;
use super::dots::Jets;
use super::entity::PowerMode;
use super::ship::{KillOutcome, RockContact};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::GAME_TIMER_RATE;
use crate::platform::Directions;
use crate::settings::Settings;

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Held thrust directions
    pub directions: Directions,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn jets(&self) -> Jets {
        let d = self.directions;
        let mut bits = 0;
        if d.left {
            bits |= Jets::LEFT;
        }
        if d.down {
            bits |= Jets::DOWN;
        }
        if d.right {
            bits |= Jets::RIGHT;
        }
        if d.up {
            bits |= Jets::UP;
        }
        Jets(bits)
    }
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput, frame: &Frame, settings: &Settings) {
    if input.pause {
        state.toggle_pause();
    }
    if state.paused || state.phase == GamePhase::Quit || frame.is_still() {
        return;
    }

    let dt = frame.ticks;
    let frame_ms = frame.delta_ms;
    state.elapsed_ms = frame.elapsed_ms;

    update_phase(state, input, dt, settings);
    update_ship(state, dt, frame_ms, settings);

    let scroll = state.camera.scroll;
    let win = settings.window();
    let engine_blast = state.ship.mode() == PowerMode::EngineBlast;
    let killed = {
        let GameState {
            rocks,
            pow_ups,
            dots,
            dust,
            fog,
            rng,
            masks,
            ..
        } = state;
        rocks.update(scroll, dt, win);
        pow_ups.update(scroll, dt, frame_ms, win);
        let killed = dots.update(
            scroll,
            dt,
            win,
            rocks,
            pow_ups,
            engine_blast,
            settings.dot_mass_unit,
            rng,
        );
        dust.update(scroll, dt, win);
        fog.update(scroll, dt);

        rocks.spawn(rng, scroll, dt, settings);
        pow_ups.spawn(rng, scroll, settings);

        rocks.collide_rocks(masks, settings.n_frames);
        pow_ups.collide_rocks(rocks, masks, settings.n_frames);
        killed
    };
    for _ in 0..killed {
        state.push_event(GameEvent::RockDestroyed);
    }

    if state.phase != GamePhase::GameOver {
        state.score_ms += frame_ms as u64;
        emit_exhaust(state, dt, settings);
        ship_collisions(state, settings);
    }

    animate(state, frame_ms, settings);
}

/// Count the phase timer down, or act on the current phase
fn update_phase(state: &mut GameState, input: &TickInput, dt: f64, settings: &Settings) {
    if state.state_timeout > 0.0 {
        state.state_timeout -= dt * GAME_TIMER_RATE;
        return;
    }

    match state.phase {
        GamePhase::Playing => {
            let jets = input.jets();
            state.ship.thrust(jets, dt, settings);
            if jets.any() && !state.ship.moving {
                state.ship.moving = true;
                let blast = state.ship.mode() == PowerMode::EngineBlast;
                state.push_event(GameEvent::EngineStarted { blast });
            } else if !jets.any() && state.ship.moving {
                state.ship.moving = false;
                state.push_event(GameEvent::EngineStopped);
            }
        }
        GamePhase::DeadPause => {
            state.ship.respawn(settings);
            state.phase = GamePhase::Playing;
            log::info!("Ship respawned");
            state.push_event(GameEvent::Respawned);
        }
        GamePhase::GameOver => {
            state.phase = GamePhase::Quit;
            state.push_event(GameEvent::Quit);
        }
        GamePhase::Quit => {}
    }
}

fn update_ship(state: &mut GameState, dt: f64, frame_ms: f64, settings: &Settings) {
    if let Some(expired) = state.ship.update_state(frame_ms, &mut state.modifiers) {
        log::info!("{} wore off", expired.as_str());
        state.push_event(GameEvent::PowerExpired(expired));
    }
    state.ship.update_transparency(frame_ms);

    let game_speed = state.game_speed(settings);
    state.camera.track(&state.ship.entity, dt, game_speed, settings);
    state.ship.integrate_and_bounce(state.camera.scroll, dt, settings);
}

fn emit_exhaust(state: &mut GameState, dt: f64, settings: &Settings) {
    let jets = state.ship.jets;
    if !jets.any() {
        return;
    }
    let budget = state.modifiers.engine_dots(settings);
    let scroll = state.camera.scroll;
    let GameState { ship, dots, rng, .. } = state;
    dots.emit_engine(
        &ship.entity,
        jets,
        budget,
        settings.thruster_strength,
        scroll,
        dt,
        settings.window(),
        rng,
    );
}

/// Power-ups first, then rocks
fn ship_collisions(state: &mut GameState, settings: &Settings) {
    let n_frames = settings.n_frames;
    let mut events = Vec::new();
    let GameState {
        ship,
        rocks,
        pow_ups,
        dots,
        modifiers,
        rng,
        masks,
        phase,
        state_timeout,
        score_ms,
        ..
    } = state;

    for pow_up in pow_ups.iter_active_mut() {
        if collide(&ship.entity, pow_up, masks, n_frames) {
            let flavour = ship.pickup(pow_up, settings, modifiers);
            events.push(GameEvent::PowerUpCollected(flavour));
        }
    }

    for rock in rocks.iter_mut() {
        if !collide(&ship.entity, rock, masks, n_frames) {
            continue;
        }
        match ship.hit_rock(rock, settings, modifiers) {
            RockContact::Destroyed(outcome) => {
                dots.bang_ship(&ship.entity, rng);
                events.push(GameEvent::ShipDestroyed {
                    lives_left: ship.lives(),
                });
                match outcome {
                    KillOutcome::DeadPause => {
                        *phase = GamePhase::DeadPause;
                        *state_timeout = settings.dead_pause_length;
                    }
                    KillOutcome::GameOver => {
                        *phase = GamePhase::GameOver;
                        *state_timeout = settings.game_over_length;
                        log::info!("Game over after {} ms", score_ms);
                        events.push(GameEvent::GameOver {
                            score_ms: *score_ms,
                        });
                    }
                }
            }
            RockContact::Smashed => {
                dots.bang_rock(rock, rng);
                events.push(GameEvent::RockDestroyed);
            }
            RockContact::Bounced => events.push(GameEvent::ShieldBounce),
            RockContact::Phased => events.push(GameEvent::PhaseThrough),
        }
    }

    for event in events {
        state.push_event(event);
    }
}

/// Per-frame animation: rock frames, explosions, blinking, banner
fn animate(state: &mut GameState, frame_ms: f64, settings: &Settings) {
    state
        .rocks
        .animate(state.elapsed_ms, settings.n_frames, true);
    state.ship.entity.advance_explosion(settings.n_frames);
    state.ship.blink();
    if state.phase == GamePhase::Playing {
        state.ship.step_banner(frame_ms);
    }
}

//! Source/destination rects for everything a game frame shows
//!
//! Sprite sheets are horizontal strips: rocks carry `n_frames` animation
//! columns, the ship and power-ups one column per power mode, explosions and
//! the power-up glow `n_frames` columns each.

use glam::{DVec2, IVec2};

use super::{Color, Rect};
use crate::consts::LARGE_EXPLOSION_WIDTH;
use crate::highscores::format_time;
use crate::settings::Settings;
use crate::sim::dots::DotPool;
use crate::sim::{Entity, EntityKind, GamePhase, GameState, PowerMode, SpriteId};

/// Fog layer alpha
const FOG_ALPHA: u8 = 30;
/// Power-up glow advances one column every this many ms
const GLOW_FRAME_MS: u64 = 75;
const POW_UP_GLOW_MARGIN: f64 = 8.0;
const SHIP_GLOW_MARGIN: f64 = 4.0;
const OPAQUE: u8 = 255;

/// Text weight for HUD lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Small,
    /// Power mode about to run out
    Warning,
    Large,
}

/// One backend-independent draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        sprite: SpriteId,
        src: Rect,
        dest: Rect,
        alpha: u8,
    },
    Points {
        color: Color,
        points: Vec<IVec2>,
    },
    Text {
        text: String,
        pos: IVec2,
        style: TextStyle,
    },
}

fn rect_at(pos: DVec2, size: DVec2) -> Rect {
    Rect::new(pos.x as i32, pos.y as i32, size.x as i32, size.y as i32)
}

fn point(pos: DVec2) -> IVec2 {
    IVec2::new(pos.x as i32, pos.y as i32)
}

/// Builds the draw list for one game frame
struct Frame<'a> {
    state: &'a GameState,
    settings: &'a Settings,
    n_frames: u32,
    out: Vec<DrawCommand>,
}

impl Frame<'_> {
    fn sprite(&mut self, sprite: SpriteId, src: Rect, dest: Rect, alpha: u8) {
        self.out.push(DrawCommand::Sprite {
            sprite,
            src,
            dest,
            alpha,
        });
    }

    fn text(&mut self, text: String, x: i32, y: i32, style: TextStyle) {
        self.out.push(DrawCommand::Text {
            text,
            pos: IVec2::new(x, y),
            style,
        });
    }

    fn sheet_size(&self, id: SpriteId) -> Option<(i32, i32)> {
        self.state
            .masks
            .get(id)
            .map(|mask| (mask.width() as i32, mask.height() as i32))
    }

    fn dust(&mut self) {
        for group in self.state.dust.groups() {
            if group.motes.is_empty() {
                continue;
            }
            let points = group.motes.iter().map(|m| point(m.pos)).collect();
            self.out.push(DrawCommand::Points {
                color: Color::grey(group.shade),
                points,
            });
        }
    }

    /// Two copies of the background, the second one width further along
    fn fog(&mut self) {
        let fog = &self.state.fog;
        let Some(sprite) = fog.sprite else {
            return;
        };
        let Some((_, h)) = self.sheet_size(sprite) else {
            return;
        };
        let screen = Rect::new(0, 0, self.settings.win_width as i32, self.settings.win_height as i32);
        let (x, w) = (fog.offset as i32, fog.width as i32);
        self.sprite(sprite, Rect::new(x, 0, w, h), screen, FOG_ALPHA);
        self.sprite(sprite, Rect::new(x + w, 0, w, h), screen, FOG_ALPHA);
    }

    fn dot_pool(&mut self, pool: &DotPool) {
        for group in 0..pool.n_groups() {
            let points: Vec<IVec2> = pool.group(group).map(|d| point(d.pos)).collect();
            if !points.is_empty() {
                self.out.push(DrawCommand::Points {
                    color: pool.colour(group).into(),
                    points,
                });
            }
        }
    }

    /// Entity strip frame at its position
    fn body(&mut self, e: &Entity, alpha: u8) {
        if !e.is_drawable() {
            return;
        }
        let (w, h) = (e.width() as i32, e.height() as i32);
        let column = e.sheet_column(self.n_frames) as i32;
        self.sprite(e.sprite, Rect::new(column * w, 0, w, h), rect_at(e.pos, e.size()), alpha);
    }

    /// Current explosion frame centred on the entity
    fn explosion(&mut self, e: &Entity) {
        let Some(frame) = e.explosion else {
            return;
        };
        let sprites = &self.state.sprites;
        let strip = if uses_large_explosion(e.kind, e.width()) {
            sprites.explosion_large
        } else {
            sprites.explosion_small
        };
        let Some(strip) = strip else {
            return;
        };
        let Some((sheet_w, h)) = self.sheet_size(strip) else {
            return;
        };
        let fw = sheet_w / self.n_frames.max(1) as i32;
        let half = fw as f64 / 2.0;
        let centre = e.center();
        let dest = Rect::new((centre.x - half) as i32, (centre.y - half) as i32, fw, h);
        self.sprite(strip, Rect::new(fw * frame as i32, 0, fw, h), dest, OPAQUE);
    }

    fn rocks(&mut self) {
        let state = self.state;
        for rock in state.rocks.iter() {
            self.body(rock, OPAQUE);
            self.explosion(rock);
        }
    }

    fn pow_ups(&mut self) {
        let state = self.state;
        let glow = state
            .sprites
            .pow_up_glow
            .and_then(|id| self.sheet_size(id).map(|size| (id, size)));
        let glow_column = (state.elapsed_ms / GLOW_FRAME_MS % self.n_frames.max(1) as u64) as i32;

        for pow_up in state.pow_ups.iter_active() {
            self.body(pow_up, OPAQUE);
            if let Some((id, (sheet_w, h))) = glow
                && pow_up.is_drawable()
            {
                let fw = sheet_w / self.n_frames.max(1) as i32;
                let at = pow_up.pos - DVec2::splat(POW_UP_GLOW_MARGIN);
                self.sprite(
                    id,
                    Rect::new(fw * glow_column, 0, fw, h),
                    Rect::new(at.x as i32, at.y as i32, fw, h),
                    OPAQUE,
                );
            }
            self.explosion(pow_up);
        }
    }

    fn ship(&mut self) {
        let state = self.state;
        let ship = &state.ship;
        self.body(&ship.entity, ship.alpha);

        if ship.moving
            && let Some(id) = state.sprites.ship_glow
            && let Some((w, h)) = self.sheet_size(id)
        {
            let at = ship.entity.pos - DVec2::splat(SHIP_GLOW_MARGIN);
            self.sprite(id, Rect::new(0, 0, w, h), Rect::new(at.x as i32, at.y as i32, w, h), OPAQUE);
        }

        if state.phase == GamePhase::Playing {
            self.banner();
        }
        self.explosion(&ship.entity);
    }

    /// Power-up name, centred, zooming in then fading out
    fn banner(&mut self) {
        let state = self.state;
        let Some(banner) = &state.ship.banner else {
            return;
        };
        let Some(&id) = state.sprites.banners.get(banner.flavour.column() as usize) else {
            return;
        };
        let Some((sw, sh)) = self.sheet_size(id) else {
            return;
        };
        if sh == 0 || banner.scale <= 0.0 {
            return;
        }
        let ratio = sw as f64 / sh as f64;
        let width = sw as f64 / banner.scale;
        let height = width / ratio;
        let x = self.settings.win_width / 2.0 - width / 2.0;
        let y = self.settings.win_height / 2.0 - height / 2.0;
        let alpha = if banner.scale <= 1.0 && banner.timeout_ms <= 255.0 {
            banner.alpha()
        } else {
            OPAQUE
        };
        self.sprite(
            id,
            Rect::new(0, 0, sw, sh),
            Rect::new(x as i32, y as i32, width as i32, height as i32),
            alpha,
        );
    }

    fn hud(&mut self) {
        let state = self.state;
        let (w, h) = (self.settings.win_width as i32, self.settings.win_height as i32);

        self.text(format!("Time: {}", format_time(state.score_ms, false)), 10, 10, TextStyle::Small);
        self.text(format!("Lives: {}", state.ship.lives()), 10, 30, TextStyle::Small);

        let mode = state.ship.mode();
        if mode != PowerMode::Plain && state.phase != GamePhase::GameOver {
            let left = state.ship.state_timeout.max(0.0);
            let style = if left > 1000.0 { TextStyle::Small } else { TextStyle::Warning };
            self.text(format!("{}: {}", mode.as_str(), format_time(left as u64, false)), 10, 50, style);
        }
        if state.paused {
            self.text("Paused".to_string(), w / 2, h / 2, TextStyle::Large);
        }
        if state.phase == GamePhase::GameOver {
            self.text("Game Over".to_string(), w / 2, h / 2, TextStyle::Large);
        }
    }
}

/// Everything to draw for one game frame, back to front
pub fn draw_list(state: &GameState, settings: &Settings) -> Vec<DrawCommand> {
    let mut frame = Frame {
        state,
        settings,
        n_frames: settings.n_frames,
        out: Vec::new(),
    };
    frame.dust();
    frame.fog();
    frame.dot_pool(&state.dots.engine);
    frame.dot_pool(&state.dots.bang);
    frame.rocks();
    frame.pow_ups();
    frame.ship();
    frame.hud();
    frame.out
}

/// Explosion sheet a destroyed entity of this kind and width uses
pub fn uses_large_explosion(kind: EntityKind, width: f64) -> bool {
    match kind {
        EntityKind::Ship => true,
        EntityKind::Rock => width >= LARGE_EXPLOSION_WIDTH,
        EntityKind::PowUp | EntityKind::Particle => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SpinDirection, placeholder_art};

    fn game() -> (Settings, GameState) {
        let settings = Settings::default();
        let (masks, sprites) = placeholder_art(&settings);
        let state = GameState::new(3, &settings, masks, sprites);
        (settings, state)
    }

    fn sprites_of(list: &[DrawCommand], id: SpriteId) -> Vec<(Rect, Rect, u8)> {
        list.iter()
            .filter_map(|c| match c {
                DrawCommand::Sprite {
                    sprite,
                    src,
                    dest,
                    alpha,
                } if *sprite == id => Some((*src, *dest, *alpha)),
                _ => None,
            })
            .collect()
    }

    fn place_rock(state: &mut GameState, direction: SpinDirection, frame: u32) -> SpriteId {
        let id = state.sprites.rocks[2];
        let mut rock = Entity::rock(id, 32.0, 32.0, direction);
        rock.pos = DVec2::new(100.0, 200.0);
        rock.frame = frame;
        state.rocks.insert(0, rock);
        id
    }

    #[test]
    fn test_rock_column_follows_frame_and_direction() {
        let (settings, mut state) = game();
        let id = place_rock(&mut state, SpinDirection::Forward, 3);
        let drawn = sprites_of(&draw_list(&state, &settings), id);
        assert_eq!(drawn, vec![(Rect::new(96, 0, 32, 32), Rect::new(100, 200, 32, 32), 255)]);

        let (settings, mut state) = game();
        let id = place_rock(&mut state, SpinDirection::Reverse, 3);
        let drawn = sprites_of(&draw_list(&state, &settings), id);
        assert_eq!(drawn[0].0, Rect::new(32 * 12, 0, 32, 32));
    }

    #[test]
    fn test_explosion_is_centred_on_rock() {
        let (settings, mut state) = game();
        place_rock(&mut state, SpinDirection::Forward, 0);
        if let Some(rock) = state.rocks.iter_mut().next() {
            rock.kill();
            rock.explosion = Some(5);
        }
        let small = state.sprites.explosion_small.unwrap();
        let list = draw_list(&state, &settings);
        // 32 px rock uses the small 32 px strip: centre (116, 216)
        assert_eq!(
            sprites_of(&list, small),
            vec![(Rect::new(160, 0, 32, 32), Rect::new(100, 200, 32, 32), 255)]
        );
        // dead rock body is not drawn
        assert!(sprites_of(&list, state.sprites.rocks[2]).is_empty());
    }

    #[test]
    fn test_fog_draws_two_halves() {
        let (settings, mut state) = game();
        state.fog.offset = -100.0;
        let fog = state.fog.sprite.unwrap();
        let drawn = sprites_of(&draw_list(&state, &settings), fog);
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn[0].0, Rect::new(-100, 0, 1024, 1));
        assert_eq!(drawn[1].0, Rect::new(924, 0, 1024, 1));
        assert!(drawn.iter().all(|&(_, dest, alpha)| dest == Rect::new(0, 0, 1024, 640) && alpha == 30));
    }

    #[test]
    fn test_ship_uses_mode_column_and_alpha() {
        let (settings, mut state) = game();
        state.ship.entity.state = PowerMode::Shields;
        state.ship.alpha = 80;
        let ship = state.sprites.ship;
        let drawn = sprites_of(&draw_list(&state, &settings), ship);
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].0, Rect::new(40 * 3, 0, 40, 20));
        assert_eq!(drawn[0].2, 80);
    }

    #[test]
    fn test_hud_shows_pause_and_mode() {
        let (settings, mut state) = game();
        state.ship.set_mode(PowerMode::Attack, 900.0);
        state.paused = true;
        let texts: Vec<_> = draw_list(&state, &settings)
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, style, .. } => Some((text, style)),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&("Paused".to_string(), TextStyle::Large)));
        assert!(texts.iter().any(|(t, s)| t.starts_with("Attack") && *s == TextStyle::Warning));
    }

    #[test]
    fn test_dust_first_hud_last() {
        let (settings, state) = game();
        let list = draw_list(&state, &settings);
        assert!(matches!(list.first(), Some(DrawCommand::Points { .. })));
        assert!(matches!(list.last(), Some(DrawCommand::Text { .. })));
    }

    #[test]
    fn test_explosion_size_by_kind() {
        assert!(uses_large_explosion(EntityKind::Ship, 10.0));
        assert!(uses_large_explosion(EntityKind::Rock, 48.0));
        assert!(!uses_large_explosion(EntityKind::Rock, 40.0));
    }
}

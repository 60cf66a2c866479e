//! Rendering module
//!
//! The core only computes what to draw: [`sprites::draw_list`] turns a game
//! state into [`DrawCommand`]s with integer source/destination rects, and
//! [`render`] replays them on any [`Renderer`] backend.

pub mod sprites;

use glam::IVec2;

use crate::sim::SpriteId;

pub use sprites::{DrawCommand, TextStyle, draw_list};

/// Integer rectangle in texture or screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn grey(shade: u8) -> Self {
        Self {
            r: shade,
            g: shade,
            b: shade,
            a: 255,
        }
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Drawing backend
pub trait Renderer {
    /// Copy `src` of a sprite texture to `dest` on screen
    fn draw_sprite(&mut self, sprite: SpriteId, src: Rect, dest: Rect);
    /// Alpha applied to a sprite's later draws
    fn set_alpha(&mut self, sprite: SpriteId, alpha: u8);
    /// Batched single-pixel points
    fn draw_points(&mut self, color: Color, points: &[IVec2]);
    fn draw_text(&mut self, text: &str, pos: IVec2, style: TextStyle);
}

/// Backend that only counts what it is asked to draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullRenderer {
    pub sprites: usize,
    pub points: usize,
    pub texts: usize,
}

impl Renderer for NullRenderer {
    fn draw_sprite(&mut self, _: SpriteId, _: Rect, _: Rect) {
        self.sprites += 1;
    }

    fn set_alpha(&mut self, _: SpriteId, _: u8) {}

    fn draw_points(&mut self, _: Color, points: &[IVec2]) {
        self.points += points.len();
    }

    fn draw_text(&mut self, _: &str, _: IVec2, _: TextStyle) {
        self.texts += 1;
    }
}

/// Replay a draw list
pub fn render(renderer: &mut impl Renderer, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::Sprite {
                sprite,
                src,
                dest,
                alpha,
            } => {
                renderer.set_alpha(*sprite, *alpha);
                renderer.draw_sprite(*sprite, *src, *dest);
            }
            DrawCommand::Points { color, points } => renderer.draw_points(*color, points),
            DrawCommand::Text { text, pos, style } => renderer.draw_text(text, *pos, *style),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replays_every_command() {
        let commands = vec![
            DrawCommand::Sprite {
                sprite: SpriteId(0),
                src: Rect::new(0, 0, 8, 8),
                dest: Rect::new(5, 5, 8, 8),
                alpha: 255,
            },
            DrawCommand::Points {
                color: Color::grey(128),
                points: vec![IVec2::new(1, 2), IVec2::new(3, 4)],
            },
            DrawCommand::Text {
                text: "Paused".to_string(),
                pos: IVec2::ZERO,
                style: TextStyle::Large,
            },
        ];
        let mut renderer = NullRenderer::default();
        render(&mut renderer, &commands);
        assert_eq!(
            renderer,
            NullRenderer {
                sprites: 1,
                points: 2,
                texts: 1
            }
        );
    }

    #[test]
    fn test_color_from_palette_entry() {
        assert_eq!(Color::from([255, 128, 0, 255]), Color { r: 255, g: 128, b: 0, a: 255 });
    }
}

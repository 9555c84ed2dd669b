//! Rendering seam
//!
//! The simulation never talks to a graphics device. Actors describe what
//! should be on screen through the [`Renderer`] trait; positions are in
//! normalized screen space (0..1) and rotations in degrees, so resolution
//! handling stays on the renderer side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const AQUA: Color = Color::rgb(0, 255, 255);
    pub const LAWN_GREEN: Color = Color::rgb(124, 252, 0);
    pub const PINK: Color = Color::rgb(255, 192, 203);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// External renderer interface
pub trait Renderer {
    /// Draw a textured quad centered at `position`
    fn draw_quad(&mut self, sprite: &str, position: Vec2, rotation: f32, scale: Vec2, color: Color);

    /// Draw a line of text with its top-left corner at `position`
    fn draw_text(&mut self, text: &str, position: Vec2, color: Color);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Quad {
        sprite: String,
        position: Vec2,
        rotation: f32,
        scale: Vec2,
        color: Color,
    },
    Text {
        text: String,
        position: Vec2,
        color: Color,
    },
}

/// Renderer that records commands for a frame (handed to the real renderer
/// or inspected by tests)
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    pub commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn quad_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Quad { .. }))
            .count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Renderer for CommandBuffer {
    fn draw_quad(&mut self, sprite: &str, position: Vec2, rotation: f32, scale: Vec2, color: Color) {
        self.commands.push(DrawCommand::Quad {
            sprite: sprite.to_string(),
            position,
            rotation,
            scale,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, position: Vec2, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            color,
        });
    }
}

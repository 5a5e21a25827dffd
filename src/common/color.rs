//! Visual tag carried by each body.

use serde::Deserialize;

/// An RGB colour attached to a body for the renderer.
/// The solver stores it and hands it back; it never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

impl Default for Color {
    /// Bodies spawn white until the application tags them.
    fn default() -> Self {
        Color::WHITE
    }
}

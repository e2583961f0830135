//! Rendering contract
//!
//! The scene never talks to a graphics API. Entities draw through the
//! [`Renderer`] trait and the host decides what a circle or a line becomes.
//! Two backends ship with the engine: [`NullRenderer`] discards everything and
//! [`RecordingRenderer`] keeps a command list for headless runs and tests.

use crate::foundation::math::Vec2;

/// RGBA color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Debug readout green
    pub const LIME: Self = Self::rgba(0.0, 1.0, 0.0, 1.0);

    /// Create a color from RGBA channels
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Gray level on a 0..=100 lightness scale
    pub fn gray(lightness: f32) -> Self {
        let v = (lightness / 100.0).clamp(0.0, 1.0);
        Self::rgba(v, v, v, 1.0)
    }

    /// Create a color from hue (degrees), saturation and lightness (0..=100)
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Self::rgba(r + m, g + m, b + m, 1.0)
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Drawing surface handed to entities during the draw passes
pub trait Renderer {
    /// Filled circle
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Filled polygon given in world coordinates
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    /// Axis-aligned filled rectangle around `center`
    fn fill_rect(&mut self, center: Vec2, size: Vec2, color: Color);

    /// Line segment
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Text anchored at its top-left corner
    fn text(&mut self, position: Vec2, size: f32, text: &str, color: Color);
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled circle
    Circle {
        /// Center point
        center: Vec2,
        /// Radius
        radius: f32,
        /// Fill color
        color: Color,
    },
    /// Filled polygon
    Polygon {
        /// Vertices
        points: Vec<Vec2>,
        /// Fill color
        color: Color,
    },
    /// Filled rectangle
    Rect {
        /// Center point
        center: Vec2,
        /// Width and height
        size: Vec2,
        /// Fill color
        color: Color,
    },
    /// Line segment
    Line {
        /// Start point
        from: Vec2,
        /// End point
        to: Vec2,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Color,
    },
    /// Text label
    Text {
        /// Top-left anchor
        position: Vec2,
        /// Font size
        size: f32,
        /// Contents
        text: String,
        /// Fill color
        color: Color,
    },
}

/// Renderer that discards every call
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Color) {}
    fn fill_polygon(&mut self, _points: &[Vec2], _color: Color) {}
    fn fill_rect(&mut self, _center: Vec2, _size: Vec2, _color: Color) {}
    fn line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _color: Color) {}
    fn text(&mut self, _position: Vec2, _size: f32, _text: &str, _color: Color) {}
}

/// Renderer that records the frame's draw calls in order
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last [`clear`](Self::clear)
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text of every recorded label, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Forget recorded commands (call at the start of each frame)
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::Polygon { points: points.to_vec(), color });
    }

    fn fill_rect(&mut self, center: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Rect { center, size, color });
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }

    fn text(&mut self, position: Vec2, size: f32, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            position,
            size,
            text: text.to_owned(),
            color,
        });
    }
}

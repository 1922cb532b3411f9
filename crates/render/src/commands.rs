use foundation::bounds::Bounds2;
use foundation::math::Vec2;

use crate::color::Rgba;

/// Addressable drawing surface dimensions, in CSS-pixel units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        *self = Self::new(width, height);
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn bounds(&self) -> Bounds2 {
        Bounds2::from_size(self.width, self.height)
    }

    pub fn min_dim(&self) -> f64 {
        self.width.min(self.height)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Retained draw command.
///
/// Engines collect commands into a `RenderFrame`; the host rasterizes them
/// onto whatever canvas-like surface it owns. Command order is paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Full-surface fill. With a translucent color this is the fade wash
    /// that leaves motion trails instead of a hard clear.
    Clear { color: Rgba },
    Disc {
        center: Vec2,
        radius: f64,
        color: Rgba,
    },
    Circle {
        center: Vec2,
        radius: f64,
        stroke: Stroke,
    },
    /// Round-capped line segment.
    Segment {
        from: Vec2,
        to: Vec2,
        stroke: Stroke,
    },
    Path {
        points: Vec<Vec2>,
        closed: bool,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Rect {
        min: Vec2,
        size: Vec2,
        color: Rgba,
    },
    Text {
        origin: Vec2,
        content: String,
        size_px: f64,
        color: Rgba,
        anchor: TextAnchor,
    },
    /// Two-stop radial gradient fill over a disc.
    RadialGradient {
        center: Vec2,
        radius: f64,
        inner: Rgba,
        outer: Rgba,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderFrame {
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

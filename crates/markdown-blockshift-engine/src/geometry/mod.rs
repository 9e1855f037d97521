//! # Pointer Geometry
//!
//! Maps a continuous pointer position to a discrete insertion line and list
//! nesting slot. Screen layout belongs to the host; this module only asks it
//! which line sits under a `y` coordinate and where that line is drawn, and
//! projects marker columns as `columns × char_width`.

pub mod cache;
pub mod resolver;

pub use cache::{TargetCache, TargetKey};
pub use resolver::{ResolvedTarget, TargetResolver};

/// Screen rectangle of one rendered line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRect {
    pub top: f32,
    pub bottom: f32,
    /// X of the line's first text column.
    pub left: f32,
}

impl LineRect {
    #[must_use]
    pub fn mid_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Line layout supplied by the host editor.
pub trait LineGeometry {
    /// 1-based line under the vertical coordinate `y`, if any.
    fn line_at(&self, y: f32) -> Option<usize>;

    /// Where `line` is drawn, or `None` when it has no rendered anchor.
    fn line_rect(&self, line: usize) -> Option<LineRect>;

    /// Width of one monospace column.
    fn char_width(&self) -> f32;
}

/// Uniform grid layout: every line is `line_height` tall and starts at `left`.
///
/// Useful for hosts with fixed-height lines and for tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub line_count: usize,
    pub line_height: f32,
    pub char_width: f32,
    pub left: f32,
}

impl LineGeometry for GridGeometry {
    fn line_at(&self, y: f32) -> Option<usize> {
        if y < 0.0 || self.line_height <= 0.0 {
            return None;
        }
        let line = (y / self.line_height) as usize + 1;
        (line <= self.line_count).then_some(line)
    }

    fn line_rect(&self, line: usize) -> Option<LineRect> {
        if line == 0 || line > self.line_count {
            return None;
        }
        let top = (line - 1) as f32 * self.line_height;
        Some(LineRect {
            top,
            bottom: top + self.line_height,
            left: self.left,
        })
    }

    fn char_width(&self) -> f32 {
        self.char_width
    }
}

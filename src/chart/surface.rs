//! # Drawing Surface
//!
//! Abstraction over an immediate-mode 2D drawing API, so the renderer can
//! target a real canvas, an SVG snapshot or a test recorder.
//!
//! Coordinates are logical pixels with the origin at the top-left corner.
//! A surface knows two sizes: the logical size given by the host layout and
//! the size of its backing pixel buffer. The renderer reconciles the two
//! before every draw.

use super::spec::Color;

/// Size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Point in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Drawing primitives the chart renderer needs.
#[cfg_attr(test, mockall::automock)]
pub trait Surface {
    /// Size assigned by the host layout.
    fn logical_size(&self) -> Size;

    /// Size of the backing pixel buffer.
    fn backing_size(&self) -> Size;

    /// Reallocates the backing buffer. Clears its content.
    fn resize_backing(&mut self, size: Size);

    /// Clears the whole surface and drops any clip.
    fn clear(&mut self);

    /// Restricts subsequent strokes to `rect`; `None` removes the clip.
    fn set_clip(&mut self, rect: Option<Rect>);

    /// Strokes an open polyline.
    fn stroke_path(&mut self, points: &[Point], color: Color, width: f64);

    /// Draws `text` with its baseline starting at `at`.
    fn fill_text(&mut self, text: &str, at: Point, color: Color, font_px: f64);

    /// Advance width of `text` in logical pixels.
    fn measure_text(&self, text: &str, font_px: f64) -> f64;
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clip(Option<Rect>),
    Stroke {
        points: Vec<Point>,
        color: Color,
        width: f64,
    },
    Text {
        text: String,
        at: Point,
        color: Color,
        font_px: f64,
    },
}

/// Average glyph advance relative to the font size, for surfaces without
/// real font metrics.
const APPROX_GLYPH_ADVANCE: f64 = 0.6;

/// Surface that records the commands of the current frame.
///
/// `clear` starts a new frame, so after a draw `commands()` holds exactly
/// what that draw produced. Used for headless runs, SVG snapshots and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    logical: Size,
    backing: Size,
    commands: Vec<DrawCommand>,
    resize_count: u32,
}

impl RecordingSurface {
    /// Creates a surface whose backing buffer has not been allocated yet.
    #[must_use]
    pub fn new(logical: Size) -> Self {
        Self {
            logical,
            backing: Size::default(),
            commands: Vec::new(),
            resize_count: 0,
        }
    }

    /// Simulates a layout change by the host.
    pub fn set_logical_size(&mut self, size: Size) {
        self.logical = size;
    }

    /// Commands drawn since the last `clear`.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of backing buffer reallocations so far.
    #[must_use]
    pub fn resize_count(&self) -> u32 {
        self.resize_count
    }
}

impl Surface for RecordingSurface {
    fn logical_size(&self) -> Size {
        self.logical
    }

    fn backing_size(&self) -> Size {
        self.backing
    }

    fn resize_backing(&mut self, size: Size) {
        self.backing = size;
        self.commands.clear();
        self.resize_count += 1;
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        self.commands.push(DrawCommand::Clip(rect));
    }

    fn stroke_path(&mut self, points: &[Point], color: Color, width: f64) {
        self.commands.push(DrawCommand::Stroke {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, at: Point, color: Color, font_px: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            color,
            font_px,
        });
    }

    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        text.chars().count() as f64 * font_px * APPROX_GLYPH_ADVANCE
    }
}

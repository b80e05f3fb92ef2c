//! # SVG Snapshots
//!
//! Replays a recorded chart frame into an SVG document using plotters'
//! SVG backend. Used to dump the dashboard charts on shutdown.
//!
//! Text anchors are approximated: the recorded position is the text
//! baseline, plotters anchors at the bottom of the text box.
//! The SVG backend has no clip paths, so strokes are clamped into the active
//! clip rectangle instead.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::spec::Color;
use super::surface::{DrawCommand, Point, Rect, Size};
use crate::error::{DashboardError, Result};

/// Background behind every chart snapshot.
pub const SNAPSHOT_BACKGROUND: Color = Color::rgb(0x0b, 0x0f, 0x14);

const FONT_FAMILY: &str = "sans-serif";

fn to_rgba(color: Color) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, color.a)
}

fn to_coord(p: Point, clip: Option<Rect>) -> (i32, i32) {
    debug_assert!(p.x.is_finite() && p.y.is_finite(), "non-finite point {:?}", p);
    let (x, y) = match clip {
        Some(r) => (
            p.x.clamp(r.x, r.x + r.width),
            p.y.clamp(r.y, r.y + r.height),
        ),
        None => (p.x, p.y),
    };
    (x.round() as i32, y.round() as i32)
}

fn snapshot_error<E: std::fmt::Display>(err: E) -> DashboardError {
    DashboardError::Snapshot(err.to_string())
}

/// Renders `commands` on a canvas of `size` and returns the SVG document.
///
/// # Errors
///
/// Returns [`DashboardError::Snapshot`] if plotters fails to emit an element.
pub fn render_svg(commands: &[DrawCommand], size: Size) -> Result<String> {
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, (size.width, size.height)).into_drawing_area();
        root.fill(&to_rgba(SNAPSHOT_BACKGROUND)).map_err(snapshot_error)?;

        let mut clip: Option<Rect> = None;
        for command in commands {
            match command {
                DrawCommand::Clip(rect) => clip = *rect,
                DrawCommand::Stroke { points, color, width } => {
                    let coords: Vec<(i32, i32)> = points.iter().map(|p| to_coord(*p, clip)).collect();
                    let style = ShapeStyle {
                        color: to_rgba(*color),
                        filled: false,
                        stroke_width: width.round().max(1.0) as u32,
                    };
                    root.draw(&PathElement::new(coords, style))
                        .map_err(snapshot_error)?;
                }
                DrawCommand::Text { text, at, color, font_px } => {
                    let style = (FONT_FAMILY, *font_px)
                        .into_font()
                        .color(&to_rgba(*color))
                        .pos(Pos::new(HPos::Left, VPos::Bottom));
                    root.draw_text(text, &style, to_coord(*at, None))
                        .map_err(snapshot_error)?;
                }
            }
        }

        root.present().map_err(snapshot_error)?;
    }
    Ok(out)
}

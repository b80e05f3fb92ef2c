//! # Chart Renderer
//!
//! Draws one chart (several series sharing one autoscaled value range) into a
//! [`Surface`].
//!
//! ## Layout
//!
//! ```text
//!  max ┌ y label ────────────────────┐
//!      │                              │
//!      │- - - - - - - - - - - - - - - │  midline (50%)
//!      │                              │
//!  min └──────────────────────────────┘
//!                  x label
//! ```
//!
//! The left margin holds the min/max labels, the bottom margin the x label.
//! The renderer keeps no state between calls: the same buffers on the same
//! surface size always produce the same frame.

use tracing::{debug, trace};

use super::buffer::SampleBuffer;
use super::scale::{compute_range, PlotRect, ValueRange};
use super::spec::{ChartSpec, Color};
use super::surface::{Point, Rect, Surface};
use crate::format::format_fixed;

/// Margins around the plot rectangle, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 42.0,
            right: 10.0,
            top: 10.0,
            bottom: 26.0,
        }
    }
}

/// Visual parameters of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub margins: Margins,
    pub font_px: f64,
    /// Decimal places of the min/max labels.
    pub value_decimals: usize,
    pub series_width: f64,
    pub axis_width: f64,
    pub axis_color: Color,
    pub midline_color: Color,
    pub text_color: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            font_px: 11.0,
            value_decimals: 1,
            series_width: 2.0,
            axis_width: 1.0,
            axis_color: Color::white(0.18),
            midline_color: Color::white(0.08),
            text_color: Color::white(0.7),
        }
    }
}

/// Offset of the y label baseline above the plot top.
const Y_LABEL_RISE: f64 = 2.0;
/// Offset of the x label baseline above the surface bottom.
const X_LABEL_DROP: f64 = 6.0;
/// Left edge of the min/max value labels.
const VALUE_LABEL_X: f64 = 6.0;
/// Drop of the max value baseline below the plot top.
const MAX_LABEL_DROP: f64 = 10.0;

/// Stateless renderer shared by every chart of a dashboard.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    style: RenderStyle,
}

impl ChartRenderer {
    #[must_use]
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    #[must_use]
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Plot rectangle for a surface of `width` x `height` logical pixels.
    ///
    /// Width and height never go negative on tiny surfaces.
    #[must_use]
    pub fn plot_rect(&self, width: f64, height: f64) -> PlotRect {
        let m = &self.style.margins;
        PlotRect {
            left: m.left,
            top: m.top,
            width: (width - m.left - m.right).max(0.0),
            height: (height - m.top - m.bottom).max(0.0),
        }
    }

    /// Draws `chart` with the samples in `buffers` (one per series, same order).
    ///
    /// Returns the value range the chart was scaled to.
    pub fn draw<S>(&self, surface: &mut S, chart: &ChartSpec, buffers: &[SampleBuffer]) -> ValueRange
    where
        S: Surface + ?Sized,
    {
        let logical = surface.logical_size();
        if surface.backing_size() != logical {
            debug!(
                chart = %chart.id,
                width = logical.width,
                height = logical.height,
                "Resizing chart backing buffer"
            );
            surface.resize_backing(logical);
        }

        let width = f64::from(logical.width);
        let height = f64::from(logical.height);
        let rect = self.plot_rect(width, height);
        let range = compute_range(buffers);

        surface.clear();
        self.draw_frame(surface, rect);
        self.draw_labels(surface, chart, rect, range, height);

        surface.set_clip(Some(Rect {
            x: rect.left,
            y: rect.top,
            width: rect.width,
            height: rect.height,
        }));
        for (series, buffer) in chart.series.iter().zip(buffers) {
            self.draw_series(surface, buffer, series.color, rect, range);
        }
        surface.set_clip(None);

        trace!(chart = %chart.id, min = range.min, max = range.max, "Chart drawn");
        range
    }

    fn draw_frame<S: Surface + ?Sized>(&self, surface: &mut S, rect: PlotRect) {
        let style = &self.style;

        surface.stroke_path(
            &[
                Point::new(rect.left, rect.top),
                Point::new(rect.left, rect.bottom()),
                Point::new(rect.right(), rect.bottom()),
            ],
            style.axis_color,
            style.axis_width,
        );

        let mid = rect.top + rect.height / 2.0;
        surface.stroke_path(
            &[Point::new(rect.left, mid), Point::new(rect.right(), mid)],
            style.midline_color,
            style.axis_width,
        );
    }

    fn draw_labels<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        chart: &ChartSpec,
        rect: PlotRect,
        range: ValueRange,
        height: f64,
    ) {
        let style = &self.style;
        let font = style.font_px;
        let color = style.text_color;

        surface.fill_text(
            &chart.y_label,
            Point::new(rect.left, rect.top - Y_LABEL_RISE),
            color,
            font,
        );

        let x_label_width = surface.measure_text(&chart.x_label, font);
        surface.fill_text(
            &chart.x_label,
            Point::new(rect.left + rect.width / 2.0 - x_label_width / 2.0, height - X_LABEL_DROP),
            color,
            font,
        );

        surface.fill_text(
            &format_fixed(range.max, style.value_decimals),
            Point::new(VALUE_LABEL_X, rect.top + MAX_LABEL_DROP),
            color,
            font,
        );
        surface.fill_text(
            &format_fixed(range.min, style.value_decimals),
            Point::new(VALUE_LABEL_X, rect.bottom()),
            color,
            font,
        );
    }

    /// Strokes one series. Non-finite samples split the line into runs.
    fn draw_series<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        buffer: &SampleBuffer,
        color: Color,
        rect: PlotRect,
        range: ValueRange,
    ) {
        let len = buffer.len();
        let mut run: Vec<Point> = Vec::with_capacity(len);

        for (i, value) in buffer.iter().enumerate() {
            if !value.is_finite() {
                if !run.is_empty() {
                    surface.stroke_path(&run, color, self.style.series_width);
                    run.clear();
                }
                continue;
            }
            let (x, y) = rect.project(i, len, value, range);
            run.push(Point::new(x, y));
        }

        if !run.is_empty() {
            surface.stroke_path(&run, color, self.style.series_width);
        }
    }
}

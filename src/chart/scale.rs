//! # Autoscale
//!
//! Computes the displayed value range of a chart from the samples of all its
//! series, and maps samples into the plot rectangle.
//!
//! ## Range policy
//!
//! - Non-finite samples (NaN, ±∞) are ignored.
//! - No finite samples at all: `[-1, 1]`.
//! - All finite samples equal: `[v - 1, v + 1]`.
//! - Otherwise the observed span is padded by 10% on both ends.
//!
//! ```
//! use amon_ground::chart::buffer::SampleBuffer;
//! use amon_ground::chart::scale::{compute_range, ValueRange};
//!
//! let mut buf = SampleBuffer::new(2)?;
//! buf.push(0.0);
//! buf.push(10.0);
//!
//! assert_eq!(compute_range([&buf]), ValueRange { min: -1.0, max: 11.0 });
//! # Ok::<(), amon_ground::error::DashboardError>(())
//! ```

use super::buffer::SampleBuffer;

/// Fraction of the observed span added above and below the data.
pub const RANGE_PAD_FRACTION: f64 = 0.1;

/// Range used when a chart has no finite samples.
pub const FALLBACK_RANGE: ValueRange = ValueRange { min: -1.0, max: 1.0 };

/// Displayed value range of a chart (`min < max` always holds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Position of `value` within the range, 0.0 at `min` and 1.0 at `max`.
    ///
    /// Works on halves so ranges close to the `f64` limits do not overflow.
    /// A degenerate range maps everything to the middle.
    #[must_use]
    pub fn ratio(&self, value: f64) -> f64 {
        let half_span = self.max / 2.0 - self.min / 2.0;
        if !(half_span.is_finite() && half_span > 0.0) {
            return 0.5;
        }
        (value / 2.0 - self.min / 2.0) / half_span
    }
}

/// Widening applied to a flat series at `value`: one unit, or a few ulps
/// once `value` is too large for `value ± 1` to differ from it.
fn flat_widening(value: f64) -> f64 {
    (value.abs() * f64::EPSILON * 4.0).max(1.0)
}

/// Scans every sample of every series and returns the padded display range.
pub fn compute_range<'a, I>(series: I) -> ValueRange
where
    I: IntoIterator<Item = &'a SampleBuffer>,
{
    let (min, max) = series
        .into_iter()
        .flat_map(SampleBuffer::iter)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return FALLBACK_RANGE;
    }

    if min == max {
        let widen = flat_widening(min);
        return ValueRange {
            min: (min - widen).max(f64::MIN),
            max: (max + widen).min(f64::MAX),
        };
    }

    // Half-span first: `max - min` overflows for spreads near the f64 limits.
    let pad = (max / 2.0 - min / 2.0) * (2.0 * RANGE_PAD_FRACTION);
    ValueRange {
        min: (min - pad).max(f64::MIN),
        max: (max + pad).min(f64::MAX),
    }
}

/// Plot rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Maps sample `index` of `len` with `value` to a point in the rectangle.
    ///
    /// Higher values land higher on screen. A single-sample window sits on the
    /// left edge.
    #[must_use]
    pub fn project(&self, index: usize, len: usize, value: f64, range: ValueRange) -> (f64, f64) {
        let x_ratio = if len > 1 {
            index as f64 / (len - 1) as f64
        } else {
            0.0
        };
        let x = self.left + x_ratio * self.width;
        let y = self.top + (1.0 - range.ratio(value)) * self.height;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(values: &[f64]) -> SampleBuffer {
        let mut buf = SampleBuffer::new(values.len()).unwrap();
        for &v in values {
            buf.push(v);
        }
        buf
    }

    #[test]
    fn test_all_zero_series() {
        let buf = buffer_of(&[0.0, 0.0, 0.0]);
        assert_eq!(compute_range([&buf]), ValueRange { min: -1.0, max: 1.0 });
    }

    #[test]
    fn test_flat_series_expands_by_one() {
        let buf = buffer_of(&[5.0, 5.0, 5.0]);
        assert_eq!(compute_range([&buf]), ValueRange { min: 4.0, max: 6.0 });
    }

    #[test]
    fn test_span_padded_by_ten_percent() {
        let buf = buffer_of(&[0.0, 10.0]);
        assert_eq!(compute_range([&buf]), ValueRange { min: -1.0, max: 11.0 });
    }

    #[test]
    fn test_all_nan_falls_back() {
        let buf = buffer_of(&[f64::NAN, f64::NAN, f64::NAN]);
        assert_eq!(compute_range([&buf]), FALLBACK_RANGE);
    }

    #[test]
    fn test_infinities_are_ignored() {
        let buf = buffer_of(&[f64::NEG_INFINITY, 2.0, f64::NAN, 4.0, f64::INFINITY]);
        let range = compute_range([&buf]);
        assert!((range.min - 1.8).abs() < 1e-12);
        assert!((range.max - 4.2).abs() < 1e-12);
    }

    #[test]
    fn test_only_infinities_falls_back() {
        let buf = buffer_of(&[f64::INFINITY, f64::NEG_INFINITY]);
        assert_eq!(compute_range([&buf]), FALLBACK_RANGE);
    }

    #[test]
    fn test_range_spans_all_series() {
        let a = buffer_of(&[0.0, 1.0, 2.0]);
        let b = buffer_of(&[-20.0, 0.0, 0.0]);
        let c = buffer_of(&[f64::NAN, 20.0, 0.0]);

        let range = compute_range([&a, &b, &c]);
        assert!((range.min - -24.0).abs() < 1e-12);
        assert!((range.max - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_huge_flat_series_keeps_a_span() {
        let buf = buffer_of(&[1e17, 1e17, 1e17]);
        let range = compute_range([&buf]);

        assert!(range.min < 1e17 && range.max > 1e17);
        assert_eq!(range.ratio(1e17), 0.5);
    }

    #[test]
    fn test_spread_near_f64_limits_stays_finite() {
        let buf = buffer_of(&[-1e308, 1e308]);
        let range = compute_range([&buf]);

        assert!(range.min.is_finite() && range.max.is_finite());
        assert!(range.min < -1e308 && range.max > 1e308);

        let rect = PlotRect { left: 42.0, top: 10.0, width: 308.0, height: 144.0 };
        for (i, v) in [-1e308, 1e308].into_iter().enumerate() {
            let (x, y) = rect.project(i, 2, v, range);
            assert!(x.is_finite() && y.is_finite());
            assert!(y >= rect.top && y <= rect.bottom());
        }
    }

    #[test]
    fn test_ratio_of_degenerate_range_is_centred() {
        let flat = ValueRange { min: 3.0, max: 3.0 };
        assert_eq!(flat.ratio(3.0), 0.5);

        let unbounded = ValueRange { min: f64::NEG_INFINITY, max: f64::INFINITY };
        assert_eq!(unbounded.ratio(0.0), 0.5);
    }

    #[test]
    fn test_no_series_falls_back() {
        let none: [&SampleBuffer; 0] = [];
        assert_eq!(compute_range(none), FALLBACK_RANGE);
    }

    #[test]
    fn test_project_endpoints_hit_rect_corners() {
        let rect = PlotRect { left: 42.0, top: 10.0, width: 308.0, height: 144.0 };
        let range = ValueRange { min: -3.0, max: 7.0 };

        let (x0, y0) = rect.project(0, 5, -3.0, range);
        assert_eq!(x0, rect.left);
        assert_eq!(y0, rect.bottom());

        let (x4, y4) = rect.project(4, 5, 7.0, range);
        assert_eq!(x4, rect.right());
        assert_eq!(y4, rect.top);
    }

    #[test]
    fn test_project_midpoint() {
        let rect = PlotRect { left: 0.0, top: 0.0, width: 100.0, height: 50.0 };
        let range = ValueRange { min: 0.0, max: 10.0 };
        assert_eq!(rect.project(1, 3, 5.0, range), (50.0, 25.0));
    }

    #[test]
    fn test_project_single_sample_sits_on_left_edge() {
        let rect = PlotRect { left: 12.0, top: 0.0, width: 100.0, height: 50.0 };
        let (x, y) = rect.project(0, 1, 0.0, FALLBACK_RANGE);
        assert_eq!(x, 12.0);
        assert_eq!(y, 25.0);
    }
}

//! # Dashboard State
//!
//! Owns every chart of the dashboard together with its sample buffers and
//! drawing surface. The host constructs one [`DashboardState`] at startup and
//! drives it from its own timer by calling [`DashboardState::tick`].
//!
//! ## Usage
//!
//! ```
//! use std::collections::HashMap;
//! use amon_ground::chart::renderer::ChartRenderer;
//! use amon_ground::chart::spec::{ChartSpec, Color};
//! use amon_ground::chart::surface::{RecordingSurface, Size};
//! use amon_ground::dashboard::state::DashboardState;
//!
//! let specs = vec![ChartSpec::new(
//!     "chartAlt",
//!     "m",
//!     "time (s)",
//!     vec![("alt".to_string(), Color::rgb(0x3f, 0xd2, 0xb6))],
//! )];
//! let mut dashboard = DashboardState::from_specs(specs, 4, ChartRenderer::default(), |_| {
//!     RecordingSurface::new(Size::new(360, 180))
//! })?;
//!
//! dashboard.tick(&HashMap::from([("alt".to_string(), 2.0)]));
//!
//! let alt = dashboard.chart("chartAlt").and_then(|c| c.buffer("alt")).unwrap();
//! assert_eq!(alt.to_vec(), vec![0.0, 0.0, 0.0, 2.0]);
//! # Ok::<(), amon_ground::error::DashboardError>(())
//! ```

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::chart::buffer::SampleBuffer;
use crate::chart::renderer::ChartRenderer;
use crate::chart::scale::ValueRange;
use crate::chart::spec::ChartSpec;
use crate::chart::surface::Surface;
use crate::error::Result;

/// Values for one tick, keyed by series key.
pub type SeriesValues = HashMap<String, f64>;

/// Value pushed for a series whose key is missing from a tick.
pub const MISSING_SAMPLE: f64 = 0.0;

/// A chart with its own buffers and drawing surface.
#[derive(Debug)]
pub struct ChartState<S> {
    spec: ChartSpec,
    buffers: Vec<SampleBuffer>,
    surface: S,
}

impl<S: Surface> ChartState<S> {
    /// Creates the chart with one zero-filled buffer of `buffer_len` per series.
    ///
    /// # Errors
    ///
    /// Returns an error if `buffer_len` is zero.
    pub fn new(spec: ChartSpec, buffer_len: usize, surface: S) -> Result<Self> {
        let buffers = spec
            .series
            .iter()
            .map(|_| SampleBuffer::new(buffer_len))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            spec,
            buffers,
            surface,
        })
    }

    #[must_use]
    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    /// Buffers in series order.
    #[must_use]
    pub fn buffers(&self) -> &[SampleBuffer] {
        &self.buffers
    }

    /// Buffer of the series with `key`.
    #[must_use]
    pub fn buffer(&self, key: &str) -> Option<&SampleBuffer> {
        self.spec
            .series
            .iter()
            .position(|s| s.key == key)
            .map(|i| &self.buffers[i])
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Pushes one value per series, [`MISSING_SAMPLE`] for absent keys.
    pub fn push(&mut self, values: &SeriesValues) {
        for (series, buffer) in self.spec.series.iter().zip(self.buffers.iter_mut()) {
            let value = values.get(&series.key).copied().unwrap_or(MISSING_SAMPLE);
            buffer.push(value);
        }
    }

    /// Draws the chart onto its surface.
    pub fn redraw(&mut self, renderer: &ChartRenderer) -> ValueRange {
        renderer.draw(&mut self.surface, &self.spec, &self.buffers)
    }
}

/// All charts of the dashboard, in registration order.
#[derive(Debug)]
pub struct DashboardState<S> {
    charts: Vec<ChartState<S>>,
    renderer: ChartRenderer,
    buffer_len: usize,
    ticks: u64,
}

impl<S: Surface> DashboardState<S> {
    /// Creates an empty dashboard.
    #[must_use]
    pub fn new(renderer: ChartRenderer, buffer_len: usize) -> Self {
        Self {
            charts: Vec::new(),
            renderer,
            buffer_len,
            ticks: 0,
        }
    }

    /// Creates a dashboard with one chart per spec, each on the surface
    /// returned by `make_surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if `buffer_len` is zero.
    pub fn from_specs<I, F>(
        specs: I,
        buffer_len: usize,
        renderer: ChartRenderer,
        mut make_surface: F,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = ChartSpec>,
        F: FnMut(&ChartSpec) -> S,
    {
        let mut dashboard = Self::new(renderer, buffer_len);
        for spec in specs {
            let surface = make_surface(&spec);
            dashboard.add_chart(spec, surface)?;
        }
        Ok(dashboard)
    }

    /// Registers a chart. Charts are ticked and drawn in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the dashboard's buffer length is zero.
    pub fn add_chart(&mut self, spec: ChartSpec, surface: S) -> Result<()> {
        debug!(chart = %spec.id, series = spec.series.len(), "Registering chart");
        let chart = ChartState::new(spec, self.buffer_len, surface)?;
        self.charts.push(chart);
        Ok(())
    }

    /// Pushes one value per series into every chart, then redraws each chart
    /// right after its buffers changed.
    pub fn tick(&mut self, values: &SeriesValues) {
        for chart in &mut self.charts {
            chart.push(values);
            chart.redraw(&self.renderer);
        }
        self.ticks += 1;
        trace!(tick = self.ticks, charts = self.charts.len(), "Dashboard ticked");
    }

    /// Redraws every chart without pushing samples, e.g. after a layout change.
    pub fn redraw_all(&mut self) {
        for chart in &mut self.charts {
            chart.redraw(&self.renderer);
        }
    }

    #[must_use]
    pub fn charts(&self) -> &[ChartState<S>] {
        &self.charts
    }

    pub fn charts_mut(&mut self) -> &mut [ChartState<S>] {
        &mut self.charts
    }

    /// Chart with the given id.
    #[must_use]
    pub fn chart(&self, id: &str) -> Option<&ChartState<S>> {
        self.charts.iter().find(|c| c.spec.id == id)
    }

    #[must_use]
    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

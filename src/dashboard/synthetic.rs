//! # Synthetic Signal
//!
//! Deterministic demo signal used while no drone is streaming telemetry.
//!
//! Each call to [`SyntheticSignal::next_values`] advances a simulated clock by
//! one chart period and evaluates a fixed set of sine/cosine curves for every
//! default series key. The same sequence of calls always yields the same
//! values, so dashboards can be tested without a backend.

use super::state::SeriesValues;
use crate::telemetry::snapshot::Attitude;

/// Standard gravity, offset of the synthetic vertical acceleration.
const GRAVITY: f64 = 9.81;

/// Simulated signal generator advanced once per chart tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSignal {
    time: f64,
    dt: f64,
}

impl SyntheticSignal {
    /// Creates a generator stepping `1 / rate_hz` seconds per sample.
    #[must_use]
    pub fn new(rate_hz: u32) -> Self {
        Self {
            time: 0.0,
            dt: 1.0 / f64::from(rate_hz.max(1)),
        }
    }

    /// Simulated seconds elapsed.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advances one step and returns the values for every default series.
    pub fn next_values(&mut self) -> SeriesValues {
        self.time += self.dt;
        Self::values_at(self.time)
    }

    /// Attitude at the current simulated time, in degrees.
    #[must_use]
    pub fn attitude(&self) -> Attitude {
        let t = self.time;
        Attitude {
            roll: (t * 0.6).sin() * 5.0,
            pitch: (t * 0.5).cos() * 4.0,
            yaw: (t * 0.3).sin() * 10.0,
        }
    }

    /// Values of every default series at time `t`.
    #[must_use]
    pub fn values_at(t: f64) -> SeriesValues {
        let attitude = Self { time: t, dt: 0.0 }.attitude();

        [
            ("gx", t.sin() * 1.5),
            ("gy", (t * 0.8).cos() * 1.2),
            ("gz", (t * 0.6).sin() * 1.1),
            ("ax", (t * 0.9).sin() * 0.8),
            ("ay", (t * 0.7).cos() * 0.7),
            ("az", GRAVITY + (t * 0.4).sin() * 0.3),
            ("oriX", attitude.roll),
            ("oriY", attitude.pitch),
            ("oriZ", attitude.yaw),
            ("oriXRef", 0.0),
            ("oriYRef", 0.0),
            ("oriZRef", 0.0),
            ("alt", 2.0 + (t * 0.2).sin() * 0.5),
            ("altRef", 2.2),
            ("posX", (t * 0.4).sin() * 1.2),
            ("posY", (t * 0.3).cos() * 1.1),
            ("posRef", 0.0),
            ("velX", (t * 0.4).cos() * 0.8),
            ("velY", (t * 0.3).sin() * 0.7),
            ("velRef", 0.0),
            ("thr", 45.0 + (t * 0.6).sin() * 5.0),
            ("thrRef", 50.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

//! # Sample Buffer
//!
//! Fixed-length window of the most recent samples of one series.
//!
//! The buffer always holds exactly `N` values, oldest first. It starts filled
//! with zeros and every push evicts the oldest sample, so a chart always has a
//! full window to draw even before any telemetry arrived.
//!
//! ## Usage
//!
//! ```
//! use amon_ground::chart::buffer::SampleBuffer;
//!
//! let mut buf = SampleBuffer::new(3)?;
//! buf.push(1.0);
//! buf.push(2.0);
//!
//! assert_eq!(buf.to_vec(), vec![0.0, 1.0, 2.0]);
//! assert_eq!(buf.len(), 3);
//! # Ok::<(), amon_ground::error::DashboardError>(())
//! ```

use std::collections::VecDeque;

use crate::error::{DashboardError, Result};

/// Rolling FIFO window of `f64` samples with a constant length.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: VecDeque<f64>,
}

impl SampleBuffer {
    /// Creates a buffer of `len` zeros.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidBufferLength`] if `len` is zero.
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(DashboardError::InvalidBufferLength(len));
        }
        let mut samples = VecDeque::with_capacity(len);
        samples.resize(len, 0.0);
        Ok(Self { samples })
    }

    /// Appends `value` as the newest sample and drops the oldest one.
    ///
    /// Non-finite values are stored unchanged; the scaler skips them.
    pub fn push(&mut self, value: f64) {
        self.samples.pop_front();
        self.samples.push_back(value);
    }

    /// Returns the window as two slices, oldest to newest.
    ///
    /// Concatenating the first and second slice yields the full window.
    #[must_use]
    pub fn values(&self) -> (&[f64], &[f64]) {
        self.samples.as_slices()
    }

    /// Iterates over the window, oldest to newest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// Copies the window into a `Vec`, oldest to newest.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Number of samples held (always the construction length).
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; a buffer holds at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Most recently pushed sample.
    #[must_use]
    pub fn latest(&self) -> f64 {
        self.samples.back().copied().unwrap_or(0.0)
    }
}

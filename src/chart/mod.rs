//! # Chart Module
//!
//! Rolling sample windows and the autoscaled line-chart renderer.
//!
//! This module handles:
//! - Fixed-length FIFO sample buffers, one per series
//! - Autoscaled value ranges across all series of a chart
//! - Drawing axes, labels and series polylines into a [`surface::Surface`]
//! - SVG snapshots of recorded frames

pub mod buffer;
pub mod renderer;
pub mod scale;
pub mod spec;
pub mod surface;
pub mod svg;

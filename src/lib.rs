//! # AMON Ground Library
//!
//! Dashboard core for the AMON drone ground station.
//!
//! This library keeps rolling sample windows per telemetry series, autoscales
//! and draws multi-series line charts onto an abstract 2D surface, and talks to
//! the local ground backend that owns the serial link to the drone.
//!
//! Timers belong to the host: it calls [`dashboard::state::DashboardState::tick`]
//! with one value per series, and each chart redraws right away.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod telemetry;

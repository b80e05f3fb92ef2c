//! # Dashboard Module
//!
//! Host-facing orchestration of the charts.
//!
//! This module handles:
//! - Owning every chart, its buffers and surface ([`state::DashboardState`])
//! - Applying one tick of series values and redrawing
//! - The deterministic synthetic signal used while the drone is offline
//! - Mission and wall clocks

pub mod clock;
pub mod state;
pub mod synthetic;

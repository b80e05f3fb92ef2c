//! # Telemetry Module
//!
//! Live data from the ground backend.
//!
//! This module handles:
//! - Decoding telemetry snapshots (JSON) and mapping them to chart series
//! - Attitude angles for the model viewer and formatted panel readouts
//! - Polling the backend over HTTP (telemetry, link status, ports)
//! - Discarding responses that arrive after the selected drone changed

pub mod client;
pub mod generation;
pub mod snapshot;

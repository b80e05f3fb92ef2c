//! # Telemetry Snapshot
//!
//! JSON model of the telemetry document served by the ground backend, plus
//! the conversions the dashboard needs from it: series values for the charts,
//! attitude for the 3D viewer and formatted readouts for the side panels.
//!
//! Every field has a default, so partial documents decode to a snapshot with
//! zeros in the missing places, matching the backend's idle payload.

use serde::Deserialize;

use crate::dashboard::state::SeriesValues;
use crate::format::format_fixed;

/// Roll, pitch and yaw in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Attitude {
    /// Angles in radians, in (roll, pitch, yaw) order, for the model viewer.
    #[must_use]
    pub fn to_radians(&self) -> (f64, f64, f64) {
        (self.roll.to_radians(), self.pitch.to_radians(), self.yaw.to_radians())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Accel {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Gyro {
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
}

/// Thrust-vector deflection per axis, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Tvc {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One telemetry document from the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetrySnapshot {
    pub flight_state: String,
    pub battery_v: f64,
    pub signal_dbm: f64,
    pub tlm_rate: f64,
    pub gps_sat: u32,
    pub imu_temp: f64,
    pub baro_alt: f64,
    pub orientation: Attitude,
    pub velocity: Velocity,
    pub position: Position,
    pub accel: Accel,
    pub gyro: Gyro,
    pub throttle: f64,
    pub tvc: Tvc,
    pub link_quality: f64,
    pub link_latency: f64,
    pub packet_loss: f64,
    pub mode: String,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self::zero()
    }
}

/// `v` when positive, otherwise `+0.0` (never `-0.0`).
fn positive_part(v: f64) -> f64 {
    if v > 0.0 {
        v
    } else {
        0.0
    }
}

/// One labelled value of the telemetry panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readout {
    pub label: &'static str,
    pub text: String,
}

impl TelemetrySnapshot {
    /// Snapshot shown while nothing is received: all zeros, idle state.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            flight_state: "Idle".to_string(),
            battery_v: 0.0,
            signal_dbm: 0.0,
            tlm_rate: 0.0,
            gps_sat: 0,
            imu_temp: 0.0,
            baro_alt: 0.0,
            orientation: Attitude::default(),
            velocity: Velocity::default(),
            position: Position::default(),
            accel: Accel::default(),
            gyro: Gyro::default(),
            throttle: 0.0,
            tvc: Tvc::default(),
            link_quality: 0.0,
            link_latency: 0.0,
            packet_loss: 0.0,
            mode: "-".to_string(),
        }
    }

    /// Decodes a backend JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a JSON object of the expected shape.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The drone counts as online while telemetry frames are arriving.
    #[must_use]
    pub fn is_drone_online(&self) -> bool {
        self.tlm_rate > 0.0
    }

    /// Horizontal speed over ground, `hypot(vx, vy)`.
    #[must_use]
    pub fn ground_speed(&self) -> f64 {
        self.velocity.vx.hypot(self.velocity.vy)
    }

    /// Chart values keyed by series key.
    ///
    /// Reference series (`*Ref`) are not part of telemetry and are left out.
    #[must_use]
    pub fn series_values(&self) -> SeriesValues {
        [
            ("gx", self.gyro.gx),
            ("gy", self.gyro.gy),
            ("gz", self.gyro.gz),
            ("ax", self.accel.ax),
            ("ay", self.accel.ay),
            ("az", self.accel.az),
            ("oriX", self.orientation.roll),
            ("oriY", self.orientation.pitch),
            ("oriZ", self.orientation.yaw),
            ("alt", self.baro_alt),
            ("posX", self.position.x),
            ("posY", self.position.y),
            ("velX", self.velocity.vx),
            ("velY", self.velocity.vy),
            ("thr", self.throttle),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Formatted panel fields with units.
    #[must_use]
    pub fn readouts(&self) -> Vec<Readout> {
        let r = |label: &'static str, text: String| Readout { label, text };
        let deg = |v: f64| format!("{} deg", format_fixed(v, 2));

        vec![
            r("flight_state", self.flight_state.clone()),
            r("battery", format!("{} V", format_fixed(self.battery_v, 2))),
            r("signal", format!("{} dBm", format_fixed(self.signal_dbm, 0))),
            r("tlm_rate", format!("{} Hz", format_fixed(self.tlm_rate, 2))),
            r("gps_sat", self.gps_sat.to_string()),
            r("imu_temp", format!("{} C", format_fixed(self.imu_temp, 1))),
            r("baro_alt", format!("{} m", format_fixed(self.baro_alt, 1))),
            r("roll", format!("{} deg", format_fixed(self.orientation.roll, 1))),
            r("pitch", format!("{} deg", format_fixed(self.orientation.pitch, 1))),
            r("yaw", format!("{} deg", format_fixed(self.orientation.yaw, 1))),
            r("ground_speed", format!("{} m/s", format_fixed(self.ground_speed(), 1))),
            r("climb_rate", format!("{} m/s", format_fixed(self.velocity.vz, 2))),
            r("heading", format!("{} deg", format_fixed(self.orientation.yaw, 1))),
            r("mode", self.mode.clone()),
            r("throttle", format!("{} %", format_fixed(self.throttle, 0))),
            r("tvc_x_pos", deg(positive_part(self.tvc.x))),
            r("tvc_x_neg", deg(positive_part(-self.tvc.x))),
            r("tvc_y_pos", deg(positive_part(self.tvc.y))),
            r("tvc_y_neg", deg(positive_part(-self.tvc.y))),
            r("tvc_z_pos", deg(positive_part(self.tvc.z))),
            r("tvc_z_neg", deg(positive_part(-self.tvc.z))),
            r("link_quality", format!("{} %", format_fixed(self.link_quality, 0))),
            r("link_latency", format!("{} ms", format_fixed(self.link_latency, 0))),
            r("packet_loss", format!("{} %", format_fixed(self.packet_loss, 1))),
        ]
    }
}

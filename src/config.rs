//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section is optional; missing sections and fields fall back to the
//! defaults below, and a missing `[[charts]]` list yields the standard
//! nine-chart flight dashboard.

use serde::de::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::chart::renderer::{Margins, RenderStyle};
use crate::chart::spec::{ChartSpec, Color};
use crate::error::{DashboardError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartConfig>,
}

/// Tick rates and buffer sizing
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_buffer_len")]
    pub buffer_len: usize,

    #[serde(default = "default_chart_hz")]
    pub chart_hz: u32,

    #[serde(default = "default_telemetry_poll_ms")]
    pub telemetry_poll_ms: u64,

    #[serde(default = "default_link_poll_ms")]
    pub link_poll_ms: u64,

    #[serde(default = "default_clock_tick_ms")]
    pub clock_tick_ms: u64,

    #[serde(default = "default_drone")]
    pub drone: String,
}

/// Ground backend connection
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,

    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,
}

/// Chart surface and style
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_margin_left")]
    pub margin_left: f64,

    #[serde(default = "default_margin_right")]
    pub margin_right: f64,

    #[serde(default = "default_margin_top")]
    pub margin_top: f64,

    #[serde(default = "default_margin_bottom")]
    pub margin_bottom: f64,

    #[serde(default = "default_font_px")]
    pub font_px: f64,

    #[serde(default = "default_value_decimals")]
    pub value_decimals: usize,

    #[serde(default = "default_series_width")]
    pub series_width: f64,

    #[serde(default = "default_axis_width")]
    pub axis_width: f64,

    /// Directory for SVG snapshots written on shutdown; empty disables them.
    #[serde(default)]
    pub snapshot_dir: String,
}

/// Log output
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files; empty logs to stdout only.
    #[serde(default)]
    pub dir: String,
}

/// One chart of the dashboard
#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,

    #[serde(default)]
    pub y_label: String,

    #[serde(default = "default_x_label")]
    pub x_label: String,

    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

/// One series of a chart
#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub key: String,
    pub color: Color,
}

// Default value functions
fn default_buffer_len() -> usize { 50 }
fn default_chart_hz() -> u32 { 50 }
fn default_telemetry_poll_ms() -> u64 { 1500 }
fn default_link_poll_ms() -> u64 { 2000 }
fn default_clock_tick_ms() -> u64 { 1000 }
fn default_drone() -> String { "amon".to_string() }

fn default_backend_url() -> String { "http://127.0.0.1:8002".to_string() }
fn default_backend_timeout_ms() -> u64 { 1000 }

fn default_width() -> u32 { 360 }
fn default_height() -> u32 { 180 }
fn default_margin_left() -> f64 { 42.0 }
fn default_margin_right() -> f64 { 10.0 }
fn default_margin_top() -> f64 { 10.0 }
fn default_margin_bottom() -> f64 { 26.0 }
fn default_font_px() -> f64 { 11.0 }
fn default_value_decimals() -> usize { 1 }
fn default_series_width() -> f64 { 2.0 }
fn default_axis_width() -> f64 { 1.0 }

fn default_log_level() -> String { "info".to_string() }

fn default_x_label() -> String { "time (s)".to_string() }

/// Colour of the flat reference lines.
const REFERENCE_COLOR: Color = Color::rgb(0x8a, 0x96, 0xa8);

fn chart(id: &str, y_label: &str, series: &[(&str, Color)]) -> ChartConfig {
    ChartConfig {
        id: id.to_string(),
        y_label: y_label.to_string(),
        x_label: default_x_label(),
        series: series
            .iter()
            .map(|(key, color)| SeriesConfig {
                key: key.to_string(),
                color: *color,
            })
            .collect(),
    }
}

fn default_charts() -> Vec<ChartConfig> {
    let red = Color::rgb(0xf0, 0x6d, 0x6d);
    let teal = Color::rgb(0x3f, 0xd2, 0xb6);
    let amber = Color::rgb(0xf2, 0xb9, 0x6d);
    let sky = Color::rgb(0x6e, 0xd9, 0xff);
    let violet = Color::rgb(0xca, 0xa7, 0xff);
    let green = Color::rgb(0x4d, 0xd6, 0xa3);
    let cyan = Color::rgb(0x63, 0xe0, 0xff);

    vec![
        chart("chartGyro", "deg/s", &[("gx", red), ("gy", teal), ("gz", amber)]),
        chart("chartAccel", "m/s2", &[("ax", sky), ("ay", violet), ("az", teal)]),
        chart("chartOriX", "deg", &[("oriX", amber), ("oriXRef", REFERENCE_COLOR)]),
        chart("chartOriY", "deg", &[("oriY", green), ("oriYRef", REFERENCE_COLOR)]),
        chart("chartOriZ", "deg", &[("oriZ", cyan), ("oriZRef", REFERENCE_COLOR)]),
        chart("chartAlt", "m", &[("alt", teal), ("altRef", REFERENCE_COLOR)]),
        chart("chartPos", "m", &[("posX", red), ("posY", sky), ("posRef", REFERENCE_COLOR)]),
        chart("chartVel", "m/s", &[("velX", amber), ("velY", green), ("velRef", REFERENCE_COLOR)]),
        chart("chartThrottle", "%", &[("thr", teal), ("thrRef", REFERENCE_COLOR)]),
    ]
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            buffer_len: default_buffer_len(),
            chart_hz: default_chart_hz(),
            telemetry_poll_ms: default_telemetry_poll_ms(),
            link_poll_ms: default_link_poll_ms(),
            clock_tick_ms: default_clock_tick_ms(),
            drone: default_drone(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_ms: default_backend_timeout_ms(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            margin_left: default_margin_left(),
            margin_right: default_margin_right(),
            margin_top: default_margin_top(),
            margin_bottom: default_margin_bottom(),
            font_px: default_font_px(),
            value_decimals: default_value_decimals(),
            series_width: default_series_width(),
            axis_width: default_axis_width(),
            snapshot_dir: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: String::new(),
        }
    }
}

impl DashboardConfig {
    /// Interval between chart ticks.
    #[must_use]
    pub fn chart_interval(&self) -> Duration {
        Duration::from_millis((1000 / u64::from(self.chart_hz.max(1))).max(1))
    }
}

impl RenderConfig {
    /// Renderer style with the configured margins, fonts and widths.
    #[must_use]
    pub fn style(&self) -> RenderStyle {
        RenderStyle {
            margins: Margins {
                left: self.margin_left,
                right: self.margin_right,
                top: self.margin_top,
                bottom: self.margin_bottom,
            },
            font_px: self.font_px,
            value_decimals: self.value_decimals,
            series_width: self.series_width,
            axis_width: self.axis_width,
            ..RenderStyle::default()
        }
    }
}

impl ChartConfig {
    #[must_use]
    pub fn to_spec(&self) -> ChartSpec {
        ChartSpec::new(
            self.id.clone(),
            self.y_label.clone(),
            self.x_label.clone(),
            self.series.iter().map(|s| (s.key.clone(), s.color)),
        )
    }
}

fn invalid(msg: impl std::fmt::Display) -> DashboardError {
    DashboardError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails (including malformed colours)
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use amon_ground::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in configuration: defaults everywhere, standard charts.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            charts: default_charts(),
            ..Self::default()
        }
    }

    /// Chart specs in registration order.
    #[must_use]
    pub fn chart_specs(&self) -> Vec<ChartSpec> {
        self.charts.iter().map(ChartConfig::to_spec).collect()
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let dash = &self.dashboard;

        if dash.buffer_len == 0 || dash.buffer_len > 10_000 {
            return Err(invalid("buffer_len must be between 1 and 10000"));
        }

        if dash.chart_hz == 0 || dash.chart_hz > 240 {
            return Err(invalid("chart_hz must be between 1 and 240"));
        }

        for (name, value) in [
            ("telemetry_poll_ms", dash.telemetry_poll_ms),
            ("link_poll_ms", dash.link_poll_ms),
            ("clock_tick_ms", dash.clock_tick_ms),
            ("timeout_ms", self.backend.timeout_ms),
        ] {
            if value == 0 || value > 60_000 {
                return Err(invalid(format!("{} must be between 1 and 60000", name)));
            }
        }

        if dash.drone.is_empty() {
            return Err(invalid("drone cannot be empty"));
        }

        if self.backend.url.is_empty() {
            return Err(invalid("backend url cannot be empty"));
        }

        // Validate render settings
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(invalid("render width and height must be greater than 0"));
        }

        for (name, value) in [
            ("margin_left", render.margin_left),
            ("margin_right", render.margin_right),
            ("margin_top", render.margin_top),
            ("margin_bottom", render.margin_bottom),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be a non-negative number", name)));
            }
        }

        if !(1.0..=96.0).contains(&render.font_px) {
            return Err(invalid("font_px must be between 1 and 96"));
        }

        if render.value_decimals > 6 {
            return Err(invalid("value_decimals must be at most 6"));
        }

        if !(render.series_width > 0.0) || !(render.axis_width > 0.0) {
            return Err(invalid("series_width and axis_width must be greater than 0"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        // Validate charts
        if self.charts.is_empty() {
            return Err(invalid("at least one chart must be configured"));
        }

        let mut chart_ids = HashSet::new();
        for chart in &self.charts {
            if chart.id.is_empty() {
                return Err(invalid("chart id cannot be empty"));
            }
            if !chart_ids.insert(chart.id.as_str()) {
                return Err(invalid(format!("duplicate chart id '{}'", chart.id)));
            }
            if chart.series.is_empty() {
                return Err(invalid(format!("chart '{}' has no series", chart.id)));
            }

            let mut keys = HashSet::new();
            for series in &chart.series {
                if series.key.is_empty() {
                    return Err(invalid(format!("chart '{}' has a series with an empty key", chart.id)));
                }
                if !keys.insert(series.key.as_str()) {
                    return Err(invalid(format!(
                        "chart '{}' lists series '{}' twice",
                        chart.id, series.key
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config::builtin()
    }

    #[test]
    fn test_default_config() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_plain_default_has_no_charts() {
        // `Default` only covers the scalar sections; charts come from serde or `builtin`.
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r##"
[dashboard]
buffer_len = 40

[backend]
url = "http://localhost:9000"

[render]

[logging]

[[charts]]
id = "chartAlt"
y_label = "m"
series = [
    { key = "alt", color = "#3fd2b6" },
    { key = "altRef", color = "#8a96a8" },
]
"##;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.dashboard.buffer_len, 40);
        assert_eq!(config.dashboard.chart_hz, 50);
        assert_eq!(config.backend.url, "http://localhost:9000");
        assert_eq!(config.charts.len(), 1);
        assert_eq!(config.charts[0].x_label, "time (s)");
        assert_eq!(config.charts[0].series[1].color, Color::rgb(0x8a, 0x96, 0xa8));
    }

    #[test]
    fn test_empty_file_uses_standard_dashboard() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.charts.len(), 9);
        assert_eq!(config.dashboard.buffer_len, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/amon-ground.toml");
        assert!(matches!(result, Err(DashboardError::Io(_))));
    }

    #[test]
    fn test_bad_colour_rejected_at_parse() {
        let toml_content = r##"
[[charts]]
id = "chartAlt"
series = [{ key = "alt", color = "teal" }]
"##;
        assert!(matches!(Config::from_toml(toml_content), Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_chart_specs_preserve_order_and_keys() {
        let specs = create_valid_config().chart_specs();
        let ids: Vec<&str> = specs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "chartGyro", "chartAccel", "chartOriX", "chartOriY", "chartOriZ",
                "chartAlt", "chartPos", "chartVel", "chartThrottle",
            ]
        );
        assert_eq!(specs[6].keys().collect::<Vec<_>>(), vec!["posX", "posY", "posRef"]);
        assert!(specs[6].series.iter().all(|s| s.chart == "chartPos"));
    }

    #[test]
    fn test_buffer_len_zero() {
        let mut config = create_valid_config();
        config.dashboard.buffer_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buffer_len_too_high() {
        let mut config = create_valid_config();
        config.dashboard.buffer_len = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buffer_len_one_is_valid() {
        let mut config = create_valid_config();
        config.dashboard.buffer_len = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chart_hz_zero() {
        let mut config = create_valid_config();
        config.dashboard.chart_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chart_hz_too_high() {
        let mut config = create_valid_config();
        config.dashboard.chart_hz = 241;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_telemetry_poll_zero() {
        let mut config = create_valid_config();
        config.dashboard.telemetry_poll_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_link_poll_too_high() {
        let mut config = create_valid_config();
        config.dashboard.link_poll_ms = 60_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_timeout_zero() {
        let mut config = create_valid_config();
        config.backend.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_drone() {
        let mut config = create_valid_config();
        config.dashboard.drone = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_backend_url() {
        let mut config = create_valid_config();
        config.backend.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_render_size() {
        let mut config = create_valid_config();
        config.render.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_margin() {
        let mut config = create_valid_config();
        config.render.margin_left = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_margin() {
        let mut config = create_valid_config();
        config.render.margin_top = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_font_px_out_of_range() {
        let mut config = create_valid_config();
        config.render.font_px = 0.5;
        assert!(config.validate().is_err());
        config.render.font_px = 97.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_value_decimals_too_high() {
        let mut config = create_valid_config();
        config.render.value_decimals = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_series_width() {
        let mut config = create_valid_config();
        config.render.series_width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = create_valid_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let mut config = create_valid_config();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Log level {} should be valid", level);
        }
    }

    #[test]
    fn test_duplicate_chart_id() {
        let mut config = create_valid_config();
        let first = config.charts[0].clone();
        config.charts.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chart_without_series() {
        let mut config = create_valid_config();
        config.charts[0].series.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_series_key_within_chart() {
        let mut config = create_valid_config();
        let first = config.charts[0].series[0].clone();
        config.charts[0].series.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_key_in_two_charts_is_valid() {
        let mut config = create_valid_config();
        config.charts.push(chart("chartOriXMirror", "deg", &[("oriX", REFERENCE_COLOR)]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_series_key() {
        let mut config = create_valid_config();
        config.charts[0].series[0].key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chart_interval() {
        let mut config = create_valid_config();
        assert_eq!(config.dashboard.chart_interval(), Duration::from_millis(20));
        config.dashboard.chart_hz = 240;
        assert_eq!(config.dashboard.chart_interval(), Duration::from_millis(4));
    }

    #[test]
    fn test_render_style_from_config() {
        let mut config = create_valid_config();
        config.render.margin_left = 60.0;
        config.render.value_decimals = 2;

        let style = config.render.style();
        assert_eq!(style.margins.left, 60.0);
        assert_eq!(style.margins.bottom, 26.0);
        assert_eq!(style.value_decimals, 2);
        assert_eq!(style.text_color, Color::white(0.7));
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_buffer_len(), 50);
        assert_eq!(default_chart_hz(), 50);
        assert_eq!(default_telemetry_poll_ms(), 1500);
        assert_eq!(default_link_poll_ms(), 2000);
        assert_eq!(default_clock_tick_ms(), 1000);
        assert_eq!(default_drone(), "amon");
        assert_eq!(default_backend_url(), "http://127.0.0.1:8002");
        assert_eq!(default_backend_timeout_ms(), 1000);
        assert_eq!(default_width(), 360);
        assert_eq!(default_height(), 180);
        assert_eq!(default_font_px(), 11.0);
        assert_eq!(default_value_decimals(), 1);
        assert_eq!(default_series_width(), 2.0);
        assert_eq!(default_axis_width(), 1.0);
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_x_label(), "time (s)");
        assert_eq!(default_charts().len(), 9);
    }
}

//! Static chart and series descriptors.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RGBA colour. Channels are 0-255, alpha is 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// White with the given opacity, used for axes and labels.
    #[must_use]
    pub const fn white(alpha: f64) -> Self {
        Self { r: 255, g: 255, b: 255, a: alpha }
    }
}

/// Error returned when a colour string is not `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour '{0}' (expected #rrggbb or #rrggbbaa)")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(err());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let r = channel(0)?;
        let g = channel(2)?;
        let b = channel(4)?;
        let a = if hex.len() == 8 {
            f64::from(channel(6)?) / 255.0
        } else {
            1.0
        };

        Ok(Self { r, g, b, a })
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a < 1.0 {
            write!(f, "{:02x}", (self.a.clamp(0.0, 1.0) * 255.0).round() as u8)?;
        }
        Ok(())
    }
}

/// One plotted quantity: its telemetry key, line colour and owning chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub key: String,
    pub color: Color,
    pub chart: String,
}

/// A group of series sharing one set of axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub id: String,
    pub y_label: String,
    pub x_label: String,
    pub series: Vec<SeriesSpec>,
}

impl ChartSpec {
    /// Builds a chart spec, stamping every series with this chart's id.
    pub fn new(
        id: impl Into<String>,
        y_label: impl Into<String>,
        x_label: impl Into<String>,
        series: impl IntoIterator<Item = (String, Color)>,
    ) -> Self {
        let id = id.into();
        let series = series
            .into_iter()
            .map(|(key, color)| SeriesSpec {
                key,
                color,
                chart: id.clone(),
            })
            .collect();

        Self {
            id,
            y_label: y_label.into(),
            x_label: x_label.into(),
            series,
        }
    }

    /// Keys of all series, in drawing order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.key.as_str())
    }
}

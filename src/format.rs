//! Display formatting shared by chart labels, readouts and clocks.

use std::time::Duration;

/// Formats `value` with exactly `decimals` fractional digits.
///
/// ```
/// use amon_ground::format::format_fixed;
///
/// assert_eq!(format_fixed(3.14159, 2), "3.14");
/// assert_eq!(format_fixed(-2.06, 1), "-2.1");
/// assert_eq!(format_fixed(12.0, 0), "12");
/// ```
#[must_use]
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Formats a duration as `HH:MM:SS`, truncating sub-second parts.
///
/// Hours are not wrapped at 24.
#[must_use]
pub fn format_hms(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fixed_pads_decimals() {
        assert_eq!(format_fixed(2.0, 2), "2.00");
        assert_eq!(format_fixed(11.0, 1), "11.0");
        assert_eq!(format_fixed(-1.26, 1), "-1.3");
    }

    #[test]
    fn test_format_fixed_non_finite() {
        assert_eq!(format_fixed(f64::NAN, 1), "NaN");
        assert_eq!(format_fixed(f64::INFINITY, 2), "inf");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::ZERO), "00:00:00");
        assert_eq!(format_hms(Duration::from_millis(59_999)), "00:00:59");
        assert_eq!(format_hms(Duration::from_secs(3_723)), "01:02:03");
        assert_eq!(format_hms(Duration::from_secs(100 * 3600)), "100:00:00");
    }
}

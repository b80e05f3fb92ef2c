//! Mission and wall clocks shown in the dashboard header.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};

use crate::format::format_hms;

/// Flight timer that can be started and stopped repeatedly.
///
/// Elapsed time accumulates across runs until [`MissionClock::reset`].
/// Instants are passed in by the caller so the clock stays testable.
#[derive(Debug, Clone, Default)]
pub struct MissionClock {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl MissionClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Starts the clock. No-op if already running.
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Stops the clock and banks the running interval. No-op if stopped.
    pub fn stop(&mut self, now: Instant) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(started);
        }
    }

    /// Starts a stopped clock or stops a running one. Returns the new state.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.is_running() {
            self.stop(now);
        } else {
            self.start(now);
        }
        self.is_running()
    }

    /// Stops the clock and clears the accumulated time.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
    }

    /// Total flight time as of `now`.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => self.accumulated + now.saturating_duration_since(started),
            None => self.accumulated,
        }
    }

    /// Elapsed time as `HH:MM:SS`.
    #[must_use]
    pub fn display(&self, now: Instant) -> String {
        format_hms(self.elapsed(now))
    }
}

/// Formats a wall-clock time as `HH:MM:SS`.
#[must_use]
pub fn format_wall_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M:%S").to_string()
}

/// Current local time as `HH:MM:SS`.
#[must_use]
pub fn local_clock() -> String {
    format_wall_clock(&Local::now())
}

//! # Request Generations
//!
//! Telemetry polls are fire-and-forget: a slow response may arrive after the
//! operator switched to another drone. Every request is tagged with the
//! generation current at send time, and the host drops responses whose
//! generation is no longer current.

use super::client::TelemetrySource;
use super::snapshot::TelemetrySnapshot;
use crate::error::Result;

/// Monotonic counter bumped whenever in-flight results become stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> u64 {
        self.0
    }

    /// Invalidates every outstanding request and returns the new generation.
    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}

/// A result tagged with the generation it was requested in.
#[derive(Debug)]
pub struct Tagged<T> {
    pub generation: u64,
    pub value: T,
}

impl<T> Tagged<T> {
    /// Returns the value if it still belongs to `current`, `None` if stale.
    pub fn accept(self, current: &Generation) -> Option<T> {
        current.is_current(self.generation).then_some(self.value)
    }
}

/// Fetches one snapshot and tags it with `generation`.
pub async fn fetch_tagged<S>(
    source: &S,
    drone: &str,
    generation: u64,
) -> Tagged<Result<TelemetrySnapshot>>
where
    S: TelemetrySource + ?Sized,
{
    Tagged {
        generation,
        value: source.fetch(drone).await,
    }
}

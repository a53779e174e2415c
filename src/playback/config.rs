//! Playback speed configuration

use crate::StepError;
use std::time::Duration;

/// Fastest accepted tick interval
pub const MIN_INTERVAL_MS: u64 = 100;

/// Slowest accepted tick interval
pub const MAX_INTERVAL_MS: u64 = 1200;

/// Interval used when nothing is configured
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Configuration parameters for auto-play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Delay between two timer-driven ticks
    pub interval: Duration,

    /// Safety cap on ticks for `run_to_end`
    pub max_ticks: usize,
}

impl PlaybackConfig {
    /// Validated configuration for an interval in milliseconds
    pub fn with_interval_ms(interval_ms: u64) -> Result<Self, StepError> {
        Ok(Self {
            interval: validate_interval_ms(interval_ms)?,
            ..Self::default()
        })
    }

    /// Replace the tick cap
    pub fn max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            max_ticks: 100_000,
        }
    }
}

/// Check an interval against the slider range
pub fn validate_interval_ms(interval_ms: u64) -> Result<Duration, StepError> {
    if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval_ms) {
        return Err(StepError::IntervalOutOfRange {
            requested: interval_ms,
            min: MIN_INTERVAL_MS,
            max: MAX_INTERVAL_MS,
        });
    }
    Ok(Duration::from_millis(interval_ms))
}

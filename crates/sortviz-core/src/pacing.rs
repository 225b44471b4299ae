//! Speed scale for step pacing.
//!
//! Ten discrete levels map to inter-step delays. Level 1 is the slowest
//! (500 ms), level 10 the fastest (5 ms).

use std::fmt;

use thiserror::Error;
use web_time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Delay in milliseconds for levels 1..=10.
pub const SPEED_DELAYS_MS: [u64; 10] = [500, 400, 300, 200, 100, 75, 50, 25, 10, 5];

/// How often a paused emitter re-checks its flags when no wake-up arrives.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("speed level {0} outside 1..=10")]
pub struct SpeedLevelError(pub u8);

/// A validated speed level in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    pub const SLOWEST: Self = Self(1);
    pub const FASTEST: Self = Self(10);

    pub fn new(level: u8) -> Result<Self, SpeedLevelError> {
        if (1..=10).contains(&level) {
            Ok(Self(level))
        } else {
            Err(SpeedLevelError(level))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Inter-step delay for this level.
    #[must_use]
    pub const fn delay(self) -> Duration {
        Duration::from_millis(SPEED_DELAYS_MS[(self.0 - 1) as usize])
    }

    /// Move `delta` levels, clamping at either end of the scale.
    #[must_use]
    pub fn step(self, delta: i32) -> Self {
        let level = (i32::from(self.0) + delta).clamp(1, 10);
        Self(level as u8)
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for SpeedLevel {
    type Error = SpeedLevelError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<SpeedLevel> for u8 {
    fn from(level: SpeedLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SpeedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {} ({}ms)", self.0, self.delay().as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_endpoints() {
        assert_eq!(SpeedLevel::SLOWEST.delay(), Duration::from_millis(500));
        assert_eq!(SpeedLevel::FASTEST.delay(), Duration::from_millis(5));
    }

    #[test]
    fn delays_shrink_as_level_grows() {
        let delays: Vec<_> = (1..=10)
            .map(|l| SpeedLevel::new(l).unwrap().delay())
            .collect();
        assert!(delays.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn out_of_range_levels_are_rejected() {
        assert_eq!(SpeedLevel::new(0), Err(SpeedLevelError(0)));
        assert_eq!(SpeedLevel::new(11), Err(SpeedLevelError(11)));
    }

    #[test]
    fn step_clamps() {
        assert_eq!(SpeedLevel::FASTEST.step(3), SpeedLevel::FASTEST);
        assert_eq!(SpeedLevel::SLOWEST.step(-1), SpeedLevel::SLOWEST);
        assert_eq!(SpeedLevel::default().step(1).get(), 6);
    }

    #[test]
    fn default_matches_hundred_millis() {
        assert_eq!(SpeedLevel::default().delay(), Duration::from_millis(100));
        assert_eq!(SpeedLevel::default().to_string(), "Level 5 (100ms)");
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: u32 = 7;

/// Simulation clock measured in whole days since campaign start.
///
/// One engine tick is one in-game week. Alert cooldowns and offer expiry
/// are specified in days, so the clock keeps day resolution even though it
/// only ever advances a week at a time.
///
/// Natural `u32` ordering equals chronological ordering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTimestamp(u32);

impl SimTimestamp {
    pub fn from_days(days: u32) -> Self {
        Self(days)
    }

    /// Start of the given week (week 0 = day 0).
    pub fn from_week(week: u32) -> Self {
        Self(week * DAYS_PER_WEEK)
    }

    pub fn days(self) -> u32 {
        self.0
    }

    pub fn week(self) -> u32 {
        self.0 / DAYS_PER_WEEK
    }

    /// Day within the week (0–6).
    pub fn day_of_week(self) -> u32 {
        self.0 % DAYS_PER_WEEK
    }

    #[must_use]
    pub fn plus_days(self, days: u32) -> Self {
        Self(self.0 + days)
    }

    #[must_use]
    pub fn plus_weeks(self, weeks: u32) -> Self {
        Self(self.0 + weeks * DAYS_PER_WEEK)
    }

    /// Whole days elapsed since `earlier`; zero if `earlier` is in the future.
    pub fn days_since(self, earlier: SimTimestamp) -> u32 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Default for SimTimestamp {
    fn default() -> Self {
        Self(0)
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}.D{}", self.week(), self.day_of_week())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_arithmetic() {
        let t = SimTimestamp::from_week(3);
        assert_eq!(t.days(), 21);
        assert_eq!(t.week(), 3);
        assert_eq!(t.plus_weeks(2).week(), 5);
        assert_eq!(t.plus_days(10).week(), 4);
    }

    #[test]
    fn days_since_saturates() {
        let early = SimTimestamp::from_days(10);
        let late = SimTimestamp::from_days(24);
        assert_eq!(late.days_since(early), 14);
        assert_eq!(early.days_since(late), 0);
    }

    #[test]
    fn ordering_is_chronological() {
        assert!(SimTimestamp::from_week(1) < SimTimestamp::from_week(2));
        assert!(SimTimestamp::from_days(6) < SimTimestamp::from_week(1));
    }

    #[test]
    fn display_format() {
        assert_eq!(SimTimestamp::from_days(17).to_string(), "W2.D3");
    }
}

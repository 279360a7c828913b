//! Canonical clock-time token.
//!
//! A [`TimeToken`] is a single punch time within a day, stored as the
//! minute of the day and always rendered as a zero-padded `HH:MM` string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};

/// Number of minutes in a day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// A canonical `HH:MM` clock time in the range `00:00`–`23:59`.
///
/// Tokens order by minute of day, so a sorted `Vec<TimeToken>` is in
/// chronological order.
///
/// # Example
///
/// ```
/// use attendance_engine::models::TimeToken;
///
/// let token: TimeToken = "8:5".parse().unwrap();
/// assert_eq!(token.to_string(), "08:05");
/// assert_eq!(token.minute_of_day(), 485);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeToken(u16);

impl TimeToken {
    /// Creates a token from a minute of the day, or `None` when out of range.
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Creates a token from an hour and minute, or `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    /// Creates a token from a possibly out-of-range minute value, clamping
    /// into `00:00`–`23:59`.
    pub fn saturating(minutes: i32) -> Self {
        Self(minutes.clamp(0, i32::from(MINUTES_PER_DAY) - 1) as u16)
    }

    /// Returns the minute of the day (0–1439).
    pub fn minute_of_day(self) -> u16 {
        self.0
    }

    /// Returns the hour component.
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Returns the minute component.
    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Signed number of minutes from `self` to `later`.
    pub fn minutes_until(self, later: TimeToken) -> i32 {
        i32::from(later.0) - i32::from(self.0)
    }
}

impl fmt::Display for TimeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeToken {
    type Err = EngineError;

    /// Parses `H:M`, `H:MM`, `HH:M` or `HH:MM`, padding short components.
    fn from_str(s: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidTimeToken {
            value: s.to_string(),
        };
        let trimmed = s.trim();
        let (hour, minute) = trimmed.split_once(':').ok_or_else(invalid)?;

        let is_component = |part: &str| {
            (1..=2).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !is_component(hour) || !is_component(minute) {
            return Err(invalid());
        }

        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        TimeToken::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for TimeToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

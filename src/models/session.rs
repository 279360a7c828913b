//! Sessions inferred from a day of punches.

use std::collections::BTreeMap;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::{SessionName, TimeToken};

/// A session as reconstructed from raw punches.
///
/// `missing_in` and `missing_out` are derived from the punch slots, so a
/// session without a check-in is never also reported as missing its
/// check-out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    /// Which session this is.
    pub name: SessionName,
    /// Every punch attributed to this session, ascending.
    pub times: Vec<TimeToken>,
    /// The recognised check-in punch.
    #[serde(rename = "in")]
    pub check_in: Option<TimeToken>,
    /// The recognised check-out punch.
    #[serde(rename = "out")]
    pub check_out: Option<TimeToken>,
    /// Minutes between the scheduled start and the check-in (0 if early or absent).
    pub late_minutes: u32,
}

impl Session {
    /// Builds a session and derives its lateness against `scheduled_start`.
    pub fn new(
        name: SessionName,
        scheduled_start: TimeToken,
        mut times: Vec<TimeToken>,
        check_in: Option<TimeToken>,
        check_out: Option<TimeToken>,
    ) -> Self {
        times.sort();
        times.dedup();
        let late_minutes = check_in
            .map(|punch| scheduled_start.minutes_until(punch).max(0) as u32)
            .unwrap_or(0);
        Self {
            name,
            times,
            check_in,
            check_out,
            late_minutes,
        }
    }

    /// A session with no punches at all.
    pub fn empty(name: SessionName) -> Self {
        Self {
            name,
            times: Vec::new(),
            check_in: None,
            check_out: None,
            late_minutes: 0,
        }
    }

    /// Returns true if any punch was attributed to this session.
    pub fn has_data(&self) -> bool {
        !self.times.is_empty()
    }

    /// No check-in was recognised.
    pub fn missing_in(&self) -> bool {
        self.check_in.is_none()
    }

    /// A check-in exists but no check-out.
    pub fn missing_out(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }
}

impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Session", 7)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("times", &self.times)?;
        state.serialize_field("in", &self.check_in)?;
        state.serialize_field("out", &self.check_out)?;
        state.serialize_field("missing_in", &self.missing_in())?;
        state.serialize_field("missing_out", &self.missing_out())?;
        state.serialize_field("late_minutes", &self.late_minutes)?;
        state.end()
    }
}

/// The outcome of assigning one employee-day's punches to sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayAssignment {
    /// Punches were interpreted against the template.
    Assigned {
        /// One entry per template session.
        sessions: BTreeMap<SessionName, Session>,
        /// Punches that fit no session at all.
        #[serde(default)]
        dropped: Vec<TimeToken>,
    },
    /// Too many punches to interpret; left for manual review.
    Problematic {
        /// How many punches the day had.
        times_count: usize,
        /// The punches, untouched.
        times: Vec<TimeToken>,
    },
}

impl DayAssignment {
    /// Returns true if the day needs manual review.
    pub fn is_problematic(&self) -> bool {
        matches!(self, DayAssignment::Problematic { .. })
    }

    /// Looks up a session; always `None` for problematic days.
    pub fn session(&self, name: SessionName) -> Option<&Session> {
        match self {
            DayAssignment::Assigned { sessions, .. } => sessions.get(&name),
            DayAssignment::Problematic { .. } => None,
        }
    }

    /// Sessions in time-of-day order; empty for problematic days.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        let sessions = match self {
            DayAssignment::Assigned { sessions, .. } => Some(sessions.values()),
            DayAssignment::Problematic { .. } => None,
        };
        sessions.into_iter().flatten()
    }
}

//! Shift templates and session names.
//!
//! A [`ShiftTemplate`] describes when an employee is expected to work on a
//! given day. Most staff use a half-day split (morning and afternoon
//! separated by a cutoff); some are configured with an explicit list of
//! named sessions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TimeToken;

/// A named work period within a day.
///
/// Ordering follows the time of day, which keeps session maps and notes in
/// a stable, readable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionName {
    /// The morning session.
    Morning,
    /// The afternoon session.
    Afternoon,
    /// The evening session.
    Evening,
}

impl SessionName {
    /// All session names in time-of-day order.
    pub const ALL: [SessionName; 3] = [
        SessionName::Morning,
        SessionName::Afternoon,
        SessionName::Evening,
    ];

    /// Lowercase label used in notes.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionName::Morning => "morning",
            SessionName::Afternoon => "afternoon",
            SessionName::Evening => "evening",
        }
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduled start and end of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    /// Expected check-in time.
    pub start: TimeToken,
    /// Expected check-out time.
    pub end: TimeToken,
}

impl SessionWindow {
    /// Returns true if `token` lies within `[start, end]`.
    pub fn contains(&self, token: TimeToken) -> bool {
        self.start <= token && token <= self.end
    }
}

/// A session in an explicit session layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSession {
    /// Which session this is.
    pub name: SessionName,
    /// Expected check-in time.
    pub start: TimeToken,
    /// Expected check-out time.
    pub end: TimeToken,
}

impl NamedSession {
    /// The session's scheduled window.
    pub fn window(&self) -> SessionWindow {
        SessionWindow {
            start: self.start,
            end: self.end,
        }
    }
}

fn default_cutoff() -> TimeToken {
    TimeToken::from_hm(12, 0).expect("noon is a valid time")
}

/// A two-session day split at a cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfDayTemplate {
    /// The morning session.
    pub morning: SessionWindow,
    /// The afternoon session.
    pub afternoon: SessionWindow,
    /// Boundary separating morning punches from afternoon punches.
    #[serde(default = "default_cutoff")]
    pub cutoff: TimeToken,
}

impl HalfDayTemplate {
    /// Creates a half-day template with the default noon cutoff.
    pub fn new(morning: SessionWindow, afternoon: SessionWindow) -> Self {
        Self {
            morning,
            afternoon,
            cutoff: default_cutoff(),
        }
    }
}

/// An explicit, per-employee list of sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLayout {
    /// Sessions in the order they are tried when bucketing punches.
    pub sessions: Vec<NamedSession>,
}

/// The expected working pattern used to interpret a day of punches.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{ShiftTemplate, SessionName};
///
/// let yaml = r#"
/// kind: half_day
/// morning: { start: "08:30", end: "12:00" }
/// afternoon: { start: "13:15", end: "16:45" }
/// "#;
/// let template: ShiftTemplate = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(template.session_names(), vec![SessionName::Morning, SessionName::Afternoon]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShiftTemplate {
    /// Morning and afternoon, disambiguated by count and time of day.
    HalfDay(HalfDayTemplate),
    /// Explicit named sessions bucketed by their windows.
    Sessions(SessionLayout),
}

impl ShiftTemplate {
    /// The sessions this template defines, in template order.
    pub fn session_names(&self) -> Vec<SessionName> {
        match self {
            ShiftTemplate::HalfDay(_) => vec![SessionName::Morning, SessionName::Afternoon],
            ShiftTemplate::Sessions(layout) => layout.sessions.iter().map(|s| s.name).collect(),
        }
    }

    /// Scheduled start of the named session, if the template has it.
    pub fn session_start(&self, name: SessionName) -> Option<TimeToken> {
        match self {
            ShiftTemplate::HalfDay(half) => match name {
                SessionName::Morning => Some(half.morning.start),
                SessionName::Afternoon => Some(half.afternoon.start),
                SessionName::Evening => None,
            },
            ShiftTemplate::Sessions(layout) => layout
                .sessions
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.start),
        }
    }
}

//! Configuration types for attendance reconciliation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every threshold has a
//! default so a policy file only needs to list what it overrides.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::models::{
    EmployeeCodePattern, EmployeeId, HalfDayTemplate, RoleCategory, SessionLayout, SessionName,
    SessionWindow, ShiftTemplate, TimeToken,
};

/// Thresholds used when bucketing punches into named sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamedSessionPolicy {
    /// A punch outside every window snaps to the nearest session start within this many minutes.
    pub snap_distance: i32,
    /// A first punch earlier than `start - early_in_tolerance` yields to the next punch as check-in.
    pub early_in_tolerance: i32,
    /// Preferred minimum minutes between check-in and check-out.
    pub min_out_gap: i32,
    /// A lone punch counts as check-in from this many minutes before start...
    pub single_lead: i32,
    /// ...until this many minutes after start.
    pub single_grace: i32,
}

impl Default for NamedSessionPolicy {
    fn default() -> Self {
        Self {
            snap_distance: 60,
            early_in_tolerance: 30,
            min_out_gap: 15,
            single_lead: 90,
            single_grace: 60,
        }
    }
}

/// Thresholds that drive session assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssignmentPolicy {
    /// Days with more punches than this are left for manual review.
    pub max_tokens_per_day: usize,
    /// Minimum minutes between the check-in and check-out of one session.
    pub min_session_gap: i32,
    /// Minimum minutes between a morning check-in and an afternoon check-out
    /// when the punches in between are missing.
    pub split_shift_gap: i32,
    /// Check-in window opens this many minutes before the session start.
    pub checkin_lead: i32,
    /// Check-in window closes this many minutes after the session start.
    pub checkin_grace: i32,
    /// Check-out window opens this many minutes after the session start.
    pub checkout_after_start: i32,
    /// Morning check-out window closes this many minutes after the morning end.
    pub morning_checkout_tail: i32,
    /// Afternoon check-out window closes this many minutes after the afternoon end.
    pub afternoon_checkout_tail: i32,
    /// Thresholds for explicit session layouts.
    pub named: NamedSessionPolicy,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            max_tokens_per_day: 4,
            min_session_gap: 120,
            split_shift_gap: 240,
            checkin_lead: 90,
            checkin_grace: 90,
            checkout_after_start: 120,
            morning_checkout_tail: 90,
            afternoon_checkout_tail: 120,
            named: NamedSessionPolicy::default(),
        }
    }
}

/// Thresholds used when turning sessions into anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifierPolicy {
    /// Lateness at or above this many minutes is counted and highlighted.
    pub late_threshold_minutes: u32,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            late_threshold_minutes: 30,
        }
    }
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

/// Contents of `policy.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// IANA zone used to render concrete date-time punches.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Session assignment thresholds.
    #[serde(default)]
    pub assignment: AssignmentPolicy,
    /// Anomaly thresholds.
    #[serde(default)]
    pub classifier: ClassifierPolicy,
}

/// A role keyword and the category it selects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleKeyword {
    /// Case-insensitive substring looked for in the role label.
    pub keyword: String,
    /// Category selected when the keyword is found.
    pub category: RoleCategory,
}

impl RoleKeyword {
    fn new(keyword: &str, category: RoleCategory) -> Self {
        Self {
            keyword: keyword.to_string(),
            category,
        }
    }
}

/// Built-in keyword table, checked in order.
pub fn default_role_keywords() -> Vec<RoleKeyword> {
    vec![
        RoleKeyword::new("manager", RoleCategory::Manager),
        RoleKeyword::new("ql", RoleCategory::Manager),
        RoleKeyword::new("part", RoleCategory::PartTime),
        RoleKeyword::new("online", RoleCategory::Online),
        RoleKeyword::new("onl", RoleCategory::Online),
    ]
}

/// Maps free-text registration tokens to session names.
///
/// # Example
///
/// ```
/// use attendance_engine::config::SessionAliases;
/// use attendance_engine::models::SessionName;
///
/// let aliases = SessionAliases::default();
/// assert_eq!(aliases.resolve("Ca chiều"), vec![SessionName::Afternoon]);
/// assert_eq!(aliases.resolve("morning + evening"), vec![SessionName::Morning, SessionName::Evening]);
/// assert!(aliases.resolve("off").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SessionAliases(BTreeMap<SessionName, Vec<String>>);

impl SessionAliases {
    /// Every session whose name or alias occurs in `token`, in time-of-day order.
    pub fn resolve(&self, token: &str) -> Vec<SessionName> {
        let token = token.to_lowercase();
        SessionName::ALL
            .into_iter()
            .filter(|name| {
                token.contains(name.as_str())
                    || self.0.get(name).is_some_and(|aliases| {
                        aliases
                            .iter()
                            .any(|alias| !alias.is_empty() && token.contains(&alias.to_lowercase()))
                    })
            })
            .collect()
    }
}

impl Default for SessionAliases {
    fn default() -> Self {
        let aliases = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self(BTreeMap::from([
            (SessionName::Morning, aliases(&["sáng", "sang"])),
            (SessionName::Afternoon, aliases(&["chiều", "chieu"])),
            (SessionName::Evening, aliases(&["tối", "toi", "night"])),
        ]))
    }
}

/// Shift templates per role category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleTemplates {
    /// Template for staff with no special category.
    pub default: ShiftTemplate,
    /// Template for managers.
    pub manager: ShiftTemplate,
    /// Template for part-time staff.
    pub part_time: ShiftTemplate,
    /// Template for online staff.
    pub online: ShiftTemplate,
}

fn half_day(morning: (&str, &str), afternoon: (&str, &str)) -> ShiftTemplate {
    let token = |s: &str| s.parse::<TimeToken>().expect("built-in template times are valid");
    ShiftTemplate::HalfDay(HalfDayTemplate::new(
        SessionWindow {
            start: token(morning.0),
            end: token(morning.1),
        },
        SessionWindow {
            start: token(afternoon.0),
            end: token(afternoon.1),
        },
    ))
}

impl Default for RoleTemplates {
    fn default() -> Self {
        Self {
            default: half_day(("08:30", "12:00"), ("13:15", "16:45")),
            manager: half_day(("08:00", "12:00"), ("13:30", "17:30")),
            part_time: half_day(("08:30", "12:00"), ("13:30", "17:00")),
            online: half_day(("08:00", "12:00"), ("13:00", "17:00")),
        }
    }
}

fn default_code_pattern() -> String {
    crate::models::DEFAULT_EMPLOYEE_CODE_PATTERN.to_string()
}

/// Contents of `roster.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterFile {
    /// Regex every employee code must match.
    #[serde(default = "default_code_pattern")]
    pub employee_code_pattern: String,
    /// Role keyword table, checked in order.
    #[serde(default = "default_role_keywords")]
    pub role_keywords: Vec<RoleKeyword>,
    /// Templates per role category.
    #[serde(default)]
    pub templates: RoleTemplates,
    /// Codes treated as managers when the role label is missing.
    #[serde(default)]
    pub managers: Vec<String>,
    /// Reception staff and their individual session layouts.
    #[serde(default)]
    pub reception: BTreeMap<String, SessionLayout>,
    /// Registration token aliases.
    #[serde(default)]
    pub session_aliases: SessionAliases,
}

/// Validated roster: role keywords, templates and ID-based fallbacks.
///
/// Immutable once built; the schedule resolver only ever reads it.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    /// Role keyword table, checked in order.
    pub role_keywords: Vec<RoleKeyword>,
    /// Templates per role category.
    pub templates: RoleTemplates,
    /// Codes treated as managers when the role label is missing.
    pub managers: Vec<EmployeeId>,
    /// Reception staff and their individual session layouts.
    pub reception: BTreeMap<EmployeeId, SessionLayout>,
    /// Registration token aliases.
    pub session_aliases: SessionAliases,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            role_keywords: default_role_keywords(),
            templates: RoleTemplates::default(),
            managers: Vec::new(),
            reception: BTreeMap::new(),
            session_aliases: SessionAliases::default(),
        }
    }
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Zone used to render concrete date-time punches.
    pub time_zone: Tz,
    /// Session assignment thresholds.
    pub assignment: AssignmentPolicy,
    /// Anomaly thresholds.
    pub classifier: ClassifierPolicy,
    /// Compiled employee code pattern.
    pub code_pattern: EmployeeCodePattern,
    /// Roster tables.
    pub roster: RosterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_zone: Tz::UTC,
            assignment: AssignmentPolicy::default(),
            classifier: ClassifierPolicy::default(),
            code_pattern: EmployeeCodePattern::default(),
            roster: RosterConfig::default(),
        }
    }
}

//! Employee identity and per-day punch log.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::TimeToken;

/// Default employee code pattern: two capital letters followed by four digits.
pub const DEFAULT_EMPLOYEE_CODE_PATTERN: &str = r"^[A-Z]{2}\d{4}$";

/// A validated employee code such as `NV0012`.
///
/// Codes are trimmed and upper-cased before validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EmployeeId {
    type Err = EngineError;

    /// Parses against [`DEFAULT_EMPLOYEE_CODE_PATTERN`].
    fn from_str(s: &str) -> EngineResult<Self> {
        EmployeeCodePattern::default().parse(s)
    }
}

/// Compiled employee code pattern.
///
/// # Example
///
/// ```
/// use attendance_engine::models::EmployeeCodePattern;
///
/// let pattern = EmployeeCodePattern::default();
/// assert_eq!(pattern.parse(" nv0012 ").unwrap().as_str(), "NV0012");
/// assert!(pattern.parse("NV12").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct EmployeeCodePattern {
    regex: Regex,
}

impl EmployeeCodePattern {
    /// Compiles a pattern; the error carries the regex diagnostic.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Normalizes and validates a raw code.
    pub fn parse(&self, raw: &str) -> EngineResult<EmployeeId> {
        let code = raw.trim().to_uppercase();
        if self.regex.is_match(&code) {
            Ok(EmployeeId(code))
        } else {
            Err(EngineError::InvalidEmployeeCode {
                code: raw.to_string(),
                message: format!("does not match {}", self.regex.as_str()),
            })
        }
    }
}

impl Default for EmployeeCodePattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_EMPLOYEE_CODE_PATTERN)
                .expect("default employee code pattern is valid"),
        }
    }
}

/// The staffing category that selects a shift template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    /// Managers and team leads.
    Manager,
    /// Part-time staff.
    PartTime,
    /// Staff working remotely.
    Online,
    /// Reception staff with individually configured sessions.
    Reception,
    /// Everyone else.
    Default,
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoleCategory::Manager => "manager",
            RoleCategory::PartTime => "part-time",
            RoleCategory::Online => "online",
            RoleCategory::Reception => "reception",
            RoleCategory::Default => "default",
        };
        f.write_str(label)
    }
}

/// Validates a day of the month.
pub fn validate_day(day: u32) -> EngineResult<u8> {
    if (1..=31).contains(&day) {
        Ok(day as u8)
    } else {
        Err(EngineError::InvalidDay { day })
    }
}

/// All punches of one employee on one day of the reporting month.
///
/// Tokens are kept sorted ascending with duplicates removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDayLog {
    /// The employee the punches belong to.
    pub employee: EmployeeId,
    /// Day of the reporting month (1–31).
    pub day: u8,
    tokens: Vec<TimeToken>,
}

impl EmployeeDayLog {
    /// Creates a day log, sorting and deduplicating the tokens.
    pub fn new(
        employee: EmployeeId,
        day: u32,
        tokens: impl IntoIterator<Item = TimeToken>,
    ) -> EngineResult<Self> {
        let day = validate_day(day)?;
        let tokens: BTreeSet<TimeToken> = tokens.into_iter().collect();
        Ok(Self {
            employee,
            day,
            tokens: tokens.into_iter().collect(),
        })
    }

    /// The ascending, unique punch times.
    pub fn tokens(&self) -> &[TimeToken] {
        &self.tokens
    }

    /// Returns true when nothing was punched on this day.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

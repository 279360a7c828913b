//! Registered shifts from the planning sheet.

use serde::{Deserialize, Serialize};

use super::EmployeeId;

/// The sessions an employee committed to work on a day.
///
/// Session tokens are kept as written by the planner; they are resolved to
/// [`SessionName`](super::SessionName)s through the configured alias table
/// when absences are aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredShift {
    /// The employee concerned.
    pub employee: EmployeeId,
    /// Day of the reporting month.
    pub day: u8,
    /// Raw session tokens, e.g. `"morning"` or `"Ca tối"`.
    pub tokens: Vec<String>,
}

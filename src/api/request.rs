//! Request types for the Attendance Reconciliation Engine API.
//!
//! `POST /reconcile` takes a [`MonthInput`](crate::models::MonthInput)
//! directly; this module defines the body of `POST /assign`.

use serde::{Deserialize, Serialize};

use crate::models::ClassifyMode;

/// Request body for the `/assign` endpoint.
///
/// Interprets one employee-day's punches without a ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    /// Employee code, validated against the configured pattern.
    pub employee: String,
    /// Free-text role label, if known.
    #[serde(default)]
    pub role: Option<String>,
    /// Day of the month (1–31).
    pub day: u32,
    /// Punch times; entries that are not `H:MM` clock times are ignored.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Which anomaly families to report.
    #[serde(default)]
    pub mode: ClassifyMode,
}

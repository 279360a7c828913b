//! Reconciliation report models.
//!
//! This module contains the [`MonthReport`] type and its associated
//! structures: per-employee results handed back to the ledger writer and
//! the identities that could not be matched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AnomalyRecord, DayAssignment, EmployeeId, RoleCategory};

/// Where an unmatched identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedSource {
    /// A ledger row whose code is invalid or repeated, or an invalid day column.
    Ledger,
    /// A raw clock punch.
    RawLog,
    /// A shift registration.
    Registration,
}

/// An input record that could not be tied to a ledger employee or day.
///
/// Unmatched records are skipped; the rest of the batch is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedIdentity {
    /// Which provider supplied the record.
    pub source: UnmatchedSource,
    /// The identity as written by the provider.
    pub value: String,
    /// The day the record referred to; `None` for ledger rows.
    /// An invalid ledger day column carries its own number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    /// Why it was not matched.
    pub reason: String,
}

/// Reconciliation results for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeReport {
    /// The employee.
    pub employee: EmployeeId,
    /// Display name from the ledger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The category that selected the shift template.
    pub category: RoleCategory,
    /// Merged cell text per day, ready to be written back.
    pub cells: BTreeMap<u8, String>,
    /// Session assignment per day that had punches.
    pub days: BTreeMap<u8, DayAssignment>,
    /// Every anomaly found, in day order.
    pub records: Vec<AnomalyRecord>,
    /// Human-readable notes, anomaly notes first, then absence notes.
    pub notes: Vec<String>,
    /// Late arrivals at or above the late threshold.
    pub total_late: u32,
    /// Missing check-ins and check-outs.
    pub forgot_count: u32,
    /// Registered sessions without any punch.
    pub absence_count: u32,
    /// Days left for manual review.
    pub ambiguous_count: u32,
    /// Days whose ledger cell should be highlighted.
    pub highlighted_days: Vec<u8>,
    /// Days with at least one absence.
    pub absence_days: Vec<u8>,
    /// Absences per ISO week number, when the period is known.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weekly_absences: BTreeMap<u32, u32>,
}

/// Aggregated totals across all employees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTotals {
    /// Employees reconciled.
    pub employees: u32,
    /// Sum of late counters.
    pub late: u32,
    /// Sum of missing-punch counters.
    pub forgot: u32,
    /// Sum of absences.
    pub absences: u32,
    /// Days flagged for manual review.
    pub ambiguous_days: u32,
    /// Records that could not be matched.
    pub unmatched: u32,
}

/// The complete result of reconciling a month.
///
/// The report carries no timestamps or random identifiers, so running the
/// same input twice serializes to identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthReport {
    /// Label of the ledger reconciled into.
    pub ledger: String,
    /// One report per ledger row, in ledger order.
    pub employees: Vec<EmployeeReport>,
    /// Records that could not be matched.
    pub unmatched: Vec<UnmatchedIdentity>,
    /// Aggregated totals.
    pub totals: MonthTotals,
}

impl MonthReport {
    /// Looks up an employee's report by code.
    pub fn employee(&self, code: &str) -> Option<&EmployeeReport> {
        self.employees.iter().find(|e| e.employee.as_str() == code)
    }
}

//! Input shapes supplied by the ledger, raw log and registration providers.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ClassifyMode;

/// A raw value read from a clock log or ledger cell.
///
/// # Example
///
/// ```
/// use attendance_engine::models::RawCell;
///
/// let cell: RawCell = serde_json::from_str(r#"{"type": "text", "value": "07:58\n17:02"}"#).unwrap();
/// assert_eq!(cell, RawCell::Text("07:58\n17:02".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RawCell {
    /// Nothing recorded.
    Empty,
    /// Free text that may embed several `H:MM` punches.
    Text(String),
    /// A spreadsheet serial; the fractional part is a fraction of a day.
    Serial(Decimal),
    /// A concrete instant, rendered in the configured local zone.
    DateTime(DateTime<Utc>),
}

/// The calendar month a ledger covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1–12).
    pub month: u32,
}

impl ReportingPeriod {
    /// The date of `day` in this month, if it exists.
    pub fn date(&self, day: u8) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, u32::from(day))
    }
}

/// One employee row of the monthly ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Employee code as written in the ledger.
    pub code: String,
    /// Display name, used to match registrations keyed by name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text role label, when the ledger has one.
    #[serde(default)]
    pub role: Option<String>,
    /// Existing cell text keyed by day.
    #[serde(default)]
    pub cells: BTreeMap<u8, String>,
}

/// The ledger contents relevant to reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Human label for logs and errors, e.g. the sheet name.
    #[serde(default)]
    pub label: String,
    /// Day numbers that have a column in the ledger.
    pub days: Vec<u8>,
    /// Employee rows.
    pub rows: Vec<LedgerRow>,
}

/// A raw clock-log value for an employee-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunch {
    /// Employee code as exported by the clock.
    pub employee: String,
    /// Day of the reporting month.
    pub day: u32,
    /// The raw cell value.
    pub value: RawCell,
}

/// A shift registration row from the planning sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEntry {
    /// Employee code or display name.
    pub employee: String,
    /// Day of the reporting month.
    pub day: u32,
    /// Raw session tokens such as `"morning"` or `"Ca chiều"`.
    pub sessions: Vec<String>,
}

/// Everything needed to reconcile one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthInput {
    /// Calendar month, enabling weekly absence tallies.
    #[serde(default)]
    pub period: Option<ReportingPeriod>,
    /// Which anomaly families to report.
    #[serde(default)]
    pub mode: ClassifyMode,
    /// The ledger being reconciled into.
    pub ledger: LedgerSnapshot,
    /// Raw clock punches.
    #[serde(default)]
    pub punches: Vec<RawPunch>,
    /// Registered shifts.
    #[serde(default)]
    pub registrations: Vec<RegistrationEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_raw_cell_variants_deserialize() {
        let serial: RawCell =
            serde_json::from_str(r#"{"type": "serial", "value": "0.3541666667"}"#).unwrap();
        assert_eq!(serial, RawCell::Serial(Decimal::from_str("0.3541666667").unwrap()));

        let empty: RawCell = serde_json::from_str(r#"{"type": "empty"}"#).unwrap();
        assert_eq!(empty, RawCell::Empty);

        let instant: RawCell =
            serde_json::from_str(r#"{"type": "date_time", "value": "2025-03-03T01:05:00Z"}"#)
                .unwrap();
        assert!(matches!(instant, RawCell::DateTime(_)));
    }

    #[test]
    fn test_reporting_period_date() {
        let period = ReportingPeriod {
            year: 2025,
            month: 2,
        };
        assert_eq!(period.date(28), NaiveDate::from_ymd_opt(2025, 2, 28));
        assert_eq!(period.date(30), None);
    }

    #[test]
    fn test_month_input_defaults() {
        let json = r#"{
            "ledger": {
                "days": [1, 2],
                "rows": [{"code": "NV0001", "cells": {"1": "08:00"}}]
            }
        }"#;
        let input: MonthInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.mode, ClassifyMode::Both);
        assert!(input.period.is_none());
        assert!(input.punches.is_empty());
        assert_eq!(input.ledger.rows[0].cells.get(&1).map(String::as_str), Some("08:00"));
    }
}

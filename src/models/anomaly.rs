//! Anomaly records produced by reconciliation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EmployeeId, SessionName};

/// The kind of attendance discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// The session has punches but no recognised check-in.
    MissingIn,
    /// The session has a check-in but no check-out.
    MissingOut,
    /// The check-in was after the scheduled start.
    Late,
    /// Too many punches to interpret; needs manual review.
    Ambiguous,
    /// A registered session with no punch at all.
    Absent,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnomalyKind::MissingIn => "missing-in",
            AnomalyKind::MissingOut => "missing-out",
            AnomalyKind::Late => "late",
            AnomalyKind::Ambiguous => "ambiguous",
            AnomalyKind::Absent => "absent",
        };
        f.write_str(label)
    }
}

/// Which anomaly families to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyMode {
    /// Late arrivals and missing punches.
    #[default]
    Both,
    /// Late arrivals only.
    LateOnly,
    /// Missing punches only.
    MissingOnly,
}

impl ClassifyMode {
    /// Whether late arrivals are reported in this mode.
    pub fn includes_late(self) -> bool {
        matches!(self, ClassifyMode::Both | ClassifyMode::LateOnly)
    }

    /// Whether missing punches are reported in this mode.
    pub fn includes_missing(self) -> bool {
        matches!(self, ClassifyMode::Both | ClassifyMode::MissingOnly)
    }
}

/// A single discrepancy for one employee on one day.
///
/// Records are created during a reconciliation run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    /// The employee concerned.
    pub employee: EmployeeId,
    /// Day of the reporting month.
    pub day: u8,
    /// What went wrong.
    pub kind: AnomalyKind,
    /// The session concerned; `None` for whole-day anomalies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionName>,
    /// Lateness for [`AnomalyKind::Late`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_minutes: Option<u32>,
    /// Punch count for [`AnomalyKind::Ambiguous`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times_count: Option<usize>,
    /// Whether the ledger cell should be highlighted.
    pub highlight: bool,
}

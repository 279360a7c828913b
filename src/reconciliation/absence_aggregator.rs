//! Absence aggregation.
//!
//! Compares registered shifts against what was actually punched. A session
//! is an absence only when the employee committed to it and left no punch
//! at all; a partial punch is an anomaly, never an absence.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::Serialize;

use crate::config::SessionAliases;
use crate::models::{
    AnomalyKind, AnomalyRecord, DayAssignment, EmployeeId, RegisteredShift, ReportingPeriod,
    SessionName,
};

/// A registration token that named no known session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedToken {
    /// Day the token was registered for.
    pub day: u8,
    /// The token as written.
    pub token: String,
}

/// Absences for one employee across the month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AbsenceReport {
    /// One record per absent session.
    pub records: Vec<AnomalyRecord>,
    /// One note per day with absences.
    pub notes: Vec<String>,
    /// Number of absent sessions.
    pub absence_count: u32,
    /// Days with at least one absent session, ascending.
    pub absence_days: Vec<u8>,
    /// Absent sessions per ISO week; empty without a reporting period.
    pub weekly: BTreeMap<u32, u32>,
    /// Registration tokens that resolved to no session.
    pub unmatched_tokens: Vec<UnmatchedToken>,
}

/// Aggregates absences from registrations and assigned sessions.
#[derive(Debug, Clone)]
pub struct AbsenceAggregator {
    aliases: SessionAliases,
}

impl AbsenceAggregator {
    /// Creates an aggregator resolving registration tokens through `aliases`.
    pub fn new(aliases: &SessionAliases) -> Self {
        Self {
            aliases: aliases.clone(),
        }
    }

    /// Aggregates one employee's absences.
    ///
    /// `days` holds the assignment of every day that had punches; a
    /// registered day missing from it had none. Registrations for other
    /// employees are ignored.
    pub fn aggregate(
        &self,
        employee: &EmployeeId,
        registrations: &[RegisteredShift],
        days: &BTreeMap<u8, DayAssignment>,
        period: Option<ReportingPeriod>,
    ) -> AbsenceReport {
        let mut report = AbsenceReport::default();
        let mut registered: BTreeMap<u8, BTreeSet<SessionName>> = BTreeMap::new();

        for shift in registrations.iter().filter(|s| &s.employee == employee) {
            let sessions = registered.entry(shift.day).or_default();
            for token in &shift.tokens {
                let names = self.aliases.resolve(token);
                if names.is_empty() {
                    report.unmatched_tokens.push(UnmatchedToken {
                        day: shift.day,
                        token: token.clone(),
                    });
                }
                sessions.extend(names);
            }
        }

        for (day, sessions) in registered {
            let absent: Vec<SessionName> = sessions
                .into_iter()
                .filter(|&name| is_absent(days.get(&day), name))
                .collect();
            if absent.is_empty() {
                continue;
            }

            let week = period
                .and_then(|p| p.date(day))
                .map(|date| date.iso_week().week());
            for &name in &absent {
                report.records.push(AnomalyRecord {
                    employee: employee.clone(),
                    day,
                    kind: AnomalyKind::Absent,
                    session: Some(name),
                    late_minutes: None,
                    times_count: None,
                    highlight: false,
                });
                if let Some(week) = week {
                    *report.weekly.entry(week).or_default() += 1;
                }
            }

            let listed = absent
                .iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            report.notes.push(format!("Day {}: absent ({})", day, listed));
            report.absence_count += absent.len() as u32;
            report.absence_days.push(day);
        }

        report
    }
}

/// No punches that day, or none attributed to the registered session.
///
/// Problematic days had punches, so they are left to manual review.
fn is_absent(day: Option<&DayAssignment>, name: SessionName) -> bool {
    match day {
        None => true,
        Some(DayAssignment::Problematic { .. }) => false,
        Some(assignment) => assignment
            .session(name)
            .is_none_or(|session| !session.has_data()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, TimeToken};

    fn t(s: &str) -> TimeToken {
        s.parse().unwrap()
    }

    fn employee() -> EmployeeId {
        "NV0001".parse().unwrap()
    }

    fn aggregator() -> AbsenceAggregator {
        AbsenceAggregator::new(&SessionAliases::default())
    }

    fn registered(day: u8, tokens: &[&str]) -> RegisteredShift {
        RegisteredShift {
            employee: employee(),
            day,
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A half-day with only a morning check-in at 08:25.
    fn morning_only() -> DayAssignment {
        DayAssignment::Assigned {
            sessions: BTreeMap::from([
                (
                    SessionName::Morning,
                    Session::new(SessionName::Morning, t("08:30"), vec![t("08:25")], Some(t("08:25")), None),
                ),
                (SessionName::Afternoon, Session::empty(SessionName::Afternoon)),
            ]),
            dropped: Vec::new(),
        }
    }

    // ==========================================================================
    // AA-001: registered sessions without punches
    // ==========================================================================
    #[test]
    fn test_aa_001_no_punches_all_registered_sessions_absent() {
        let report = aggregator().aggregate(
            &employee(),
            &[registered(3, &["morning", "Ca chiều"])],
            &BTreeMap::new(),
            None,
        );
        assert_eq!(report.absence_count, 2);
        assert_eq!(report.absence_days, vec![3]);
        assert_eq!(report.notes, vec!["Day 3: absent (morning, afternoon)"]);
        assert_eq!(report.records.len(), 2);
    }

    #[test]
    fn test_aa_002_one_punch_is_not_absence() {
        let days = BTreeMap::from([(5, morning_only())]);
        let report = aggregator().aggregate(
            &employee(),
            &[registered(5, &["morning", "afternoon"])],
            &days,
            None,
        );
        assert_eq!(report.absence_count, 1);
        assert_eq!(report.records[0].session, Some(SessionName::Afternoon));
        assert_eq!(report.notes, vec!["Day 5: absent (afternoon)"]);
    }

    #[test]
    fn test_aa_003_problematic_day_is_never_absent() {
        let days = BTreeMap::from([(
            6,
            DayAssignment::Problematic {
                times_count: 7,
                times: vec![],
            },
        )]);
        let report = aggregator().aggregate(&employee(), &[registered(6, &["evening"])], &days, None);
        assert_eq!(report, AbsenceReport::default());
    }

    #[test]
    fn test_aa_004_session_missing_from_template_is_absent() {
        // Registered for the evening while the template only has two halves.
        let days = BTreeMap::from([(8, morning_only())]);
        let report = aggregator().aggregate(&employee(), &[registered(8, &["tối"])], &days, None);
        assert_eq!(report.absence_count, 1);
        assert_eq!(report.records[0].session, Some(SessionName::Evening));
    }

    #[test]
    fn test_aa_005_duplicate_registrations_merge_per_day() {
        let report = aggregator().aggregate(
            &employee(),
            &[registered(2, &["morning"]), registered(2, &["sáng", "afternoon"])],
            &BTreeMap::new(),
            None,
        );
        assert_eq!(report.absence_count, 2);
        assert_eq!(report.notes.len(), 1);
    }

    #[test]
    fn test_aa_006_other_employees_ignored() {
        let mut other = registered(2, &["morning"]);
        other.employee = "NV0002".parse().unwrap();
        let report = aggregator().aggregate(&employee(), &[other], &BTreeMap::new(), None);
        assert_eq!(report.absence_count, 0);
    }

    // ==========================================================================
    // AA-010: unmatched tokens and weekly tallies
    // ==========================================================================
    #[test]
    fn test_aa_010_unknown_tokens_reported() {
        let report = aggregator().aggregate(
            &employee(),
            &[registered(4, &["off", "morning"])],
            &BTreeMap::new(),
            None,
        );
        assert_eq!(
            report.unmatched_tokens,
            vec![UnmatchedToken {
                day: 4,
                token: "off".to_string()
            }]
        );
        assert_eq!(report.absence_count, 1);
    }

    #[test]
    fn test_aa_011_weekly_tally_uses_iso_weeks() {
        // March 2025: the 2nd is a Sunday (week 9), the 3rd a Monday (week 10).
        let period = ReportingPeriod {
            year: 2025,
            month: 3,
        };
        let report = aggregator().aggregate(
            &employee(),
            &[
                registered(2, &["morning"]),
                registered(3, &["morning", "afternoon"]),
                registered(4, &["afternoon"]),
            ],
            &BTreeMap::new(),
            Some(period),
        );
        assert_eq!(report.weekly, BTreeMap::from([(9, 1), (10, 3)]));
        assert_eq!(report.absence_days, vec![2, 3, 4]);
    }

    #[test]
    fn test_aa_012_day_outside_month_has_no_week() {
        let period = ReportingPeriod {
            year: 2025,
            month: 2,
        };
        let report = aggregator().aggregate(
            &employee(),
            &[registered(30, &["morning"])],
            &BTreeMap::new(),
            Some(period),
        );
        assert_eq!(report.absence_count, 1);
        assert!(report.weekly.is_empty());
    }
}

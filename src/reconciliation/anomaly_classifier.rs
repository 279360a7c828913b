//! Anomaly classification.
//!
//! Turns one day's session assignment into anomaly records, notes and
//! counters. Only sessions that recorded at least one punch are examined;
//! sessions without punches are the absence aggregator's concern.

use serde::Serialize;

use crate::config::ClassifierPolicy;
use crate::models::{
    AnomalyKind, AnomalyRecord, ClassifyMode, DayAssignment, EmployeeId, Session,
};

/// Anomalies found on one employee-day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayClassification {
    /// Records in session order.
    pub records: Vec<AnomalyRecord>,
    /// One note per record.
    pub notes: Vec<String>,
    /// Late arrivals at or above the threshold.
    pub late_count: u32,
    /// Missing check-ins and check-outs.
    pub missing_count: u32,
    /// 1 if the day needs manual review.
    pub ambiguous_count: u32,
}

impl DayClassification {
    /// Returns true if any record asks for the cell to be highlighted.
    pub fn highlight(&self) -> bool {
        self.records.iter().any(|record| record.highlight)
    }

    fn push(&mut self, record: AnomalyRecord, note: String) {
        self.records.push(record);
        self.notes.push(note);
    }
}

/// Classifies session assignments into anomalies.
///
/// # Example
///
/// ```
/// use attendance_engine::config::ClassifierPolicy;
/// use attendance_engine::models::{ClassifyMode, DayAssignment};
/// use attendance_engine::reconciliation::AnomalyClassifier;
///
/// let classifier = AnomalyClassifier::new(ClassifierPolicy::default());
/// let day = DayAssignment::Problematic { times_count: 6, times: vec![] };
/// let result = classifier.classify(&"NV0001".parse().unwrap(), 4, &day, ClassifyMode::LateOnly);
/// assert_eq!(result.ambiguous_count, 1);
/// assert_eq!(result.late_count, 0);
/// ```
#[derive(Debug, Clone)]
pub struct AnomalyClassifier {
    policy: ClassifierPolicy,
}

impl AnomalyClassifier {
    /// Creates a classifier with the given thresholds.
    pub fn new(policy: ClassifierPolicy) -> Self {
        Self { policy }
    }

    /// Classifies one employee-day.
    pub fn classify(
        &self,
        employee: &EmployeeId,
        day: u8,
        assignment: &DayAssignment,
        mode: ClassifyMode,
    ) -> DayClassification {
        let mut result = DayClassification::default();

        match assignment {
            DayAssignment::Problematic { times_count, .. } => {
                // Reported whatever the mode: the day was not interpreted.
                result.ambiguous_count = 1;
                result.push(
                    AnomalyRecord {
                        employee: employee.clone(),
                        day,
                        kind: AnomalyKind::Ambiguous,
                        session: None,
                        late_minutes: None,
                        times_count: Some(*times_count),
                        highlight: true,
                    },
                    format!("Day {}: {} punches, needs manual review", day, times_count),
                );
            }
            DayAssignment::Assigned { sessions, .. } => {
                for session in sessions.values().filter(|s| s.has_data()) {
                    if mode.includes_missing() {
                        self.check_missing(employee, day, session, &mut result);
                    }
                    if mode.includes_late() {
                        self.check_late(employee, day, session, &mut result);
                    }
                }
            }
        }

        result
    }

    fn check_missing(
        &self,
        employee: &EmployeeId,
        day: u8,
        session: &Session,
        result: &mut DayClassification,
    ) {
        let (kind, what) = if session.missing_in() {
            (AnomalyKind::MissingIn, "check-in")
        } else if session.missing_out() {
            (AnomalyKind::MissingOut, "check-out")
        } else {
            return;
        };

        result.missing_count += 1;
        result.push(
            AnomalyRecord {
                employee: employee.clone(),
                day,
                kind,
                session: Some(session.name),
                late_minutes: None,
                times_count: None,
                highlight: false,
            },
            format!("Day {}: {} missing {}", day, session.name, what),
        );
    }

    fn check_late(
        &self,
        employee: &EmployeeId,
        day: u8,
        session: &Session,
        result: &mut DayClassification,
    ) {
        if session.check_in.is_none() || session.late_minutes == 0 {
            return;
        }

        let counted = session.late_minutes >= self.policy.late_threshold_minutes;
        if counted {
            result.late_count += 1;
        }
        result.push(
            AnomalyRecord {
                employee: employee.clone(),
                day,
                kind: AnomalyKind::Late,
                session: Some(session.name),
                late_minutes: Some(session.late_minutes),
                times_count: None,
                highlight: counted,
            },
            format!(
                "Day {}: {} late {} min",
                day, session.name, session.late_minutes
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionName, TimeToken};
    use std::collections::BTreeMap;

    fn t(s: &str) -> TimeToken {
        s.parse().unwrap()
    }

    fn employee() -> EmployeeId {
        "NV0001".parse().unwrap()
    }

    fn classifier() -> AnomalyClassifier {
        AnomalyClassifier::new(ClassifierPolicy::default())
    }

    fn session(
        name: SessionName,
        start: &str,
        times: &[&str],
        check_in: Option<&str>,
        check_out: Option<&str>,
    ) -> Session {
        Session::new(
            name,
            t(start),
            times.iter().map(|s| t(s)).collect(),
            check_in.map(t),
            check_out.map(t),
        )
    }

    fn day_of(sessions: Vec<Session>) -> DayAssignment {
        DayAssignment::Assigned {
            sessions: sessions.into_iter().map(|s| (s.name, s)).collect::<BTreeMap<_, _>>(),
            dropped: Vec::new(),
        }
    }

    /// Morning in at `check_in` against a 08:30 start, with a check-out.
    fn late_morning(check_in: &str) -> DayAssignment {
        day_of(vec![session(
            SessionName::Morning,
            "08:30",
            &[check_in, "12:00"],
            Some(check_in),
            Some("12:00"),
        )])
    }

    // ==========================================================================
    // AC-001: late severity
    // ==========================================================================
    #[test]
    fn test_ac_001_late_below_threshold_is_note_only() {
        // 29 minutes late
        let result = classifier().classify(&employee(), 2, &late_morning("08:59"), ClassifyMode::Both);
        assert_eq!(result.late_count, 0);
        assert_eq!(result.notes, vec!["Day 2: morning late 29 min"]);
        assert!(!result.highlight());
        assert_eq!(result.records[0].late_minutes, Some(29));
    }

    #[test]
    fn test_ac_002_late_at_threshold_is_counted_and_highlighted() {
        let result = classifier().classify(&employee(), 2, &late_morning("09:00"), ClassifyMode::Both);
        assert_eq!(result.late_count, 1);
        assert_eq!(result.notes, vec!["Day 2: morning late 30 min"]);
        assert!(result.highlight());
    }

    #[test]
    fn test_ac_003_on_time_produces_nothing() {
        let result = classifier().classify(&employee(), 2, &late_morning("08:30"), ClassifyMode::Both);
        assert_eq!(result, DayClassification::default());
    }

    #[test]
    fn test_ac_004_custom_threshold() {
        let strict = AnomalyClassifier::new(ClassifierPolicy {
            late_threshold_minutes: 10,
        });
        let result = strict.classify(&employee(), 2, &late_morning("08:45"), ClassifyMode::Both);
        assert_eq!(result.late_count, 1);
    }

    // ==========================================================================
    // AC-010: missing punches
    // ==========================================================================
    #[test]
    fn test_ac_010_missing_check_out() {
        let day = day_of(vec![session(SessionName::Morning, "08:30", &["08:25"], Some("08:25"), None)]);
        let result = classifier().classify(&employee(), 7, &day, ClassifyMode::Both);
        assert_eq!(result.missing_count, 1);
        assert_eq!(result.records[0].kind, AnomalyKind::MissingOut);
        assert_eq!(result.notes, vec!["Day 7: morning missing check-out"]);
    }

    #[test]
    fn test_ac_011_missing_check_in_never_also_missing_out() {
        let day = day_of(vec![session(SessionName::Afternoon, "13:15", &["16:50"], None, Some("16:50"))]);
        let result = classifier().classify(&employee(), 7, &day, ClassifyMode::Both);
        assert_eq!(result.missing_count, 1);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].kind, AnomalyKind::MissingIn);
    }

    #[test]
    fn test_ac_012_stray_punch_is_missing_in() {
        let day = day_of(vec![session(SessionName::Morning, "08:30", &["05:00"], None, None)]);
        let result = classifier().classify(&employee(), 7, &day, ClassifyMode::Both);
        assert_eq!(result.records[0].kind, AnomalyKind::MissingIn);
        assert_eq!(result.missing_count, 1);
    }

    #[test]
    fn test_ac_013_sessions_without_punches_are_ignored() {
        let day = day_of(vec![
            Session::empty(SessionName::Morning),
            Session::empty(SessionName::Afternoon),
        ]);
        let result = classifier().classify(&employee(), 7, &day, ClassifyMode::Both);
        assert_eq!(result, DayClassification::default());
    }

    #[test]
    fn test_ac_014_late_and_missing_out_together() {
        let day = day_of(vec![session(SessionName::Morning, "08:30", &["08:45"], Some("08:45"), None)]);
        let result = classifier().classify(&employee(), 1, &day, ClassifyMode::Both);
        assert_eq!(result.missing_count, 1);
        assert_eq!(result.late_count, 0);
        assert_eq!(
            result.notes,
            vec!["Day 1: morning missing check-out", "Day 1: morning late 15 min"]
        );
    }

    // ==========================================================================
    // AC-020: modes
    // ==========================================================================
    #[test]
    fn test_ac_020_late_only_mode_skips_missing() {
        let day = day_of(vec![session(SessionName::Morning, "08:30", &["09:10"], Some("09:10"), None)]);
        let result = classifier().classify(&employee(), 1, &day, ClassifyMode::LateOnly);
        assert_eq!(result.missing_count, 0);
        assert_eq!(result.late_count, 1);
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn test_ac_021_missing_only_mode_skips_late() {
        let day = day_of(vec![session(SessionName::Morning, "08:30", &["09:10"], Some("09:10"), None)]);
        let result = classifier().classify(&employee(), 1, &day, ClassifyMode::MissingOnly);
        assert_eq!(result.missing_count, 1);
        assert_eq!(result.late_count, 0);
        assert_eq!(result.records.len(), 1);
    }

    // ==========================================================================
    // AC-030: problematic days
    // ==========================================================================
    #[test]
    fn test_ac_030_problematic_day_is_one_ambiguous_record() {
        let day = DayAssignment::Problematic {
            times_count: 6,
            times: vec![],
        };
        for mode in [ClassifyMode::Both, ClassifyMode::LateOnly, ClassifyMode::MissingOnly] {
            let result = classifier().classify(&employee(), 9, &day, mode);
            assert_eq!(result.records.len(), 1, "{:?}", mode);
            assert_eq!(result.records[0].kind, AnomalyKind::Ambiguous);
            assert_eq!(result.records[0].times_count, Some(6));
            assert_eq!(result.ambiguous_count, 1);
            assert_eq!(result.late_count, 0);
            assert_eq!(result.missing_count, 0);
            assert_eq!(result.notes, vec!["Day 9: 6 punches, needs manual review"]);
        }
    }
}

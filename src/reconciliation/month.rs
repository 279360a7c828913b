//! Month reconciliation.
//!
//! Joins the ledger, raw clock punches and shift registrations for one
//! reporting month and runs every employee-day through normalization,
//! assignment, classification and absence aggregation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ClassifyMode, DayAssignment, EmployeeDayLog, EmployeeId, EmployeeReport, LedgerRow,
    MonthInput, MonthReport, MonthTotals, RawCell, RegisteredShift, RoleCategory, TimeToken,
    UnmatchedIdentity, UnmatchedSource, validate_day,
};

use super::absence_aggregator::AbsenceAggregator;
use super::anomaly_classifier::{AnomalyClassifier, DayClassification};
use super::normalization::{TimeNormalizer, format_cell, merge_tokens};
use super::schedule_resolver::ScheduleResolver;
use super::session_assigner::SessionAssigner;

/// The outcome for a single employee-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayOutcome {
    /// The employee.
    pub employee: EmployeeId,
    /// Day of the month.
    pub day: u8,
    /// The category that selected the template.
    pub category: RoleCategory,
    /// Session assignment.
    pub assignment: DayAssignment,
    /// Anomalies found.
    pub classification: DayClassification,
}

/// Runs reconciliation with one immutable configuration.
///
/// Holds no mutable state, so a single instance can serve concurrent
/// requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: EngineConfig,
    normalizer: TimeNormalizer,
    resolver: ScheduleResolver,
    assigner: SessionAssigner,
    classifier: AnomalyClassifier,
    absences: AbsenceAggregator,
}

impl Reconciler {
    /// Builds every component from the configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            normalizer: TimeNormalizer::new(config.time_zone),
            resolver: ScheduleResolver::new(config.roster.clone()),
            assigner: SessionAssigner::new(config.assignment),
            classifier: AnomalyClassifier::new(config.classifier),
            absences: AbsenceAggregator::new(&config.roster.session_aliases),
            config,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The normalizer in use.
    pub fn normalizer(&self) -> &TimeNormalizer {
        &self.normalizer
    }

    /// Assigns and classifies one employee-day.
    pub fn reconcile_day(
        &self,
        employee: &EmployeeId,
        role: Option<&str>,
        day: u8,
        tokens: &[TimeToken],
        mode: ClassifyMode,
    ) -> DayOutcome {
        let resolved = self.resolver.resolve(employee, role);
        let assignment = self.assigner.assign(tokens, resolved.template);
        let classification = self.classifier.classify(employee, day, &assignment, mode);
        DayOutcome {
            employee: employee.clone(),
            day,
            category: resolved.category,
            assignment,
            classification,
        }
    }

    /// Reconciles a whole month.
    ///
    /// Fails only when the ledger has no valid day columns or no row with a
    /// valid employee code.
    /// Records that cannot be tied to a ledger employee or day are listed
    /// in [`MonthReport::unmatched`] and skipped.
    pub fn reconcile_month(&self, input: &MonthInput) -> EngineResult<MonthReport> {
        let ledger = &input.ledger;
        let mut unmatched = Vec::new();
        let ledger_days = index_days(&ledger.days, &mut unmatched);
        if ledger_days.is_empty() {
            return Err(EngineError::NoDayColumns {
                ledger: ledger.label.clone(),
            });
        }

        // Rows whose code fails the pattern (totals, footers) are not employees.
        let employees = self.index_rows(&ledger.rows, &mut unmatched);
        if employees.is_empty() {
            return Err(EngineError::NoEmployeeRows {
                ledger: ledger.label.clone(),
            });
        }
        let punches = self.collect_punches(input, &employees, &ledger_days, &mut unmatched);
        let registrations =
            self.collect_registrations(input, &employees, &ledger_days, &mut unmatched);

        let mut reports = Vec::with_capacity(employees.len());
        let mut totals = MonthTotals::default();

        for (employee, row) in &employees {
            let report = self.reconcile_employee(
                employee,
                row,
                &ledger_days,
                punches.get(employee),
                registrations.get(employee).map(Vec::as_slice).unwrap_or_default(),
                input,
                &mut unmatched,
            );

            totals.employees += 1;
            totals.late += report.total_late;
            totals.forgot += report.forgot_count;
            totals.absences += report.absence_count;
            totals.ambiguous_days += report.ambiguous_count;
            reports.push(report);
        }
        totals.unmatched = unmatched.len() as u32;

        info!(
            ledger = %ledger.label,
            employees = totals.employees,
            late = totals.late,
            forgot = totals.forgot,
            absences = totals.absences,
            ambiguous_days = totals.ambiguous_days,
            unmatched = totals.unmatched,
            "Month reconciled"
        );

        Ok(MonthReport {
            ledger: ledger.label.clone(),
            employees: reports,
            unmatched,
            totals,
        })
    }

    /// Validates ledger codes, keeping ledger order and the first row per code.
    fn index_rows<'a>(
        &self,
        rows: &'a [LedgerRow],
        unmatched: &mut Vec<UnmatchedIdentity>,
    ) -> Vec<(EmployeeId, &'a LedgerRow)> {
        let mut seen = BTreeSet::new();
        let mut employees = Vec::with_capacity(rows.len());

        for row in rows {
            let reason = match self.config.code_pattern.parse(&row.code) {
                Ok(id) if seen.insert(id.clone()) => {
                    employees.push((id, row));
                    continue;
                }
                Ok(_) => "duplicate ledger row",
                Err(_) => "invalid employee code",
            };
            record_unmatched(unmatched, UnmatchedSource::Ledger, &row.code, None, reason);
        }

        employees
    }

    fn collect_punches(
        &self,
        input: &MonthInput,
        employees: &[(EmployeeId, &LedgerRow)],
        ledger_days: &BTreeSet<u8>,
        unmatched: &mut Vec<UnmatchedIdentity>,
    ) -> BTreeMap<EmployeeId, BTreeMap<u8, Vec<TimeToken>>> {
        let mut punches: BTreeMap<EmployeeId, BTreeMap<u8, Vec<TimeToken>>> = BTreeMap::new();

        for punch in &input.punches {
            let employee = match self.config.code_pattern.parse(&punch.employee) {
                Ok(id) if employees.iter().any(|(known, _)| known == &id) => id,
                Ok(_) => {
                    record_unmatched(
                        unmatched,
                        UnmatchedSource::RawLog,
                        &punch.employee,
                        Some(punch.day),
                        "employee not in ledger",
                    );
                    continue;
                }
                Err(_) => {
                    record_unmatched(
                        unmatched,
                        UnmatchedSource::RawLog,
                        &punch.employee,
                        Some(punch.day),
                        "invalid employee code",
                    );
                    continue;
                }
            };
            let Some(day) = ledger_day(punch.day, ledger_days) else {
                record_unmatched(
                    unmatched,
                    UnmatchedSource::RawLog,
                    &punch.employee,
                    Some(punch.day),
                    "day not in ledger",
                );
                continue;
            };

            punches
                .entry(employee)
                .or_default()
                .entry(day)
                .or_default()
                .extend(self.normalizer.normalize(&punch.value));
        }

        punches
    }

    fn collect_registrations(
        &self,
        input: &MonthInput,
        employees: &[(EmployeeId, &LedgerRow)],
        ledger_days: &BTreeSet<u8>,
        unmatched: &mut Vec<UnmatchedIdentity>,
    ) -> BTreeMap<EmployeeId, Vec<RegisteredShift>> {
        let mut registrations: BTreeMap<EmployeeId, Vec<RegisteredShift>> = BTreeMap::new();

        for entry in &input.registrations {
            let Some(employee) = self.match_registrant(&entry.employee, employees) else {
                record_unmatched(
                    unmatched,
                    UnmatchedSource::Registration,
                    &entry.employee,
                    Some(entry.day),
                    "unknown employee",
                );
                continue;
            };
            let Some(day) = ledger_day(entry.day, ledger_days) else {
                record_unmatched(
                    unmatched,
                    UnmatchedSource::Registration,
                    &entry.employee,
                    Some(entry.day),
                    "day not in ledger",
                );
                continue;
            };

            registrations
                .entry(employee.clone())
                .or_default()
                .push(RegisteredShift {
                    employee,
                    day,
                    tokens: entry.sessions.clone(),
                });
        }

        registrations
    }

    /// Matches a registration by code, then by exact case-insensitive name.
    fn match_registrant(
        &self,
        raw: &str,
        employees: &[(EmployeeId, &LedgerRow)],
    ) -> Option<EmployeeId> {
        if let Ok(id) = self.config.code_pattern.parse(raw) {
            if employees.iter().any(|(known, _)| known == &id) {
                return Some(id);
            }
        }

        let wanted = raw.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        employees
            .iter()
            .find(|(_, row)| {
                row.name
                    .as_deref()
                    .is_some_and(|name| name.trim().to_lowercase() == wanted)
            })
            .map(|(id, _)| id.clone())
    }

    #[allow(clippy::too_many_arguments)]
    fn reconcile_employee(
        &self,
        employee: &EmployeeId,
        row: &LedgerRow,
        ledger_days: &BTreeSet<u8>,
        punches: Option<&BTreeMap<u8, Vec<TimeToken>>>,
        registrations: &[RegisteredShift],
        input: &MonthInput,
        unmatched: &mut Vec<UnmatchedIdentity>,
    ) -> EmployeeReport {
        let mut report = EmployeeReport {
            employee: employee.clone(),
            name: row.name.clone(),
            category: self.resolver.resolve(employee, row.role.as_deref()).category,
            cells: BTreeMap::new(),
            days: BTreeMap::new(),
            records: Vec::new(),
            notes: Vec::new(),
            total_late: 0,
            forgot_count: 0,
            absence_count: 0,
            ambiguous_count: 0,
            highlighted_days: Vec::new(),
            absence_days: Vec::new(),
            weekly_absences: BTreeMap::new(),
        };

        for &day in ledger_days {
            let existing = row
                .cells
                .get(&day)
                .map(|text| self.normalizer.normalize(&RawCell::Text(text.clone())))
                .unwrap_or_default();
            let fresh = punches
                .and_then(|days| days.get(&day))
                .map(Vec::as_slice)
                .unwrap_or_default();
            let merged = merge_tokens(
                existing.iter().map(ToString::to_string),
                fresh.iter().map(ToString::to_string),
            );
            let Ok(log) = EmployeeDayLog::new(employee.clone(), u32::from(day), merged) else {
                continue;
            };
            if log.is_empty() {
                continue;
            }

            let outcome =
                self.reconcile_day(employee, row.role.as_deref(), log.day, log.tokens(), input.mode);
            let classification = outcome.classification;

            report.cells.insert(day, format_cell(log.tokens()));
            report.total_late += classification.late_count;
            report.forgot_count += classification.missing_count;
            report.ambiguous_count += classification.ambiguous_count;
            if classification.highlight() {
                report.highlighted_days.push(day);
            }
            report.records.extend(classification.records);
            report.notes.extend(classification.notes);
            report.days.insert(day, outcome.assignment);
        }

        let absences = self
            .absences
            .aggregate(employee, registrations, &report.days, input.period);
        for token in &absences.unmatched_tokens {
            record_unmatched(
                unmatched,
                UnmatchedSource::Registration,
                &token.token,
                Some(u32::from(token.day)),
                "no session matches token",
            );
        }
        report.records.extend(absences.records);
        report.notes.extend(absences.notes);
        report.absence_count = absences.absence_count;
        report.absence_days = absences.absence_days;
        report.weekly_absences = absences.weekly;

        report
    }
}

/// The day as a ledger column, if the ledger has one.
fn ledger_day(day: u32, ledger_days: &BTreeSet<u8>) -> Option<u8> {
    validate_day(day).ok().filter(|day| ledger_days.contains(day))
}

/// Valid day columns; columns outside 1–31 are reported and skipped.
fn index_days(days: &[u8], unmatched: &mut Vec<UnmatchedIdentity>) -> BTreeSet<u8> {
    let mut valid = BTreeSet::new();
    for &day in days {
        if validate_day(u32::from(day)).is_ok() {
            valid.insert(day);
        } else {
            record_unmatched(
                unmatched,
                UnmatchedSource::Ledger,
                &day.to_string(),
                Some(u32::from(day)),
                "invalid day column",
            );
        }
    }
    valid
}

fn record_unmatched(
    unmatched: &mut Vec<UnmatchedIdentity>,
    source: UnmatchedSource,
    value: &str,
    day: Option<u32>,
    reason: &str,
) {
    warn!(source = ?source, value = %value, day = ?day, reason = %reason, "Unmatched record skipped");
    unmatched.push(UnmatchedIdentity {
        source,
        value: value.to_string(),
        day,
        reason: reason.to_string(),
    });
}

//! Reconciliation logic for the Attendance Reconciliation Engine.
//!
//! This module contains the pipeline stages applied to every employee-day:
//! time normalization, schedule resolution, session assignment, anomaly
//! classification and absence aggregation, plus the month driver that
//! joins the ledger, raw punches and registrations.

mod absence_aggregator;
mod anomaly_classifier;
mod month;
mod normalization;
mod schedule_resolver;
mod session_assigner;

pub use absence_aggregator::{AbsenceAggregator, AbsenceReport, UnmatchedToken};
pub use anomaly_classifier::{AnomalyClassifier, DayClassification};
pub use month::{DayOutcome, Reconciler};
pub use normalization::{TimeNormalizer, format_cell, merge_tokens, serial_to_token};
pub use schedule_resolver::{ResolvedSchedule, ScheduleResolver, classify_role};
pub use session_assigner::{
    HalfDayWindows, SessionAssigner, Slots, Strategy, Window, assign_layout, build_sessions,
    strategy_for,
};

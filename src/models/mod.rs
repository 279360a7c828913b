//! Core data models for the Attendance Reconciliation Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod anomaly;
mod employee;
mod ledger;
mod registration;
mod report;
mod session;
mod shift_template;
mod time_token;

pub use anomaly::{AnomalyKind, AnomalyRecord, ClassifyMode};
pub use employee::{
    DEFAULT_EMPLOYEE_CODE_PATTERN, EmployeeCodePattern, EmployeeDayLog, EmployeeId, RoleCategory,
    validate_day,
};
pub use ledger::{
    LedgerRow, LedgerSnapshot, MonthInput, RawCell, RawPunch, RegistrationEntry, ReportingPeriod,
};
pub use registration::RegisteredShift;
pub use report::{EmployeeReport, MonthReport, MonthTotals, UnmatchedIdentity, UnmatchedSource};
pub use session::{DayAssignment, Session};
pub use shift_template::{
    HalfDayTemplate, NamedSession, SessionLayout, SessionName, SessionWindow, ShiftTemplate,
};
pub use time_token::{MINUTES_PER_DAY, TimeToken};

//! Error types for the Attendance Reconciliation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Only configuration problems and structural ledger problems surface as
//! errors; malformed cells, ambiguous days and unmatched identities are
//! recorded in the reconciliation report instead.

use thiserror::Error;

/// The main error type for the Attendance Reconciliation Engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/policy.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/policy.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The ledger declares no day columns, so there is nothing to reconcile into.
    #[error("No day columns found in ledger '{ledger}'")]
    NoDayColumns {
        /// Label of the ledger that was inspected.
        ledger: String,
    },

    /// The ledger contains no employee rows.
    #[error("No employee rows found in ledger '{ledger}'")]
    NoEmployeeRows {
        /// Label of the ledger that was inspected.
        ledger: String,
    },

    /// A value could not be read as an `HH:MM` clock time.
    #[error("Invalid time token '{value}'")]
    InvalidTimeToken {
        /// The rejected text.
        value: String,
    },

    /// An employee code did not match the configured code pattern.
    #[error("Invalid employee code '{code}': {message}")]
    InvalidEmployeeCode {
        /// The rejected code.
        code: String,
        /// Why the code was rejected.
        message: String,
    },

    /// A day number outside 1..=31.
    #[error("Invalid day of month: {day}")]
    InvalidDay {
        /// The rejected day number.
        day: u32,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

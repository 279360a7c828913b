//! Attendance Reconciliation Engine
//!
//! This crate reconciles raw biometric clock punches against a monthly
//! attendance ledger and a shift-registration schedule, producing per-day
//! session assignments, attendance anomalies and absence counts.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod reconciliation;

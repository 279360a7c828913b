//! HTTP API module for the Attendance Reconciliation Engine.
//!
//! This module provides the REST API endpoints for reconciling a month
//! and for interpreting a single employee-day.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::AssignRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;

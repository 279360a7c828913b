//! HTTP request handlers for the Attendance Reconciliation Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{EmployeeDayLog, MonthInput};
use crate::reconciliation::{DayOutcome, Reconciler, merge_tokens};

use super::request::AssignRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reconcile", post(reconcile_handler))
        .route("/assign", post(assign_handler))
        .with_state(state)
}

/// Handler for POST /reconcile endpoint.
///
/// Accepts a month input and returns the month report.
async fn reconcile_handler(
    State(state): State<AppState>,
    payload: Result<Json<MonthInput>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing reconciliation request");

    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state.reconciler().reconcile_month(&input) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                ledger = %report.ledger,
                employees = report.totals.employees,
                unmatched = report.totals.unmatched,
                duration_us = start_time.elapsed().as_micros(),
                "Reconciliation completed successfully"
            );
            json_response(StatusCode::OK, &report)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Reconciliation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for POST /assign endpoint.
///
/// Interprets a single employee-day's punches.
async fn assign_handler(
    State(state): State<AppState>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing assignment request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match assign_day(state.reconciler(), &request) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                employee = %outcome.employee,
                day = outcome.day,
                category = %outcome.category,
                problematic = outcome.assignment.is_problematic(),
                "Assignment completed successfully"
            );
            json_response(StatusCode::OK, &outcome)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Assignment failed"
            );
            error_response(err.into())
        }
    }
}

/// Validates the request and runs one employee-day.
fn assign_day(reconciler: &Reconciler, request: &AssignRequest) -> EngineResult<DayOutcome> {
    let employee = reconciler.config().code_pattern.parse(&request.employee)?;
    let tokens = merge_tokens(&request.tokens, Vec::<String>::new());
    let log = EmployeeDayLog::new(employee, request.day, tokens)?;

    Ok(reconciler.reconcile_day(
        &log.employee,
        request.role.as_deref(),
        log.day,
        log.tokens(),
        request.mode,
    ))
}

/// Maps a JSON extraction failure to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") || body_text.contains("unknown variant") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    json_response(api_error.status, &api_error.error)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

//! Integration tests for the Attendance Reconciliation Engine.
//!
//! This test suite covers:
//! - Single employee-day assignment over HTTP
//! - Role, manager-list and reception template selection
//! - Whole-month reconciliation over HTTP and through the library
//! - Absence aggregation and weekly tallies
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::config::ConfigLoader;
use attendance_engine::models::{MonthInput, MonthReport, SessionName};
use attendance_engine::reconciliation::Reconciler;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn assign_request(employee: &str, role: Option<&str>, tokens: &[&str]) -> Value {
    json!({
        "employee": employee,
        "role": role,
        "day": 3,
        "tokens": tokens,
    })
}

fn text(employee: &str, day: u32, value: &str) -> Value {
    json!({"employee": employee, "day": day, "value": {"type": "text", "value": value}})
}

/// A March 2025 ledger covering every staff category.
fn month_request() -> Value {
    json!({
        "period": {"year": 2025, "month": 3},
        "ledger": {
            "label": "Cham cong T3",
            "days": (1..=31).collect::<Vec<u32>>(),
            "rows": [
                {"code": "NV0001", "name": "Nguyen Van A"},
                {"code": "NV0002", "name": "Tran Thi B"},
                {"code": "QL0001", "name": "Le Van C"},
                {"code": "PT0001", "name": "Pham Thi D", "role": "Part-time"},
                {"code": "LT0002", "name": "Vo Van E"}
            ]
        },
        "punches": [
            text("NV0001", 3, "08:20\n12:05\n13:20\n16:50"),
            {"employee": "NV0001", "day": 4, "value": {"type": "date_time", "value": "2025-03-04T01:45:00Z"}},
            {"employee": "QL0001", "day": 3, "value": {"type": "serial", "value": "0.3541666667"}},
            text("LT0002", 5, "06:55 11:25 17:25 21:25"),
            text("PT0001", 5, "08:00 09:00 10:00 12:00 13:00 17:00"),
            text("XX9999", 5, "08:30")
        ],
        "registrations": [
            {"employee": "Tran Thi B", "day": 6, "sessions": ["Ca sáng"]},
            {"employee": "NV0001", "day": 3, "sessions": ["morning", "afternoon"]}
        ]
    })
}

fn employee<'a>(report: &'a Value, code: &str) -> &'a Value {
    report["employees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["employee"] == code)
        .unwrap_or_else(|| panic!("no report for {}", code))
}

// =============================================================================
// SECTION 1: Single-day assignment
// =============================================================================

#[tokio::test]
async fn test_assign_regular_day_default_template() {
    let router = create_router_for_test();
    let request = assign_request("NV0001", None, &["08:20", "12:05", "13:20", "16:50"]);

    let (status, result) = post_json(router, "/assign", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["category"], "default");
    let sessions = &result["assignment"]["sessions"];
    assert_eq!(sessions["morning"]["in"], "08:20");
    assert_eq!(sessions["morning"]["out"], "12:05");
    assert_eq!(sessions["morning"]["late_minutes"], 0);
    assert_eq!(sessions["afternoon"]["in"], "13:20");
    assert_eq!(sessions["afternoon"]["out"], "16:50");
    assert_eq!(sessions["afternoon"]["late_minutes"], 5);
    assert_eq!(result["classification"]["late_count"], 0);
    assert_eq!(result["classification"]["missing_count"], 0);
}

#[tokio::test]
async fn test_assign_single_punch_missing_checkout() {
    let router = create_router_for_test();
    let (status, result) =
        post_json(router, "/assign", assign_request("NV0001", None, &["08:45"])).await;

    assert_eq!(status, StatusCode::OK);
    let morning = &result["assignment"]["sessions"]["morning"];
    assert_eq!(morning["in"], "08:45");
    assert_eq!(morning["out"], Value::Null);
    assert_eq!(morning["missing_out"], true);
    assert_eq!(morning["missing_in"], false);
    assert_eq!(morning["late_minutes"], 15);
    assert_eq!(result["classification"]["missing_count"], 1);
}

#[tokio::test]
async fn test_assign_six_punches_is_problematic() {
    let router = create_router_for_test();
    let request = assign_request(
        "NV0001",
        None,
        &["08:00", "09:00", "10:00", "12:00", "13:00", "17:00"],
    );
    let (status, result) = post_json(router, "/assign", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["assignment"]["status"], "problematic");
    assert_eq!(result["assignment"]["times_count"], 6);
    let classification = &result["classification"];
    assert_eq!(classification["ambiguous_count"], 1);
    assert_eq!(classification["late_count"], 0);
    assert_eq!(classification["missing_count"], 0);
    assert_eq!(classification["records"][0]["kind"], "ambiguous");
}

#[tokio::test]
async fn test_assign_tokens_are_normalized() {
    let router = create_router_for_test();
    let request = assign_request("nv0001", None, &["8:5", "junk", "08:05"]);
    let (status, result) = post_json(router, "/assign", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["employee"], "NV0001");
    let morning = &result["assignment"]["sessions"]["morning"];
    assert_eq!(morning["times"], json!(["08:05"]));
    assert_eq!(morning["in"], "08:05");
}

// =============================================================================
// SECTION 2: Template selection
// =============================================================================

#[tokio::test]
async fn test_online_role_whole_day_without_break_punches() {
    // Online template: 08:00–12:00 / 13:00–17:00
    let router = create_router_for_test();
    let request = assign_request("NV0003", Some("NV Online"), &["08:00", "17:00"]);
    let (status, result) = post_json(router, "/assign", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["category"], "online");
    let sessions = &result["assignment"]["sessions"];
    assert_eq!(sessions["morning"]["in"], "08:00");
    assert_eq!(sessions["morning"]["missing_out"], true);
    assert_eq!(sessions["afternoon"]["out"], "17:00");
    assert_eq!(sessions["afternoon"]["missing_in"], true);
    assert_eq!(result["classification"]["missing_count"], 2);
}

#[tokio::test]
async fn test_manager_list_used_when_role_blank() {
    let router = create_router_for_test();
    let request = assign_request("QL0002", Some(""), &["08:40"]);
    let (status, result) = post_json(router, "/assign", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["category"], "manager");
    // Manager morning starts at 08:00.
    assert_eq!(result["assignment"]["sessions"]["morning"]["late_minutes"], 40);
    assert_eq!(result["classification"]["late_count"], 1);
    assert_eq!(result["classification"]["records"][1]["highlight"], true);
}

#[tokio::test]
async fn test_reception_layout() {
    let router = create_router_for_test();
    let request = assign_request("LT0001", None, &["05:55", "09:55", "13:10", "16:58"]);
    let (status, result) = post_json(router, "/assign", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["category"], "reception");
    let sessions = &result["assignment"]["sessions"];
    assert_eq!(sessions["morning"]["in"], "05:55");
    assert_eq!(sessions["morning"]["out"], "09:55");
    assert_eq!(sessions["afternoon"]["late_minutes"], 10);
    assert!(sessions.get("evening").is_none());
}

#[tokio::test]
async fn test_role_label_beats_reception_mapping() {
    let router = create_router_for_test();
    let request = assign_request("LT0001", Some("part time"), &["08:30"]);
    let (_, result) = post_json(router, "/assign", request).await;
    assert_eq!(result["category"], "part_time");
}

// =============================================================================
// SECTION 3: Month reconciliation
// =============================================================================

#[tokio::test]
async fn test_reconcile_month_over_http() {
    let router = create_router_for_test();
    let (status, report) = post_json(router, "/reconcile", month_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["ledger"], "Cham cong T3");
    assert_eq!(report["totals"]["employees"], 5);

    // Regular day with a small afternoon delay: note only.
    let nv1 = employee(&report, "NV0001");
    assert_eq!(nv1["cells"]["3"], "08:20\n12:05\n13:20\n16:50");
    // 01:45 UTC is 08:45 in Ho Chi Minh City.
    assert_eq!(nv1["cells"]["4"], "08:45");
    assert_eq!(
        nv1["notes"],
        json!([
            "Day 3: afternoon late 5 min",
            "Day 4: morning missing check-out",
            "Day 4: morning late 15 min"
        ])
    );
    assert_eq!(nv1["total_late"], 0);
    assert_eq!(nv1["forgot_count"], 1);
    assert_eq!(nv1["absence_count"], 0);

    // Serial 0.3541666667 is 08:30; the manager template starts at 08:00.
    let ql1 = employee(&report, "QL0001");
    assert_eq!(ql1["category"], "manager");
    assert_eq!(ql1["total_late"], 1);
    assert_eq!(ql1["highlighted_days"], json!([3]));

    let pt1 = employee(&report, "PT0001");
    assert_eq!(pt1["category"], "part_time");
    assert_eq!(pt1["ambiguous_count"], 1);
    assert_eq!(pt1["days"]["5"]["status"], "problematic");

    let lt2 = employee(&report, "LT0002");
    assert_eq!(lt2["category"], "reception");
    assert_eq!(lt2["notes"], json!([]));
    assert_eq!(lt2["days"]["5"]["sessions"]["evening"]["out"], "21:25");

    // Registration matched by name; 6 March 2025 is in ISO week 10.
    let nv2 = employee(&report, "NV0002");
    assert_eq!(nv2["absence_count"], 1);
    assert_eq!(nv2["absence_days"], json!([6]));
    assert_eq!(nv2["notes"], json!(["Day 6: absent (morning)"]));
    assert_eq!(nv2["weekly_absences"]["10"], 1);

    let unmatched = report["unmatched"].as_array().unwrap();
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0]["source"], "raw_log");
    assert_eq!(unmatched[0]["value"], "XX9999");
}

#[tokio::test]
async fn test_reconcile_without_rows_returns_422() {
    let router = create_router_for_test();
    let body = json!({"ledger": {"label": "Empty", "days": [1, 2], "rows": []}});
    let (status, result) = post_json(router, "/reconcile", body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(result["code"], "INVALID_LEDGER");
    assert!(result["message"].as_str().unwrap().contains("Empty"));
}

#[tokio::test]
async fn test_reconcile_unknown_mode_is_validation_error() {
    let router = create_router_for_test();
    let mut body = month_request();
    body["mode"] = json!("sometimes");
    let (status, result) = post_json(router, "/reconcile", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_late_only_mode_suppresses_missing_notes() {
    let router = create_router_for_test();
    let mut body = month_request();
    body["mode"] = json!("late_only");
    let (_, report) = post_json(router, "/reconcile", body).await;

    let nv1 = employee(&report, "NV0001");
    assert_eq!(nv1["forgot_count"], 0);
    assert_eq!(
        nv1["notes"],
        json!(["Day 3: afternoon late 5 min", "Day 4: morning late 15 min"])
    );
    // Ambiguous days are reported in every mode.
    assert_eq!(employee(&report, "PT0001")["ambiguous_count"], 1);
}

// =============================================================================
// SECTION 4: Library entry points
// =============================================================================

#[test]
fn test_demo_month_file_reconciles() {
    let raw = std::fs::read_to_string("./demos/month_input.json").expect("demo input exists");
    let input: MonthInput = serde_json::from_str(&raw).unwrap();
    let config = ConfigLoader::load("./config/default").unwrap().into_config();

    let report: MonthReport = Reconciler::new(config).reconcile_month(&input).unwrap();

    assert_eq!(report.totals.employees as usize, input.ledger.rows.len());
    let first = report.employees.first().unwrap();
    let day = first.days.values().next().unwrap();
    assert!(day.session(SessionName::Morning).is_some());
}

#[test]
fn test_reconciliation_is_idempotent() {
    let input: MonthInput = serde_json::from_value(month_request()).unwrap();
    let config = ConfigLoader::load("./config/default").unwrap().into_config();
    let reconciler = Reconciler::new(config);

    let first = serde_json::to_vec(&reconciler.reconcile_month(&input).unwrap()).unwrap();
    let second = serde_json::to_vec(&reconciler.reconcile_month(&input).unwrap()).unwrap();
    assert_eq!(first, second);
}

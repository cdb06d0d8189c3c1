//! Integration tests for tvbook-api endpoints
//!
//! Tests cover:
//! - Health endpoint (no role required)
//! - Role header handling
//! - Request creation and submission validation
//! - The full Booking → NOC → Ingest workflow and its audit trail
//! - Clarification round trip
//! - Role gating, invalid transitions and stale-status conflicts
//! - Role queues, search, status filter and pagination
//! - Admin dashboard statistics
//! - Workflow events

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method
use tvbook_api::{build_router, db, AppState};
use tvbook_common::events::{EventBus, WorkflowEvent};

/// Test helper: App over an empty in-memory database
async fn setup_app() -> (Router, EventBus) {
    let pool = db::connect_in_memory()
        .await
        .expect("Should open in-memory database");
    let events = EventBus::new(32);
    (build_router(AppState::new(pool, events.clone())), events)
}

/// Test helper: App over the demo data
async fn setup_seeded_app() -> Router {
    let pool = db::connect_in_memory()
        .await
        .expect("Should open in-memory database");
    db::seed_demo(&pool).await.expect("Should seed demo data");
    build_router(AppState::new(pool, EventBus::new(32)))
}

/// Test helper: Build a request acting as `role` (no role header when `None`)
fn test_request(method: &str, uri: &str, role: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header("X-User-Role", role);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: Send a request and return status plus JSON body
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    role: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(test_request(method, uri, role, body))
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

async fn act(app: &Router, id: &str, role: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/api/booking/requests/{}/actions", id),
        Some(role),
        Some(body),
    )
    .await
}

fn complete_feed() -> Value {
    json!({
        "bookingType": "Incoming Feed",
        "title": "Election Night Feed",
        "program": "Evening News",
        "studio": "Studio 1",
        "airDateTime": "2025-11-04T20:00",
        "feedStartTime": "2025-11-04T19:30",
        "feedEndTime": "2025-11-04T23:00",
        "language": "English",
        "priority": "Urgent",
        "nocRequired": "Yes",
        "sourceType": "SRT",
        "resolution": "HD"
    })
}

/// Create a request as Booking and return its id
async fn create(app: &Router, mut form: Value, status: &str) -> String {
    form["status"] = json!(status);
    let (code, body) = send(app, "POST", "/api/booking/requests", Some("Booking"), Some(form)).await;
    assert_eq!(code, StatusCode::CREATED, "create failed: {}", body);
    body["request"]["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health and Role Header Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_role_required() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tvbook-api");
    assert_eq!(body["database"], "connected");
    assert!(body["version"].is_string());
    assert!(body["build"]["gitHash"].is_string());
}

#[tokio::test]
async fn test_missing_role_is_unauthorized() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/booking/requests", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "X-User-Role header is required");
}

#[tokio::test]
async fn test_unknown_role_is_unauthorized() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/booking/requests", Some("Producer"), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("Producer"));
}

#[tokio::test]
async fn test_options_list_form_values() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/booking/options", Some("NOC"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookingTypes"].as_array().unwrap().len(), 4);
    assert_eq!(body["statuses"][2], "With NOC");
    assert_eq!(body["qmcSources"].as_array().unwrap().len(), 10);
    assert_eq!(body["actions"].as_array().unwrap().len(), 8);
    assert_eq!(body["queue"]["role"], "NOC");
    assert_eq!(body["queue"]["nocRequiredOnly"], true);
}

// =============================================================================
// Creation and Validation Tests
// =============================================================================

#[tokio::test]
async fn test_create_draft_allows_partial_form() {
    let (app, _) = setup_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/booking/requests",
        Some("Booking"),
        Some(json!({ "bookingType": "Invite Guest for News", "title": "Panel draft" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["request"]["status"], "Draft");
    assert_eq!(body["request"]["createdBy"], "Booking Team");
    assert!(body["request"]["id"].as_str().unwrap().starts_with("req-"));
    assert!(body.get("transition").is_none());
}

#[tokio::test]
async fn test_create_without_booking_type_is_unprocessable() {
    let (app, _) = setup_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/booking/requests",
        Some("Booking"),
        Some(json!({ "title": "No type yet" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["bookingType"], "Please select a booking type");
}

#[tokio::test]
async fn test_submit_incomplete_form_reports_every_field() {
    let (app, _) = setup_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/booking/requests",
        Some("Booking"),
        Some(json!({ "bookingType": "Invite Guest for News", "status": "Submitted" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = &body["fields"];
    assert_eq!(fields["title"], "Title is required");
    assert_eq!(fields["guestName"], "Guest name is required");
    assert_eq!(fields["inewsRundownId"], "iNEWS Rundown ID is required");
    assert!(fields.get("nocRequired").is_none());
    assert!(fields.get("feedStartTime").is_none());
}

#[tokio::test]
async fn test_feed_window_must_be_ordered() {
    let (app, _) = setup_app().await;
    let mut form = complete_feed();
    form["feedEndTime"] = json!("2025-11-04T19:00");
    form["status"] = json!("Submitted");

    let (status, body) = send(&app, "POST", "/api/booking/requests", Some("Booking"), Some(form)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["fields"]["feedEndTime"],
        "Feed end time must be after feed start time"
    );
}

#[tokio::test]
async fn test_only_booking_team_creates_requests() {
    let (app, _) = setup_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/booking/requests",
        Some("NOC"),
        Some(complete_feed()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut form = complete_feed();
    form["status"] = json!("With Ingest");
    let (status, _) = send(&app, "POST", "/api/booking/requests", Some("Booking"), Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_label_is_bad_request() {
    let (app, _) = setup_app().await;
    let mut form = complete_feed();
    form["priority"] = json!("Whenever");

    let (status, body) = send(&app, "POST", "/api/booking/requests", Some("Booking"), Some(form)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_body_is_json_bad_request() {
    let (app, _) = setup_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/booking/requests")
                .header("X-User-Role", "Booking")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("JSON"));

    // No content type at all
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/booking/requests/req-001/actions")
                .header("X-User-Role", "NOC")
                .body(Body::from(r#"{"action":"acknowledge"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_query_is_json_bad_request() {
    let (app, _) = setup_app().await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/booking/requests?page=abc",
        Some("Booking"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_full_workflow_booking_to_completed() {
    let (app, _) = setup_app().await;
    let id = create(&app, complete_feed(), "Submitted").await;

    // NOC sees the submitted request
    let (_, queue) = send(&app, "GET", "/api/booking/requests", Some("NOC"), None).await;
    assert_eq!(queue["total"], 1);
    assert_eq!(queue["items"][0]["id"], id.as_str());

    let (status, body) = act(&app, &id, "NOC", json!({ "action": "acknowledge" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "With NOC");
    assert_eq!(body["transition"]["comment"], "Status updated to With NOC");

    // Resources are required before handing over
    let (status, body) = act(&app, &id, "NOC", json!({ "action": "send_to_ingest" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["fields"]["assignedResources"],
        "Please assign resources before sending to Ingest"
    );

    let (status, body) = act(
        &app,
        &id,
        "NOC",
        json!({ "action": "send_to_ingest", "assignedResources": "Encoder-01, SRT-TX-A" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "With Ingest");
    assert_eq!(body["resources"].as_array().unwrap().len(), 2);

    // Now in Ingest's queue and out of NOC's
    let (_, queue) = send(&app, "GET", "/api/booking/requests", Some("Ingest"), None).await;
    assert_eq!(queue["total"], 1);
    let (_, queue) = send(&app, "GET", "/api/booking/requests", Some("NOC"), None).await;
    assert_eq!(queue["total"], 0);

    let (status, body) = act(&app, &id, "Ingest", json!({ "action": "mark_completed" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["folderPath"].is_string());

    let (status, body) = act(
        &app,
        &id,
        "Ingest",
        json!({ "action": "mark_completed", "folderPath": "/ingest/2025-11-04/election" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "Completed");
    assert_eq!(body["request"]["folderPath"], "/ingest/2025-11-04/election");
    assert_eq!(
        body["transition"]["comment"],
        "Request completed successfully, stored at /ingest/2025-11-04/election"
    );

    // Detail carries the whole audit trail
    let (status, detail) = send(
        &app,
        "GET",
        &format!("/api/booking/requests/{}", id),
        Some("Admin"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let steps: Vec<(&str, &str)> = detail["transitions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            (
                t["fromStatus"].as_str().unwrap(),
                t["toStatus"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        steps,
        vec![
            ("Draft", "Submitted"),
            ("Submitted", "With NOC"),
            ("With NOC", "With Ingest"),
            ("With Ingest", "Completed"),
        ]
    );
    assert_eq!(detail["resources"].as_array().unwrap().len(), 2);
    assert_eq!(detail["availableActions"], json!([]));

    // Terminal: nothing more can happen
    let (status, _) = act(&app, &id, "Admin", json!({ "action": "mark_not_done", "reason": "x" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_clarification_round_trip() {
    let (app, _) = setup_app().await;
    let id = create(&app, complete_feed(), "Submitted").await;

    let (status, _) = act(&app, &id, "NOC", json!({ "action": "request_clarification" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = act(
        &app,
        &id,
        "NOC",
        json!({ "action": "request_clarification", "clarificationMessage": "Which SRT port?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "Clarification Requested");
    assert_eq!(
        body["transition"]["comment"],
        "Clarification requested: Which SRT port?"
    );

    // Booking may edit while clarification is pending
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/booking/requests/{}", id),
        Some("Booking"),
        Some(json!({ "notes": "SRT port 9000", "status": "Completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "SRT port 9000");
    assert_eq!(body["status"], "Clarification Requested");

    let (status, body) = act(&app, &id, "Booking", json!({ "action": "resubmit" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "Submitted");
}

#[tokio::test]
async fn test_edit_refused_outside_editable_stages() {
    let (app, _) = setup_app().await;
    let id = create(&app, complete_feed(), "Submitted").await;

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/booking/requests/{}", id),
        Some("Booking"),
        Some(json!({ "title": "Too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let draft = create(&app, complete_feed(), "Draft").await;
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/booking/requests/{}", draft),
        Some("Ingest"),
        Some(json!({ "title": "Not my form" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_gating_and_invalid_transitions() {
    let (app, _) = setup_app().await;
    let id = create(&app, complete_feed(), "Submitted").await;

    // Wrong team
    let (status, _) = act(
        &app,
        &id,
        "Ingest",
        json!({ "action": "send_to_ingest", "assignedResources": "Encoder-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Right team, wrong stage
    let (status, body) = act(&app, &id, "Booking", json!({ "action": "submit" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Submitted"));

    // Unknown action name
    let (status, _) = act(&app, &id, "NOC", json!({ "action": "archive" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stale_expected_status_conflicts() {
    let (app, _) = setup_app().await;
    let id = create(&app, complete_feed(), "Submitted").await;

    let (status, _) = act(&app, &id, "NOC", json!({ "action": "acknowledge" })).await;
    assert_eq!(status, StatusCode::OK);

    // A second NOC screen still showing "Submitted"
    let (status, body) = act(
        &app,
        &id,
        "NOC",
        json!({ "action": "request_clarification", "clarificationMessage": "?", "expectedStatus": "Submitted" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("With NOC"));
}

#[tokio::test]
async fn test_noc_skips_requests_without_noc_and_admin_overrides() {
    let app = setup_seeded_app().await;

    // req-002 is Submitted with NOC not required
    let (status, _) = act(&app, "req-002", "NOC", json!({ "action": "acknowledge" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = act(
        &app,
        "req-002",
        "Admin",
        json!({ "action": "send_to_ingest", "assignedResources": "Interview set" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transition"]["changedBy"], "Admin Team");
}

#[tokio::test]
async fn test_existing_resources_satisfy_handover() {
    let app = setup_seeded_app().await;

    // req-003 already has SRT Encoder 3 assigned
    let (status, body) = act(&app, "req-003", "NOC", json!({ "action": "send_to_ingest" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transition"]["comment"], "Status updated to With Ingest");
    assert_eq!(body["resources"], json!([]));
}

#[tokio::test]
async fn test_mark_not_done_records_reason() {
    let app = setup_seeded_app().await;

    let (status, body) = act(
        &app,
        "req-004",
        "Ingest",
        json!({ "action": "mark_not_done", "reason": "Guest cancelled", "comment": "Rebook next week" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "Not Done");
    assert_eq!(body["request"]["notDoneReason"], "Guest cancelled");
    assert_eq!(
        body["transition"]["comment"],
        "Marked as Not Done: Guest cancelled. Note: Rebook next week"
    );
}

// =============================================================================
// Lists, History and Stats Tests
// =============================================================================

#[tokio::test]
async fn test_role_queues_over_demo_data() {
    let app = setup_seeded_app().await;

    let (_, booking) = send(&app, "GET", "/api/booking/requests", Some("Booking"), None).await;
    assert_eq!(booking["total"], 6);
    assert_eq!(booking["items"][0]["id"], "req-006", "Newest first");

    let (_, noc) = send(&app, "GET", "/api/booking/requests", Some("NOC"), None).await;
    let ids: Vec<&str> = noc["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["req-001", "req-003"]);

    let (_, ingest) = send(&app, "GET", "/api/booking/requests", Some("Ingest"), None).await;
    assert_eq!(ingest["total"], 1);
    assert_eq!(ingest["items"][0]["id"], "req-004");
}

#[tokio::test]
async fn test_search_filter_and_pagination() {
    let app = setup_seeded_app().await;

    let (_, found) = send(
        &app,
        "GET",
        "/api/booking/requests?search=MARKET",
        Some("Admin"),
        None,
    )
    .await;
    assert_eq!(found["total"], 3);

    let (_, with_noc) = send(
        &app,
        "GET",
        "/api/booking/requests?status=With%20NOC",
        Some("Admin"),
        None,
    )
    .await;
    assert_eq!(with_noc["total"], 1);
    assert_eq!(with_noc["items"][0]["id"], "req-001");

    let (_, page) = send(
        &app,
        "GET",
        "/api/booking/requests?page=2&perPage=2",
        Some("Admin"),
        None,
    )
    .await;
    assert_eq!(page["page"], 2);
    assert_eq!(page["perPage"], 2);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        "GET",
        "/api/booking/requests?status=Archived",
        Some("Admin"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_endpoints() {
    let app = setup_seeded_app().await;

    let (status, transitions) = send(
        &app,
        "GET",
        "/api/booking/requests/req-001/transitions",
        Some("NOC"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transitions[0]["comment"], "Reviewed and assigned resources");

    let (status, resources) = send(
        &app,
        "GET",
        "/api/booking/requests/req-003/resources",
        Some("NOC"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resources[0]["resourceName"], "SRT Encoder 3");
    assert_eq!(resources[0]["resourceType"], "Equipment");

    let (status, _) = send(
        &app,
        "GET",
        "/api/booking/requests/req-999/transitions",
        Some("NOC"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_request_is_not_found() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/booking/requests/req-404", Some("Booking"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("req-404"));

    let (status, _) = act(&app, "req-404", "NOC", json!({ "action": "acknowledge" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_are_admin_only() {
    let app = setup_seeded_app().await;

    let (status, _) = send(&app, "GET", "/api/booking/stats", Some("NOC"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, stats) = send(&app, "GET", "/api/booking/stats", Some("Admin"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalRequests"], 6);
    assert_eq!(stats["activeRequests"], 5);
    assert_eq!(stats["completionRate"], 16.7);
    assert_eq!(stats["byStatus"].as_array().unwrap().len(), 8);
    assert_eq!(stats["recentRequests"].as_array().unwrap().len(), 5);
}

// =============================================================================
// Event Tests
// =============================================================================

#[tokio::test]
async fn test_actions_emit_workflow_events() {
    let (app, events) = setup_app().await;
    let mut rx = events.subscribe();

    let id = create(&app, complete_feed(), "Submitted").await;
    assert!(matches!(
        rx.try_recv().unwrap(),
        WorkflowEvent::RequestCreated { .. }
    ));
    assert!(matches!(
        rx.try_recv().unwrap(),
        WorkflowEvent::StatusChanged { .. }
    ));

    let (status, _) = act(
        &app,
        &id,
        "NOC",
        json!({ "action": "save_noc_updates", "assignedResources": "Encoder-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    match rx.try_recv().unwrap() {
        WorkflowEvent::ResourcesAssigned { resources, .. } => {
            assert_eq!(resources, vec!["Encoder-01".to_string()])
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match rx.try_recv().unwrap() {
        WorkflowEvent::StatusChanged {
            request_id,
            to_status,
            ..
        } => {
            assert_eq!(request_id, id);
            assert_eq!(to_status.as_str(), "Resources Added");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

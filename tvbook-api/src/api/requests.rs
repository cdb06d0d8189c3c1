//! Booking request endpoints: list, create, detail, edit

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tvbook_common::events::WorkflowEvent;
use tvbook_common::model::{BookingForm, ResourceAssignment, WorkflowTransition};
use tvbook_common::workflow::{available_actions, Actor, WorkflowAction};
use tvbook_common::{WorkflowRequest, WorkflowStatus};

use super::ApiError;
use crate::db::{self, CreatedRequest, RequestFilter, RequestPage};
use crate::AppState;

/// Query parameters for the request list
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    /// Status label, e.g. `With NOC`
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Request with everything the detail view shows
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: WorkflowRequest,
    pub transitions: Vec<WorkflowTransition>,
    pub resources: Vec<ResourceAssignment>,
    /// Actions the calling role may take right now
    pub available_actions: Vec<WorkflowAction>,
}

fn parse_status(value: Option<&str>) -> Result<Option<WorkflowStatus>, ApiError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(label) => Ok(Some(label.parse()?)),
        None => Ok(None),
    }
}

fn body_object(body: Value) -> Result<serde_json::Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest("Request body must be a JSON object".into())),
    }
}

/// GET /api/booking/requests
///
/// The caller's work queue: NOC sees NOC-required requests awaiting it,
/// Ingest sees requests handed over for ingest, Booking and Admin see all.
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<RequestPage>, ApiError> {
    let Query(query) = query?;
    let filter = RequestFilter {
        search: query.search,
        status: parse_status(query.status.as_deref())?,
        page: query.page.unwrap_or(1),
        per_page: query.per_page,
    };
    let page = db::list_requests(&state.db, actor.role, &filter).await?;
    Ok(Json(page))
}

/// POST /api/booking/requests
///
/// Body is the booking form plus an optional `status` (`Draft` by default,
/// or `Submitted` to send it straight to NOC).
pub async fn create_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedRequest>), ApiError> {
    let Json(body) = body?;
    let mut body = body_object(body)?;
    let status = match body.remove("status") {
        Some(Value::String(label)) => {
            parse_status(Some(&label))?.unwrap_or(WorkflowStatus::Draft)
        }
        Some(Value::Null) | None => WorkflowStatus::Draft,
        Some(_) => return Err(ApiError::BadRequest("status must be a string".into())),
    };
    let form = BookingForm::from_json(Value::Object(body))?;

    let created = db::create_request(&state.db, form, status, &actor).await?;

    state.events.emit_lossy(WorkflowEvent::RequestCreated {
        request_id: created.request.id.clone(),
        status: created.request.status,
        created_by: actor.name.clone(),
        timestamp: created.request.created_at,
    });
    if let Some(transition) = &created.transition {
        state.events.emit_lossy(WorkflowEvent::StatusChanged {
            request_id: transition.request_id.clone(),
            from_status: transition.from_status,
            to_status: transition.to_status,
            role: actor.role,
            changed_by: transition.changed_by.clone(),
            comment: transition.comment.clone(),
            timestamp: transition.changed_at,
        });
    }

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/booking/requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<RequestDetail>, ApiError> {
    let request = db::get_request(&state.db, &id).await?;
    let transitions = db::list_transitions(&state.db, &id).await?;
    let resources = db::list_resources(&state.db, &id).await?;
    let available_actions = available_actions(actor.role, &request);

    Ok(Json(RequestDetail {
        request,
        transitions,
        resources,
        available_actions,
    }))
}

/// PATCH /api/booking/requests/:id
///
/// Partial form update; only Draft and Clarification Requested requests are
/// editable. `status` and other non-form keys in the body are ignored.
pub async fn update_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WorkflowRequest>, ApiError> {
    let Json(body) = body?;
    let patch = body_object(body)?;
    let updated = db::update_form(&state.db, &id, &patch, &actor).await?;

    state.events.emit_lossy(WorkflowEvent::RequestUpdated {
        request_id: updated.id.clone(),
        updated_by: actor.name.clone(),
        timestamp: updated.updated_at,
    });

    Ok(Json(updated))
}

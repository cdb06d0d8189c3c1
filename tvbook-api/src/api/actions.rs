//! Workflow action endpoint
//!
//! `POST /api/booking/requests/:id/actions` moves a request to its next stage:
//!
//! ```json
//! { "action": "send_to_ingest", "assignedResources": "Encoder-01, SRT-TX-A",
//!   "expectedStatus": "With NOC" }
//! ```

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use tvbook_common::events::WorkflowEvent;
use tvbook_common::workflow::{ActionPayload, Actor, WorkflowAction};
use tvbook_common::WorkflowStatus;

use super::ApiError;
use crate::db::{self, ActionOutcome};
use crate::AppState;

/// Action request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: WorkflowAction,
    /// Stage the caller's view showed; refused with 409 if stale
    #[serde(default)]
    pub expected_status: Option<WorkflowStatus>,
    #[serde(flatten)]
    pub payload: ActionPayload,
}

/// POST /api/booking/requests/:id/actions
pub async fn perform_action(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ActionOutcome>, ApiError> {
    let Json(body) = body?;
    let request: ActionRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid action request: {}", e)))?;

    let outcome = db::apply_action(
        &state.db,
        &id,
        request.action,
        &request.payload,
        &actor,
        request.expected_status,
    )
    .await
    .map_err(|e| {
        warn!("{} on {} by {} refused: {}", request.action, id, actor.role, e);
        ApiError::from(e)
    })?;

    if !outcome.resources.is_empty() {
        state.events.emit_lossy(WorkflowEvent::ResourcesAssigned {
            request_id: id.clone(),
            resources: outcome
                .resources
                .iter()
                .map(|r| r.resource_name.clone())
                .collect(),
            assigned_by: actor.name.clone(),
            timestamp: outcome.transition.changed_at,
        });
    }
    state.events.emit_lossy(WorkflowEvent::StatusChanged {
        request_id: id,
        from_status: outcome.transition.from_status,
        to_status: outcome.transition.to_status,
        role: actor.role,
        changed_by: outcome.transition.changed_by.clone(),
        comment: outcome.transition.comment.clone(),
        timestamp: outcome.transition.changed_at,
    });

    Ok(Json(outcome))
}

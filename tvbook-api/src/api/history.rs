//! Transition history and resource assignment endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use tvbook_common::model::{ResourceAssignment, WorkflowTransition};

use super::ApiError;
use crate::db;
use crate::AppState;

/// GET /api/booking/requests/:id/transitions
///
/// Status changes, oldest first.
pub async fn list_transitions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<WorkflowTransition>>, ApiError> {
    // 404 for unknown ids rather than an empty list
    db::get_request(&state.db, &id).await?;
    Ok(Json(db::list_transitions(&state.db, &id).await?))
}

/// GET /api/booking/requests/:id/resources
pub async fn list_resources(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ResourceAssignment>>, ApiError> {
    db::get_request(&state.db, &id).await?;
    Ok(Json(db::list_resources(&state.db, &id).await?))
}

//! Admin dashboard endpoint

use axum::{extract::State, Extension, Json};
use tvbook_common::workflow::{Actor, WorkflowError};
use tvbook_common::UserRole;

use super::ApiError;
use crate::db::{self, DashboardStats};
use crate::AppState;

/// GET /api/booking/stats
///
/// Admin only.
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<DashboardStats>, ApiError> {
    if actor.role != UserRole::Admin {
        return Err(WorkflowError::RoleNotPermitted {
            role: actor.role,
            what: "view dashboard statistics",
        }
        .into());
    }
    Ok(Json(db::dashboard_stats(&state.db).await?))
}

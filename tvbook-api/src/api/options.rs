//! Form option lists
//!
//! Dropdown values for the booking forms, plus the caller's queue and the
//! actions each team owns, so clients do not hard-code labels.

use axum::{Extension, Json};
use serde::Serialize;
use tvbook_common::model::{
    BookingType, DownloadSource, KeyFill, Language, Priority, QmcSource, Resolution,
    ResourceAssignmentType, ReturnPath, SourceType, Studio, YesNo,
};
use tvbook_common::workflow::{queue_requires_noc, queue_statuses, Actor, WorkflowAction};
use tvbook_common::{UserRole, WorkflowStatus};

/// One workflow action as shown to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionInfo {
    pub action: WorkflowAction,
    pub owner: UserRole,
    pub from: &'static [WorkflowStatus],
    pub to: WorkflowStatus,
}

/// Queue the caller works from
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueInfo {
    pub role: UserRole,
    /// `None` when the role sees every stage
    pub statuses: Option<&'static [WorkflowStatus]>,
    pub noc_required_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOptions {
    pub booking_types: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
    pub roles: Vec<&'static str>,
    pub priorities: Vec<&'static str>,
    pub languages: Vec<&'static str>,
    pub studios: Vec<&'static str>,
    pub yes_no: Vec<&'static str>,
    pub source_types: Vec<&'static str>,
    pub qmc_sources: Vec<&'static str>,
    pub resource_assignment_types: Vec<&'static str>,
    pub resolutions: Vec<&'static str>,
    pub return_paths: Vec<&'static str>,
    pub key_fill: Vec<&'static str>,
    pub download_sources: Vec<&'static str>,
    pub actions: Vec<ActionInfo>,
    pub queue: QueueInfo,
}

fn labels<T>(all: &[T], label: fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(label).collect()
}

/// GET /api/booking/options
pub async fn get_options(Extension(actor): Extension<Actor>) -> Json<BookingOptions> {
    Json(BookingOptions {
        booking_types: labels(BookingType::ALL, BookingType::as_str),
        statuses: labels(WorkflowStatus::ALL, WorkflowStatus::as_str),
        roles: labels(UserRole::ALL, UserRole::as_str),
        priorities: labels(Priority::ALL, Priority::as_str),
        languages: labels(Language::ALL, Language::as_str),
        studios: labels(Studio::ALL, Studio::as_str),
        yes_no: labels(YesNo::ALL, YesNo::as_str),
        source_types: labels(SourceType::ALL, SourceType::as_str),
        qmc_sources: labels(QmcSource::ALL, QmcSource::as_str),
        resource_assignment_types: labels(
            ResourceAssignmentType::ALL,
            ResourceAssignmentType::as_str,
        ),
        resolutions: labels(Resolution::ALL, Resolution::as_str),
        return_paths: labels(ReturnPath::ALL, ReturnPath::as_str),
        key_fill: labels(KeyFill::ALL, KeyFill::as_str),
        download_sources: labels(DownloadSource::ALL, DownloadSource::as_str),
        actions: WorkflowAction::ALL
            .iter()
            .map(|action| ActionInfo {
                action: *action,
                owner: action.owner(),
                from: action.allowed_from(),
                to: action.target(),
            })
            .collect(),
        queue: QueueInfo {
            role: actor.role,
            statuses: queue_statuses(actor.role),
            noc_required_only: queue_requires_noc(actor.role),
        },
    })
}

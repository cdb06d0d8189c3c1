//! Status transition model
//!
//! A request moves Booking → NOC → Ingest through a fixed set of stages.
//! Each [`WorkflowAction`] is owned by one team, may start only from certain
//! stages, and may demand data before it is allowed:
//!
//! | action                  | team    | target                    | requires                   |
//! |-------------------------|---------|---------------------------|----------------------------|
//! | `submit` / `resubmit`   | Booking | Submitted                 | complete form              |
//! | `acknowledge`           | NOC     | With NOC                  | NOC required               |
//! | `save_noc_updates`      | NOC     | Resources Added           | at least one resource      |
//! | `request_clarification` | NOC     | Clarification Requested   | clarification message      |
//! | `send_to_ingest`        | NOC     | With Ingest               | at least one resource      |
//! | `mark_completed`        | Ingest  | Completed                 | folder path                |
//! | `mark_not_done`         | Ingest  | Not Done                  | reason                     |
//!
//! Admin may perform any action. Planning is pure: [`plan_transition`] decides
//! what should happen and the store applies the plan atomically.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{UserRole, WorkflowRequest, WorkflowStatus};
use crate::validation::{validate_submission, ValidationErrors};

use WorkflowStatus::*;

/// Stages the NOC team works from
pub const NOC_QUEUE: &[WorkflowStatus] = &[Submitted, WithNoc, ClarificationRequested, ResourcesAdded];

/// Stages the Ingest team works from
pub const INGEST_QUEUE: &[WorkflowStatus] = &[WithIngest];

/// Stages in which the booking form may still be edited
pub const EDITABLE: &[WorkflowStatus] = &[Draft, ClarificationRequested];

/// Operation that moves a request to another stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Submit,
    Resubmit,
    Acknowledge,
    SaveNocUpdates,
    RequestClarification,
    SendToIngest,
    MarkCompleted,
    MarkNotDone,
}

impl WorkflowAction {
    pub const ALL: &'static [WorkflowAction] = &[
        WorkflowAction::Submit,
        WorkflowAction::Resubmit,
        WorkflowAction::Acknowledge,
        WorkflowAction::SaveNocUpdates,
        WorkflowAction::RequestClarification,
        WorkflowAction::SendToIngest,
        WorkflowAction::MarkCompleted,
        WorkflowAction::MarkNotDone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Submit => "submit",
            WorkflowAction::Resubmit => "resubmit",
            WorkflowAction::Acknowledge => "acknowledge",
            WorkflowAction::SaveNocUpdates => "save_noc_updates",
            WorkflowAction::RequestClarification => "request_clarification",
            WorkflowAction::SendToIngest => "send_to_ingest",
            WorkflowAction::MarkCompleted => "mark_completed",
            WorkflowAction::MarkNotDone => "mark_not_done",
        }
    }

    /// Team that owns the action
    pub fn owner(&self) -> UserRole {
        match self {
            WorkflowAction::Submit | WorkflowAction::Resubmit => UserRole::Booking,
            WorkflowAction::Acknowledge
            | WorkflowAction::SaveNocUpdates
            | WorkflowAction::RequestClarification
            | WorkflowAction::SendToIngest => UserRole::Noc,
            WorkflowAction::MarkCompleted | WorkflowAction::MarkNotDone => UserRole::Ingest,
        }
    }

    /// Whether `role` may perform this action at all
    pub fn permits(&self, role: UserRole) -> bool {
        role == UserRole::Admin || role == self.owner()
    }

    /// Stages this action may start from
    pub fn allowed_from(&self) -> &'static [WorkflowStatus] {
        match self {
            WorkflowAction::Submit => &[Draft],
            WorkflowAction::Resubmit => &[ClarificationRequested],
            WorkflowAction::Acknowledge => &[Submitted],
            WorkflowAction::SaveNocUpdates => NOC_QUEUE,
            WorkflowAction::RequestClarification | WorkflowAction::SendToIngest => {
                &[Submitted, WithNoc, ResourcesAdded]
            }
            WorkflowAction::MarkCompleted | WorkflowAction::MarkNotDone => INGEST_QUEUE,
        }
    }

    /// Stage the request ends up in
    pub fn target(&self) -> WorkflowStatus {
        match self {
            WorkflowAction::Submit | WorkflowAction::Resubmit => Submitted,
            WorkflowAction::Acknowledge => WithNoc,
            WorkflowAction::SaveNocUpdates => ResourcesAdded,
            WorkflowAction::RequestClarification => ClarificationRequested,
            WorkflowAction::SendToIngest => WithIngest,
            WorkflowAction::MarkCompleted => Completed,
            WorkflowAction::MarkNotDone => NotDone,
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data accompanying an action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    /// Comma-separated resource names (e.g. "Encoder-01, SRT-TX-A")
    #[serde(default)]
    pub assigned_resources: Option<String>,
    #[serde(default)]
    pub clarification_message: Option<String>,
    #[serde(default)]
    pub folder_path: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Free-text note appended to the audit comment
    #[serde(default)]
    pub comment: Option<String>,
}

/// Who is acting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub role: UserRole,
    pub name: String,
}

impl Actor {
    /// Actor with an explicit display name, or the team name when none is given
    pub fn new(role: UserRole, name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| role.team_name());
        Self { role, name }
    }
}

/// Outcome of planning an action against a request
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub action: WorkflowAction,
    pub from: WorkflowStatus,
    pub to: WorkflowStatus,
    pub comment: String,
    /// Resource names to record as new assignments
    pub new_resources: Vec<String>,
    pub folder_path: Option<String>,
    pub not_done_reason: Option<String>,
}

/// Workflow rule violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("{role} role cannot perform '{action}'")]
    Forbidden { role: UserRole, action: WorkflowAction },

    #[error("Cannot {action} a request that is '{from}'")]
    InvalidTransition {
        action: WorkflowAction,
        from: WorkflowStatus,
    },

    #[error("{message}")]
    MissingData {
        field: &'static str,
        message: &'static str,
    },

    #[error("Request is incomplete: {0}")]
    Incomplete(ValidationErrors),

    #[error("NOC is not required for this request")]
    NocNotRequired,

    #[error("Request cannot be edited while '{status}'")]
    NotEditable { status: WorkflowStatus },

    #[error("{role} role cannot {what}")]
    RoleNotPermitted { role: UserRole, what: &'static str },

    #[error("New requests must start as Draft or Submitted, not '{0}'")]
    InvalidInitialStatus(WorkflowStatus),

    #[error("Request is now '{actual}', expected '{expected}'")]
    StatusChanged {
        expected: WorkflowStatus,
        actual: WorkflowStatus,
    },
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Split a comma-separated resource list into unique, trimmed names
pub fn parse_resources(input: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in input.unwrap_or_default().split(',').map(str::trim) {
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Whether a role handles requests of this kind at all
fn team_handles(role: UserRole, action: WorkflowAction, request: &WorkflowRequest) -> bool {
    // NOC only works requests that asked for it; Admin may push others through
    !(action.owner() == UserRole::Noc && role == UserRole::Noc && !request.form.needs_noc())
}

/// Decide what `action` does to `request`
///
/// `existing_resources` is the number of resources already assigned, which
/// satisfies the resource requirement on its own.
pub fn plan_transition(
    request: &WorkflowRequest,
    action: WorkflowAction,
    payload: &ActionPayload,
    actor: &Actor,
    existing_resources: usize,
) -> Result<TransitionPlan, WorkflowError> {
    if !action.permits(actor.role) {
        return Err(WorkflowError::Forbidden {
            role: actor.role,
            action,
        });
    }
    if !action.allowed_from().contains(&request.status) {
        return Err(WorkflowError::InvalidTransition {
            action,
            from: request.status,
        });
    }
    if !team_handles(actor.role, action, request) {
        return Err(WorkflowError::NocNotRequired);
    }

    let to = action.target();
    let mut new_resources = Vec::new();
    let mut folder_path = None;
    let mut not_done_reason = None;

    let base_comment = match action {
        WorkflowAction::Submit | WorkflowAction::Resubmit => {
            validate_submission(&request.form).map_err(WorkflowError::Incomplete)?;
            "Request submitted for processing".to_string()
        }
        WorkflowAction::Acknowledge => format!("Status updated to {}", to),
        WorkflowAction::SaveNocUpdates | WorkflowAction::SendToIngest => {
            new_resources = parse_resources(payload.assigned_resources.as_deref());
            if new_resources.is_empty() && existing_resources == 0 {
                let message = if action == WorkflowAction::SendToIngest {
                    "Please assign resources before sending to Ingest"
                } else {
                    "Please assign at least one resource"
                };
                return Err(WorkflowError::MissingData {
                    field: "assignedResources",
                    message,
                });
            }
            if !new_resources.is_empty() {
                format!("Resources assigned: {}", new_resources.join(", "))
            } else if action == WorkflowAction::SaveNocUpdates {
                "NOC updates saved and resources added".to_string()
            } else {
                format!("Status updated to {}", to)
            }
        }
        WorkflowAction::RequestClarification => {
            let message = non_blank(payload.clarification_message.as_ref()).ok_or(
                WorkflowError::MissingData {
                    field: "clarificationMessage",
                    message: "Please provide a clarification message",
                },
            )?;
            format!("Clarification requested: {}", message)
        }
        WorkflowAction::MarkCompleted => {
            let path = non_blank(payload.folder_path.as_ref()).ok_or(
                WorkflowError::MissingData {
                    field: "folderPath",
                    message: "Please provide the folder path where content is stored",
                },
            )?;
            let comment = format!("Request completed successfully, stored at {}", path);
            folder_path = Some(path);
            comment
        }
        WorkflowAction::MarkNotDone => {
            let reason = non_blank(payload.reason.as_ref()).ok_or(WorkflowError::MissingData {
                field: "reason",
                message: "Please provide a reason for marking as Not Done",
            })?;
            let comment = format!("Marked as Not Done: {}", reason);
            not_done_reason = Some(reason);
            comment
        }
    };

    let comment = match non_blank(payload.comment.as_ref()) {
        Some(note) => format!("{}. Note: {}", base_comment, note),
        None => base_comment,
    };

    Ok(TransitionPlan {
        action,
        from: request.status,
        to,
        comment,
        new_resources,
        folder_path,
        not_done_reason,
    })
}

/// Actions `role` could take on `request` right now
///
/// Data requirements are not checked here; they are reported when the
/// action is attempted.
pub fn available_actions(role: UserRole, request: &WorkflowRequest) -> Vec<WorkflowAction> {
    WorkflowAction::ALL
        .iter()
        .copied()
        .filter(|action| {
            action.permits(role)
                && action.allowed_from().contains(&request.status)
                && team_handles(role, *action, request)
        })
        .collect()
}

/// Stages a role's work queue is restricted to (`None` = everything)
pub fn queue_statuses(role: UserRole) -> Option<&'static [WorkflowStatus]> {
    match role {
        UserRole::Noc => Some(NOC_QUEUE),
        UserRole::Ingest => Some(INGEST_QUEUE),
        UserRole::Booking | UserRole::Admin => None,
    }
}

/// Whether a role's queue only holds requests that need NOC
pub fn queue_requires_noc(role: UserRole) -> bool {
    role == UserRole::Noc
}

/// Whether `request` appears in `role`'s work queue
pub fn in_queue(role: UserRole, request: &WorkflowRequest) -> bool {
    let status_ok = queue_statuses(role)
        .map(|statuses| statuses.contains(&request.status))
        .unwrap_or(true);
    status_ok && (!queue_requires_noc(role) || request.form.needs_noc())
}

fn ensure_booking_team(role: UserRole, what: &'static str) -> Result<(), WorkflowError> {
    match role {
        UserRole::Booking | UserRole::Admin => Ok(()),
        _ => Err(WorkflowError::RoleNotPermitted { role, what }),
    }
}

/// Check that `role` may edit a request in `status`
pub fn check_editable(role: UserRole, status: WorkflowStatus) -> Result<(), WorkflowError> {
    ensure_booking_team(role, "edit bookings")?;
    if EDITABLE.contains(&status) {
        Ok(())
    } else {
        Err(WorkflowError::NotEditable { status })
    }
}

/// Check that `role` may create a request starting in `status`
pub fn check_creatable(role: UserRole, status: WorkflowStatus) -> Result<(), WorkflowError> {
    ensure_booking_team(role, "create bookings")?;
    match status {
        Draft | Submitted => Ok(()),
        other => Err(WorkflowError::InvalidInitialStatus(other)),
    }
}

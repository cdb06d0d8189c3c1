//! API error responses
//!
//! Every failure is answered as JSON `{"error": msg}`; validation failures add
//! a `fields` map so forms can show messages next to the offending inputs.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};
use tvbook_common::validation::ValidationErrors;
use tvbook_common::workflow::WorkflowError;
use tvbook_common::Error;

/// Request handling errors
#[derive(Debug)]
pub enum ApiError {
    /// No `X-User-Role` header
    MissingRole,
    /// `X-User-Role` names no known team
    UnknownRole(String),
    BadRequest(String),
    Service(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Service(Error::Workflow(err))
    }
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Forbidden { .. } | WorkflowError::RoleNotPermitted { .. } => {
            StatusCode::FORBIDDEN
        }
        WorkflowError::InvalidTransition { .. }
        | WorkflowError::NotEditable { .. }
        | WorkflowError::NocNotRequired
        | WorkflowError::StatusChanged { .. } => StatusCode::CONFLICT,
        WorkflowError::MissingData { .. } | WorkflowError::Incomplete(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WorkflowError::InvalidInitialStatus(_) => StatusCode::BAD_REQUEST,
    }
}

fn field_errors(err: &WorkflowError) -> Option<ValidationErrors> {
    match err {
        WorkflowError::Incomplete(errors) => Some(errors.clone()),
        WorkflowError::MissingData { field, message } => {
            let mut errors = ValidationErrors::default();
            errors.add(field, message);
            Some(errors)
        }
        _ => None,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingRole | ApiError::UnknownRole(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                Error::Workflow(workflow) => workflow_status(workflow),
                Error::Database(_)
                | Error::Io(_)
                | Error::Config(_)
                | Error::Corrupt(_)
                | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body: Value = match self {
            ApiError::MissingRole => json!({ "error": "X-User-Role header is required" }),
            ApiError::UnknownRole(role) => json!({
                "error": format!("Unknown role '{}'", role),
            }),
            ApiError::BadRequest(message) => json!({ "error": message }),
            ApiError::Service(Error::Workflow(err)) => match field_errors(&err) {
                Some(fields) => json!({ "error": err.to_string(), "fields": fields }),
                None => json!({ "error": err.to_string() }),
            },
            ApiError::Service(err) => {
                if status.is_server_error() {
                    error!("Request failed: {}", err);
                } else {
                    warn!("Request rejected: {}", err);
                }
                json!({ "error": err.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}

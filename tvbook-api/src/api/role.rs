//! Caller identification for the booking API
//!
//! The forms assert which team is acting through headers:
//! - `X-User-Role`: `Booking`, `NOC`, `Ingest` or `Admin` (case-insensitive)
//! - `X-User-Name`: optional display name recorded on audit entries
//!
//! The middleware resolves them into an [`Actor`] request extension and
//! answers 401 when the role is missing or unknown. Applied to `/api/booking`
//! routes only; `/health` and the event stream are open.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;
use tvbook_common::workflow::Actor;
use tvbook_common::UserRole;

use super::ApiError;

pub const ROLE_HEADER: &str = "x-user-role";
pub const NAME_HEADER: &str = "x-user-name";

/// Resolve the acting team from request headers
pub fn actor_from_headers(headers: &axum::http::HeaderMap) -> Result<Actor, ApiError> {
    let raw = headers.get(ROLE_HEADER).ok_or(ApiError::MissingRole)?;
    let raw = raw
        .to_str()
        .map_err(|_| ApiError::UnknownRole(String::from_utf8_lossy(raw.as_bytes()).into_owned()))?;
    if raw.trim().is_empty() {
        return Err(ApiError::MissingRole);
    }
    let role: UserRole = raw
        .parse()
        .map_err(|_| ApiError::UnknownRole(raw.to_string()))?;

    let name = headers.get(NAME_HEADER).and_then(|v| v.to_str().ok());
    Ok(Actor::new(role, name))
}

/// Role middleware
pub async fn role_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let actor = actor_from_headers(request.headers())?;
    debug!(
        "{} {} as {} ({})",
        request.method(),
        request.uri().path(),
        actor.name,
        actor.role
    );
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

//! tvbook-api library - booking workflow service
//!
//! REST backend for the Booking → NOC → Ingest forms: request storage,
//! role-gated workflow actions, audit history, admin statistics and a live
//! event stream.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tvbook_common::events::EventBus;

pub mod api;
pub mod db;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Workflow events for SSE subscribers
    pub events: EventBus,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }
}

/// Build application router
///
/// `/api/booking/*` routes require `X-User-Role`; health and the event
/// stream do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let booking = Router::new()
        .route("/api/booking/options", get(api::get_options))
        .route(
            "/api/booking/requests",
            get(api::list_requests).post(api::create_request),
        )
        .route(
            "/api/booking/requests/:id",
            get(api::get_request).patch(api::update_request),
        )
        .route("/api/booking/requests/:id/actions", post(api::perform_action))
        .route(
            "/api/booking/requests/:id/transitions",
            get(api::list_transitions),
        )
        .route("/api/booking/requests/:id/resources", get(api::list_resources))
        .route("/api/booking/stats", get(api::get_stats))
        .layer(middleware::from_fn(api::role_middleware));

    let public = Router::new()
        .route("/api/booking/events", get(api::event_stream))
        .merge(api::health_routes());

    Router::new()
        .merge(booking)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! HTTP API handlers for tvbook-api

pub mod actions;
pub mod error;
pub mod health;
pub mod history;
pub mod options;
pub mod requests;
pub mod role;
pub mod sse;
pub mod stats;

pub use actions::perform_action;
pub use error::ApiError;
pub use health::health_routes;
pub use history::{list_resources, list_transitions};
pub use options::get_options;
pub use requests::{create_request, get_request, list_requests, update_request};
pub use role::role_middleware;
pub use sse::event_stream;
pub use stats::get_stats;

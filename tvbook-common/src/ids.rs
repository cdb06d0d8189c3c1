//! Record id utilities
//!
//! Ids are opaque strings with a type prefix (`req-`, `trans-`, `res-`) so a
//! stray id in a log line says what it refers to.

use uuid::Uuid;

/// Prefix for workflow request ids
pub const REQUEST_PREFIX: &str = "req";
/// Prefix for transition ids
pub const TRANSITION_PREFIX: &str = "trans";
/// Prefix for resource assignment ids
pub const RESOURCE_PREFIX: &str = "res";

/// Generate a new prefixed id
pub fn generate(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Generate a new workflow request id
pub fn request_id() -> String {
    generate(REQUEST_PREFIX)
}

/// Generate a new transition id
pub fn transition_id() -> String {
    generate(TRANSITION_PREFIX)
}

/// Generate a new resource assignment id
pub fn resource_id() -> String {
    generate(RESOURCE_PREFIX)
}

//! # TV Booking Common Library
//!
//! Shared code for the booking workflow service:
//! - Domain model (requests, transitions, resource assignments)
//! - Form validation rules
//! - Status transition model (role-gated workflow actions)
//! - Workflow events (WorkflowEvent enum + EventBus)
//! - Configuration loading
//! - Id and timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod model;
pub mod time;
pub mod validation;
pub mod workflow;

pub use error::{Error, Result};
pub use model::{UserRole, WorkflowRequest, WorkflowStatus};

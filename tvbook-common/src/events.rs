//! Workflow event types and EventBus
//!
//! Every state-changing operation emits a [`WorkflowEvent`]. The HTTP layer
//! streams them to connected forms over SSE so open list and detail views
//! refresh without polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::model::{UserRole, WorkflowStatus};

/// Booking workflow events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum WorkflowEvent {
    /// A new request was saved (as Draft or straight to Submitted)
    RequestCreated {
        request_id: String,
        status: WorkflowStatus,
        created_by: String,
        timestamp: DateTime<Utc>,
    },

    /// Form fields of a request were edited
    RequestUpdated {
        request_id: String,
        updated_by: String,
        timestamp: DateTime<Utc>,
    },

    /// A workflow action moved a request to another stage
    StatusChanged {
        request_id: String,
        from_status: WorkflowStatus,
        to_status: WorkflowStatus,
        role: UserRole,
        changed_by: String,
        comment: String,
        timestamp: DateTime<Utc>,
    },

    /// NOC assigned resources to a request
    ResourcesAssigned {
        request_id: String,
        resources: Vec<String>,
        assigned_by: String,
        timestamp: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkflowEvent::RequestCreated { .. } => "RequestCreated",
            WorkflowEvent::RequestUpdated { .. } => "RequestUpdated",
            WorkflowEvent::StatusChanged { .. } => "StatusChanged",
            WorkflowEvent::ResourcesAssigned { .. } => "ResourcesAssigned",
        }
    }

    /// Id of the request the event concerns
    pub fn request_id(&self) -> &str {
        match self {
            WorkflowEvent::RequestCreated { request_id, .. }
            | WorkflowEvent::RequestUpdated { request_id, .. }
            | WorkflowEvent::StatusChanged { request_id, .. }
            | WorkflowEvent::ResourcesAssigned { request_id, .. } => request_id,
        }
    }
}

/// Broadcast channel for workflow events
///
/// Cloning the bus shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WorkflowEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    ///
    /// Slow subscribers that fall further behind lose the oldest events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(
        &self,
        event: WorkflowEvent,
    ) -> Result<usize, broadcast::error::SendError<WorkflowEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if nobody is listening
    pub fn emit_lossy(&self, event: WorkflowEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

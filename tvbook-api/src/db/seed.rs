//! Demo data for trying the booking forms without real bookings
//!
//! Six requests spread across the workflow, two audit entries and two NOC
//! resource assignments. Seeding only touches an empty database.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::info;
use tvbook_common::model::{
    BookingForm, ResourceAssignment, WorkflowTransition, EQUIPMENT_RESOURCE_TYPE,
};
use tvbook_common::{time, Error, Result, WorkflowRequest, WorkflowStatus};

use super::history::{insert_resource, insert_transition};
use super::requests::insert_request;

fn at(value: &str) -> Result<DateTime<Utc>> {
    time::parse_form_datetime(value)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::Internal(format!("Bad demo timestamp '{}'", value)))
}

fn demo_request(
    id: &str,
    status: WorkflowStatus,
    created_by: &str,
    created_at: &str,
    updated_at: &str,
    form: Value,
) -> Result<WorkflowRequest> {
    Ok(WorkflowRequest {
        id: id.to_string(),
        form: BookingForm::from_json(form)?,
        status,
        folder_path: None,
        not_done_reason: None,
        created_by: created_by.to_string(),
        created_at: at(created_at)?,
        updated_at: at(updated_at)?,
    })
}

fn demo_requests() -> Result<Vec<WorkflowRequest>> {
    let mut completed = demo_request(
        "req-005",
        WorkflowStatus::Completed,
        "Sarah Johnson",
        "2025-10-18T12:00:00",
        "2025-10-22T08:45:00",
        json!({
            "bookingType": "Incoming Feed",
            "title": "Stock Exchange Opening Bell",
            "program": "Morning Markets",
            "airDateTime": "2025-10-22T08:30:00",
            "language": "English",
            "priority": "Urgent",
            "sourceType": "Satellite",
            "vmixInputNumber": "Input 8",
            "returnPath": "Enabled",
            "keyFill": "Fill",
            "nocRequired": "Yes",
            "resourcesNeeded": "Satellite receiver 2",
            "newsroomTicket": "TICK-1238",
            "complianceTags": "Live, Financial",
            "notes": "Critical timing - must be live at 08:30 sharp"
        }),
    )?;
    completed.folder_path = Some("/ingest/2025-10-22/opening-bell".to_string());

    Ok(vec![
        demo_request(
            "req-001",
            WorkflowStatus::WithNoc,
            "Sarah Johnson",
            "2025-10-21T10:30:00",
            "2025-10-21T11:45:00",
            json!({
                "bookingType": "Incoming Feed",
                "title": "Breaking News - Market Update",
                "program": "Business Today",
                "airDateTime": "2025-10-22T14:00:00",
                "language": "English",
                "priority": "Urgent",
                "sourceType": "vMix",
                "vmixInputNumber": "Input 5",
                "returnPath": "Enabled",
                "keyFill": "Key",
                "nocRequired": "Yes",
                "resourcesNeeded": "Studio 2, Camera 3",
                "newsroomTicket": "TICK-1234",
                "complianceTags": "Financial, Live",
                "notes": "Requires real-time graphics overlay"
            }),
        )?,
        demo_request(
            "req-002",
            WorkflowStatus::Submitted,
            "Mike Chen",
            "2025-10-21T09:15:00",
            "2025-10-21T09:15:00",
            json!({
                "bookingType": "Invite Guest for Program",
                "title": "CEO Interview - Tech Innovations",
                "program": "Tech Talk",
                "airDateTime": "2025-10-23T16:30:00",
                "language": "English",
                "priority": "High",
                "guestName": "John Martinez",
                "guestContact": "john.martinez@techcorp.com",
                "inewsRundownId": "RUN-2025-1021",
                "storySlug": "tech-ceo-interview",
                "rundownPosition": "Block 2",
                "nocRequired": "No",
                "resourcesNeeded": "Interview set, 2 mics",
                "newsroomTicket": "TICK-1235",
                "complianceTags": "Interview, Pre-recorded",
                "notes": "Guest arriving 30 mins early for makeup"
            }),
        )?,
        demo_request(
            "req-003",
            WorkflowStatus::ResourcesAdded,
            "Sarah Johnson",
            "2025-10-20T14:20:00",
            "2025-10-21T08:30:00",
            json!({
                "bookingType": "Incoming Feed",
                "title": "Live Trading Floor Feed",
                "program": "Market Watch",
                "airDateTime": "2025-10-22T09:00:00",
                "language": "English",
                "priority": "Normal",
                "sourceType": "SRT",
                "vmixInputNumber": "Input 12",
                "returnPath": "Disabled",
                "keyFill": "None",
                "nocRequired": "Yes",
                "resourcesNeeded": "Encoder 3, Network feed",
                "newsroomTicket": "TICK-1236",
                "complianceTags": "Live, Financial",
                "notes": "Backup feed available on Satellite"
            }),
        )?,
        demo_request(
            "req-004",
            WorkflowStatus::WithIngest,
            "Ahmed Hassan",
            "2025-10-19T16:00:00",
            "2025-10-21T10:00:00",
            json!({
                "bookingType": "Invite Guest for Program",
                "title": "Economic Analyst Panel",
                "program": "Business Insights",
                "airDateTime": "2025-10-24T11:00:00",
                "language": "Arabic",
                "priority": "High",
                "guestName": "Dr. Fatima Al-Said",
                "guestContact": "f.alsaid@economist.org",
                "inewsRundownId": "RUN-2025-1022",
                "storySlug": "economic-panel",
                "rundownPosition": "Block 1",
                "nocRequired": "Yes",
                "resourcesNeeded": "Panel set, 4 mics, teleprompter",
                "newsroomTicket": "TICK-1237",
                "complianceTags": "Panel, Live",
                "notes": "Three additional panelists confirmed"
            }),
        )?,
        completed,
        demo_request(
            "req-006",
            WorkflowStatus::Draft,
            "Mike Chen",
            "2025-10-21T13:45:00",
            "2025-10-21T13:45:00",
            json!({
                "bookingType": "Invite Guest for Program",
                "title": "Startup Founder Feature",
                "program": "Innovation Hub",
                "airDateTime": "2025-10-25T14:00:00",
                "language": "English",
                "priority": "Normal",
                "guestName": "Lisa Park",
                "guestContact": "lisa@startuphub.com",
                "inewsRundownId": "RUN-2025-1023",
                "storySlug": "startup-feature",
                "rundownPosition": "Block 3",
                "nocRequired": "No",
                "resourcesNeeded": "Green screen, lighting kit",
                "newsroomTicket": "TICK-1239",
                "complianceTags": "Feature, Pre-recorded",
                "notes": "Product demo required - 5 min segment"
            }),
        )?,
    ])
}

fn demo_transitions() -> Result<Vec<WorkflowTransition>> {
    Ok(vec![
        WorkflowTransition {
            id: "trans-001".to_string(),
            request_id: "req-001".to_string(),
            from_status: WorkflowStatus::Submitted,
            to_status: WorkflowStatus::WithNoc,
            changed_by: "NOC Team".to_string(),
            changed_at: at("2025-10-21T11:45:00")?,
            comment: "Reviewed and assigned resources".to_string(),
        },
        WorkflowTransition {
            id: "trans-002".to_string(),
            request_id: "req-003".to_string(),
            from_status: WorkflowStatus::WithNoc,
            to_status: WorkflowStatus::ResourcesAdded,
            changed_by: "NOC Team".to_string(),
            changed_at: at("2025-10-21T08:30:00")?,
            comment: "Encoder configured and tested".to_string(),
        },
    ])
}

fn demo_resources() -> Result<Vec<ResourceAssignment>> {
    let resource = |id: &str, request_id: &str, name: &str, assigned_at: &str| -> Result<_> {
        Ok(ResourceAssignment {
            id: id.to_string(),
            request_id: request_id.to_string(),
            resource_type: EQUIPMENT_RESOURCE_TYPE.to_string(),
            resource_name: name.to_string(),
            assigned_by: "NOC Team".to_string(),
            assigned_at: at(assigned_at)?,
        })
    };
    Ok(vec![
        resource("res-001", "req-001", "vMix Station 2", "2025-10-21T11:50:00")?,
        resource("res-002", "req-003", "SRT Encoder 3", "2025-10-21T08:30:00")?,
    ])
}

/// Load the demo data into an empty database
///
/// Returns `false` without writing anything when requests already exist.
pub async fn seed_demo(pool: &SqlitePool) -> Result<bool> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!("Database already holds {} requests, skipping demo data", existing);
        return Ok(false);
    }

    let requests = demo_requests()?;
    let transitions = demo_transitions()?;
    let resources = demo_resources()?;

    let mut tx = pool.begin().await?;
    for request in &requests {
        insert_request(&mut *tx, request).await?;
    }
    for transition in &transitions {
        insert_transition(&mut *tx, transition).await?;
    }
    for resource in &resources {
        insert_resource(&mut *tx, resource).await?;
    }
    tx.commit().await?;

    info!(
        "Seeded demo data: {} requests, {} transitions, {} resources",
        requests.len(),
        transitions.len(),
        resources.len()
    );
    Ok(true)
}

//! Transition audit trail and resource assignments

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};
use tvbook_common::model::{ResourceAssignment, WorkflowTransition};
use tvbook_common::{time, Result};

use super::{decode_label, decode_timestamp};

fn transition_from_row(row: &SqliteRow) -> Result<WorkflowTransition> {
    let from_status: String = row.try_get("from_status")?;
    let to_status: String = row.try_get("to_status")?;
    let changed_at: String = row.try_get("changed_at")?;

    Ok(WorkflowTransition {
        id: row.try_get("id")?,
        request_id: row.try_get("request_id")?,
        from_status: decode_label("from_status", &from_status)?,
        to_status: decode_label("to_status", &to_status)?,
        changed_by: row.try_get("changed_by")?,
        changed_at: decode_timestamp("changed_at", &changed_at)?,
        comment: row.try_get("comment")?,
    })
}

fn resource_from_row(row: &SqliteRow) -> Result<ResourceAssignment> {
    let assigned_at: String = row.try_get("assigned_at")?;

    Ok(ResourceAssignment {
        id: row.try_get("id")?,
        request_id: row.try_get("request_id")?,
        resource_type: row.try_get("resource_type")?,
        resource_name: row.try_get("resource_name")?,
        assigned_by: row.try_get("assigned_by")?,
        assigned_at: decode_timestamp("assigned_at", &assigned_at)?,
    })
}

/// Status changes of a request, oldest first
pub async fn list_transitions<'e, E>(executor: E, request_id: &str) -> Result<Vec<WorkflowTransition>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, request_id, from_status, to_status, changed_by, changed_at, comment
         FROM transitions WHERE request_id = ? ORDER BY changed_at ASC, rowid ASC",
    )
    .bind(request_id)
    .fetch_all(executor)
    .await?;

    rows.iter().map(transition_from_row).collect()
}

/// Resources assigned to a request, oldest first
pub async fn list_resources<'e, E>(executor: E, request_id: &str) -> Result<Vec<ResourceAssignment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, request_id, resource_type, resource_name, assigned_by, assigned_at
         FROM resources WHERE request_id = ? ORDER BY assigned_at ASC, rowid ASC",
    )
    .bind(request_id)
    .fetch_all(executor)
    .await?;

    rows.iter().map(resource_from_row).collect()
}

pub async fn count_resources<'e, E>(executor: E, request_id: &str) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM resources WHERE request_id = ?")
        .bind(request_id)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

pub(crate) async fn insert_transition<'e, E>(executor: E, transition: &WorkflowTransition) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO transitions (id, request_id, from_status, to_status, changed_by, changed_at, comment)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&transition.id)
    .bind(&transition.request_id)
    .bind(transition.from_status.as_str())
    .bind(transition.to_status.as_str())
    .bind(&transition.changed_by)
    .bind(time::to_storage(&transition.changed_at))
    .bind(&transition.comment)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn insert_resource<'e, E>(executor: E, resource: &ResourceAssignment) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO resources (id, request_id, resource_type, resource_name, assigned_by, assigned_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&resource.id)
    .bind(&resource.request_id)
    .bind(&resource.resource_type)
    .bind(&resource.resource_name)
    .bind(&resource.assigned_by)
    .bind(time::to_storage(&resource.assigned_at))
    .execute(executor)
    .await?;
    Ok(())
}

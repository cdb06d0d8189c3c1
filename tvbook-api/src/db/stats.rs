//! Admin dashboard statistics

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tvbook_common::model::{BookingType, Priority};
use tvbook_common::{Result, WorkflowRequest, WorkflowStatus};

use super::requests::{request_from_row, SELECT_REQUEST};

/// Number of requests shown in the "recent" panel
pub const RECENT_LIMIT: i64 = 5;

/// Count of requests carrying one label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_requests: i64,
    /// Every stage, including those with no requests
    pub by_status: Vec<LabelCount>,
    pub by_priority: Vec<LabelCount>,
    pub by_booking_type: Vec<LabelCount>,
    pub noc_required_count: i64,
    /// Percentage of requests completed, one decimal place
    pub completion_rate: f64,
    /// Requests not yet Completed or Not Done
    pub active_requests: i64,
    pub recent_requests: Vec<WorkflowRequest>,
}

async fn grouped_counts(pool: &SqlitePool, column: &str) -> Result<HashMap<String, i64>> {
    let rows = sqlx::query(&format!(
        "SELECT {column} AS label, COUNT(*) AS count FROM requests \
         WHERE {column} IS NOT NULL GROUP BY {column}"
    ))
    .fetch_all(pool)
    .await?;

    let mut counts = HashMap::new();
    for row in rows {
        counts.insert(row.try_get::<String, _>("label")?, row.try_get::<i64, _>("count")?);
    }
    Ok(counts)
}

fn zero_filled<T: Copy>(
    all: &[T],
    label: fn(&T) -> &'static str,
    counts: &HashMap<String, i64>,
) -> Vec<LabelCount> {
    all.iter()
        .map(|value| {
            let label = label(value);
            LabelCount {
                label,
                count: counts.get(label).copied().unwrap_or(0),
            }
        })
        .collect()
}

fn count_of(counts: &[LabelCount], label: &str) -> i64 {
    counts
        .iter()
        .find(|c| c.label == label)
        .map(|c| c.count)
        .unwrap_or(0)
}

/// Completed share of `total` as a percentage rounded to one decimal
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = completed as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

/// Compute the dashboard over all stored requests
pub async fn dashboard_stats(pool: &SqlitePool) -> Result<DashboardStats> {
    let total_requests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests")
        .fetch_one(pool)
        .await?;
    let noc_required_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE noc_required = 1")
            .fetch_one(pool)
            .await?;

    let by_status = zero_filled(
        WorkflowStatus::ALL,
        WorkflowStatus::as_str,
        &grouped_counts(pool, "status").await?,
    );
    let by_priority = zero_filled(
        Priority::ALL,
        Priority::as_str,
        &grouped_counts(pool, "priority").await?,
    );
    let by_booking_type = zero_filled(
        BookingType::ALL,
        BookingType::as_str,
        &grouped_counts(pool, "booking_type").await?,
    );

    let completed = count_of(&by_status, WorkflowStatus::Completed.as_str());
    let not_done = count_of(&by_status, WorkflowStatus::NotDone.as_str());

    let recent_rows = sqlx::query(&format!(
        "{} ORDER BY created_at DESC, id DESC LIMIT ?",
        SELECT_REQUEST
    ))
    .bind(RECENT_LIMIT)
    .fetch_all(pool)
    .await?;
    let recent_requests = recent_rows
        .iter()
        .map(request_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok(DashboardStats {
        total_requests,
        by_status,
        by_priority,
        by_booking_type,
        noc_required_count,
        completion_rate: completion_rate(completed, total_requests),
        active_requests: total_requests - completed - not_done,
        recent_requests,
    })
}

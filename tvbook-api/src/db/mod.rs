//! Database access layer for tvbook-api
//!
//! Requests, their transition history and NOC resource assignments live in a
//! single SQLite file. The booking form itself is stored as JSON next to the
//! handful of columns that lists filter and group on.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};
use tvbook_common::{time, Error, Result};

pub mod history;
pub mod requests;
pub mod seed;
pub mod stats;

pub use history::{list_resources, list_transitions};
pub use requests::{
    apply_action, create_request, get_request, list_requests, update_form, ActionOutcome,
    CreatedRequest, RequestFilter, RequestPage,
};
pub use seed::seed_demo;
pub use stats::{dashboard_stats, DashboardStats, LabelCount};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS requests (
        id TEXT PRIMARY KEY,
        booking_type TEXT NOT NULL,
        title TEXT NOT NULL DEFAULT '',
        program TEXT NOT NULL DEFAULT '',
        priority TEXT,
        noc_required INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL,
        form TEXT NOT NULL,
        folder_path TEXT,
        not_done_reason TEXT,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_requests_status ON requests(status)",
    "CREATE INDEX IF NOT EXISTS idx_requests_created_at ON requests(created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS transitions (
        id TEXT PRIMARY KEY,
        request_id TEXT NOT NULL REFERENCES requests(id) ON DELETE CASCADE,
        from_status TEXT NOT NULL,
        to_status TEXT NOT NULL,
        changed_by TEXT NOT NULL,
        changed_at TEXT NOT NULL,
        comment TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_transitions_request ON transitions(request_id, changed_at)",
    r#"
    CREATE TABLE IF NOT EXISTS resources (
        id TEXT PRIMARY KEY,
        request_id TEXT NOT NULL REFERENCES requests(id) ON DELETE CASCADE,
        resource_type TEXT NOT NULL,
        resource_name TEXT NOT NULL,
        assigned_by TEXT NOT NULL,
        assigned_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_resources_request ON resources(request_id, assigned_at)",
];

/// Open (creating if missing) the database file and ensure the schema exists
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    debug!("Opening database at {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    info!("Database ready: {}", db_path.display());
    Ok(pool)
}

/// Private in-memory database, used by tests and throwaway runs
///
/// Every pooled connection would get its own empty database, so the pool is
/// pinned to one connection that never expires.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Create tables and indexes if they do not exist yet
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Decode a stored RFC 3339 timestamp
pub(crate) fn decode_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
    time::from_storage(value)
        .ok_or_else(|| Error::Corrupt(format!("{} is not a timestamp: '{}'", column, value)))
}

/// Decode a stored enum label
pub(crate) fn decode_label<T: FromStr>(column: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Corrupt(format!("{} has unknown value '{}'", column, value)))
}

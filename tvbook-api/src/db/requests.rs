//! Booking request storage and workflow transitions
//!
//! Every write that changes a request's stage runs in one transaction and is
//! guarded on the stage the decision was made from, so two teams acting on
//! the same request cannot both win.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use tvbook_common::model::{
    BookingForm, ResourceAssignment, WorkflowTransition, EQUIPMENT_RESOURCE_TYPE,
};
use tvbook_common::validation::validate_submission;
use tvbook_common::workflow::{
    check_creatable, check_editable, plan_transition, queue_requires_noc, queue_statuses,
    ActionPayload, Actor, WorkflowAction, WorkflowError,
};
use tvbook_common::{ids, time, Error, Result, UserRole, WorkflowRequest, WorkflowStatus};

use super::history;
use super::{decode_label, decode_timestamp};
use crate::pagination::{calculate_pagination, clamp_per_page};

pub(crate) const SELECT_REQUEST: &str = "SELECT id, status, form, folder_path, not_done_reason, \
     created_by, created_at, updated_at FROM requests";

/// List filters supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// Case-insensitive match against title, program and id
    pub search: Option<String>,
    pub status: Option<WorkflowStatus>,
    /// 1-indexed; out-of-range pages are clamped
    pub page: i64,
    pub per_page: Option<i64>,
}

/// One page of a role's request list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPage {
    pub items: Vec<WorkflowRequest>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// A stored new request and the submission it was logged with, if any
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRequest {
    pub request: WorkflowRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<WorkflowTransition>,
}

/// Result of a workflow action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub request: WorkflowRequest,
    pub transition: WorkflowTransition,
    /// Resources assigned by this action
    pub resources: Vec<ResourceAssignment>,
}

pub(crate) fn request_from_row(row: &SqliteRow) -> Result<WorkflowRequest> {
    let id: String = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let form: String = row.try_get("form")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let form: BookingForm = serde_json::from_str(&form)
        .map_err(|e| Error::Corrupt(format!("form of request {}: {}", id, e)))?;

    Ok(WorkflowRequest {
        form,
        status: decode_label("status", &status)?,
        folder_path: row.try_get("folder_path")?,
        not_done_reason: row.try_get("not_done_reason")?,
        created_by: row.try_get("created_by")?,
        created_at: decode_timestamp("created_at", &created_at)?,
        updated_at: decode_timestamp("updated_at", &updated_at)?,
        id,
    })
}

pub(crate) async fn insert_request<'e, E>(executor: E, request: &WorkflowRequest) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let form = serde_json::to_string(&request.form)?;

    sqlx::query(
        "INSERT INTO requests (id, booking_type, title, program, priority, noc_required, status,
                               form, folder_path, not_done_reason, created_by, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&request.id)
    .bind(request.form.booking_type().as_str())
    .bind(&request.form.title)
    .bind(&request.form.program)
    .bind(request.form.priority.map(|p| p.as_str()))
    .bind(request.form.needs_noc())
    .bind(request.status.as_str())
    .bind(form)
    .bind(request.folder_path.as_deref())
    .bind(request.not_done_reason.as_deref())
    .bind(&request.created_by)
    .bind(time::to_storage(&request.created_at))
    .bind(time::to_storage(&request.updated_at))
    .execute(executor)
    .await?;
    Ok(())
}

async fn fetch_request<'e, E>(executor: E, id: &str) -> Result<WorkflowRequest>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_REQUEST))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Request {}", id)))?;
    request_from_row(&row)
}

/// Error for a guarded write that matched no row
async fn status_conflict<'e, E>(executor: E, id: &str, expected: WorkflowStatus) -> Error
where
    E: Executor<'e, Database = Sqlite>,
{
    match fetch_request(executor, id).await {
        Ok(current) => WorkflowError::StatusChanged {
            expected,
            actual: current.status,
        }
        .into(),
        Err(e) => e,
    }
}

/// Store a new request as Draft or Submitted
///
/// Submitting straight away requires a complete form and is recorded as a
/// Draft → Submitted transition.
pub async fn create_request(
    pool: &SqlitePool,
    form: BookingForm,
    status: WorkflowStatus,
    actor: &Actor,
) -> Result<CreatedRequest> {
    check_creatable(actor.role, status)?;
    if status == WorkflowStatus::Submitted {
        validate_submission(&form).map_err(WorkflowError::Incomplete)?;
    }

    let now = time::now();
    let request = WorkflowRequest {
        id: ids::request_id(),
        form,
        status,
        folder_path: None,
        not_done_reason: None,
        created_by: actor.name.clone(),
        created_at: now,
        updated_at: now,
    };
    let transition = (status == WorkflowStatus::Submitted).then(|| WorkflowTransition {
        id: ids::transition_id(),
        request_id: request.id.clone(),
        from_status: WorkflowStatus::Draft,
        to_status: WorkflowStatus::Submitted,
        changed_by: actor.name.clone(),
        changed_at: now,
        comment: "Request submitted for processing".to_string(),
    });

    let mut tx = pool.begin().await?;
    insert_request(&mut *tx, &request).await?;
    if let Some(transition) = &transition {
        history::insert_transition(&mut *tx, transition).await?;
    }
    tx.commit().await?;

    info!(
        "Request {} created as {} by {} ({})",
        request.id, request.status, actor.name, actor.role
    );
    Ok(CreatedRequest {
        request,
        transition,
    })
}

pub async fn get_request(pool: &SqlitePool, id: &str) -> Result<WorkflowRequest> {
    fetch_request(pool, id).await
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, role: UserRole, filter: &RequestFilter) {
    query.push(" WHERE 1 = 1");

    if let Some(statuses) = queue_statuses(role) {
        query.push(" AND status IN (");
        let mut list = query.separated(", ");
        for status in statuses {
            list.push_bind(status.as_str());
        }
        list.push_unseparated(")");
    }
    if queue_requires_noc(role) {
        query.push(" AND noc_required = 1");
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }

    let term = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(term) = term {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        query
            .push(" AND (lower(title) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR lower(program) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR lower(id) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Requests visible in `role`'s queue, newest first
pub async fn list_requests(
    pool: &SqlitePool,
    role: UserRole,
    filter: &RequestFilter,
) -> Result<RequestPage> {
    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM requests");
    push_filters(&mut count_query, role, filter);
    let total = count_query
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let pagination = calculate_pagination(total, filter.page, clamp_per_page(filter.per_page));

    let mut page_query = QueryBuilder::<Sqlite>::new(SELECT_REQUEST);
    push_filters(&mut page_query, role, filter);
    page_query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(pagination.per_page)
        .push(" OFFSET ")
        .push_bind(pagination.offset);
    let rows = page_query.build().fetch_all(pool).await?;
    let items = rows
        .iter()
        .map(request_from_row)
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Listed {} of {} requests for {} (page {})",
        items.len(),
        total,
        role,
        pagination.page
    );
    Ok(RequestPage {
        items,
        total,
        page: pagination.page,
        per_page: pagination.per_page,
        total_pages: pagination.total_pages,
    })
}

/// Apply a partial form update to an editable request
pub async fn update_form(
    pool: &SqlitePool,
    id: &str,
    patch: &Map<String, Value>,
    actor: &Actor,
) -> Result<WorkflowRequest> {
    let current = fetch_request(pool, id).await?;
    check_editable(actor.role, current.status)?;

    let form = current.form.merged(patch)?;
    let form_json = serde_json::to_string(&form)?;
    let updated_at = time::now();

    let result = sqlx::query(
        "UPDATE requests
         SET booking_type = ?, title = ?, program = ?, priority = ?, noc_required = ?,
             form = ?, updated_at = ?
         WHERE id = ? AND status = ?",
    )
    .bind(form.booking_type().as_str())
    .bind(&form.title)
    .bind(&form.program)
    .bind(form.priority.map(|p| p.as_str()))
    .bind(form.needs_noc())
    .bind(form_json)
    .bind(time::to_storage(&updated_at))
    .bind(id)
    .bind(current.status.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(status_conflict(pool, id, current.status).await);
    }

    info!("Request {} edited by {}", id, actor.name);
    Ok(WorkflowRequest {
        form,
        updated_at,
        ..current
    })
}

/// Run a workflow action against a stored request
///
/// `expected` is the stage the caller saw; if the request has moved on
/// since, the action is refused with a conflict instead of being applied to
/// a stage the caller never looked at.
///
/// The write lock is taken before the request is read (`BEGIN IMMEDIATE`),
/// so a racing action waits on the busy timeout and then sees the new stage
/// rather than failing to upgrade its read snapshot.
pub async fn apply_action(
    pool: &SqlitePool,
    id: &str,
    action: WorkflowAction,
    payload: &ActionPayload,
    actor: &Actor,
    expected: Option<WorkflowStatus>,
) -> Result<ActionOutcome> {
    // Detached so a dropped HTTP request cannot abandon an open transaction
    let pool = pool.clone();
    let id = id.to_string();
    let payload = payload.clone();
    let actor = actor.clone();
    tokio::spawn(async move {
        apply_immediate(&pool, &id, action, &payload, &actor, expected).await
    })
    .await
    .map_err(|e| Error::Internal(format!("Action task failed: {}", e)))?
}

async fn apply_immediate(
    pool: &SqlitePool,
    id: &str,
    action: WorkflowAction,
    payload: &ActionPayload,
    actor: &Actor,
    expected: Option<WorkflowStatus>,
) -> Result<ActionOutcome> {
    let mut conn = pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

    let result = match apply_locked(&mut *conn, id, action, payload, actor, expected).await {
        Ok(outcome) => sqlx::query("COMMIT")
            .execute(&mut *conn)
            .await
            .map(|_| outcome)
            .map_err(Error::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            info!(
                "Request {}: {} -> {} via {} by {} ({})",
                id,
                outcome.transition.from_status,
                outcome.transition.to_status,
                action,
                actor.name,
                actor.role
            );
            Ok(outcome)
        }
        Err(e) => {
            if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                // Never hand a connection with an open transaction back to the pool
                warn!("Rollback of {} on {} failed: {}", action, id, rollback);
                conn.close_on_drop();
            }
            Err(e)
        }
    }
}

async fn apply_locked(
    conn: &mut SqliteConnection,
    id: &str,
    action: WorkflowAction,
    payload: &ActionPayload,
    actor: &Actor,
    expected: Option<WorkflowStatus>,
) -> Result<ActionOutcome> {
    let request = fetch_request(&mut *conn, id).await?;
    if let Some(expected) = expected {
        if expected != request.status {
            return Err(WorkflowError::StatusChanged {
                expected,
                actual: request.status,
            }
            .into());
        }
    }

    let existing = history::count_resources(&mut *conn, id).await?;
    let plan = plan_transition(
        &request,
        action,
        payload,
        actor,
        usize::try_from(existing).unwrap_or(0),
    )?;
    let changed_at = time::now();

    let result = sqlx::query(
        "UPDATE requests
         SET status = ?, folder_path = COALESCE(?, folder_path),
             not_done_reason = COALESCE(?, not_done_reason), updated_at = ?
         WHERE id = ? AND status = ?",
    )
    .bind(plan.to.as_str())
    .bind(plan.folder_path.as_deref())
    .bind(plan.not_done_reason.as_deref())
    .bind(time::to_storage(&changed_at))
    .bind(id)
    .bind(plan.from.as_str())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(status_conflict(&mut *conn, id, plan.from).await);
    }

    let resources: Vec<ResourceAssignment> = plan
        .new_resources
        .iter()
        .map(|name| ResourceAssignment {
            id: ids::resource_id(),
            request_id: id.to_string(),
            resource_type: EQUIPMENT_RESOURCE_TYPE.to_string(),
            resource_name: name.clone(),
            assigned_by: actor.name.clone(),
            assigned_at: changed_at,
        })
        .collect();
    for resource in &resources {
        history::insert_resource(&mut *conn, resource).await?;
    }

    let transition = WorkflowTransition {
        id: ids::transition_id(),
        request_id: id.to_string(),
        from_status: plan.from,
        to_status: plan.to,
        changed_by: actor.name.clone(),
        changed_at,
        comment: plan.comment,
    };
    history::insert_transition(&mut *conn, &transition).await?;

    Ok(ActionOutcome {
        request: WorkflowRequest {
            status: plan.to,
            folder_path: plan.folder_path.or(request.folder_path),
            not_done_reason: plan.not_done_reason.or(request.not_done_reason),
            updated_at: changed_at,
            ..request
        },
        transition,
        resources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use serde_json::json;
    use tvbook_common::model::BookingType;

    fn complete_form() -> BookingForm {
        BookingForm::from_json(json!({
            "bookingType": "Download and Ingest",
            "title": "Archive interview",
            "program": "Evening News",
            "studio": "Studio 1",
            "airDateTime": "2025-10-22T20:00",
            "language": "English",
            "priority": "Normal",
            "nocRequired": "Yes",
            "downloadSource": "FTP",
            "downloadLink": "ftp://archive/interview.mxf"
        }))
        .unwrap()
    }

    fn booking() -> Actor {
        Actor::new(UserRole::Booking, Some("Sarah Johnson"))
    }

    #[tokio::test]
    async fn test_create_submitted_logs_transition() {
        let pool = connect_in_memory().await.unwrap();
        let created = create_request(&pool, complete_form(), WorkflowStatus::Submitted, &booking())
            .await
            .unwrap();

        let transition = created.transition.expect("Submission should be logged");
        assert_eq!(transition.from_status, WorkflowStatus::Draft);
        assert_eq!(transition.to_status, WorkflowStatus::Submitted);
        assert_eq!(transition.changed_by, "Sarah Johnson");

        let stored = history::list_transitions(&pool, &created.request.id).await.unwrap();
        assert_eq!(stored, vec![transition]);
    }

    #[tokio::test]
    async fn test_create_draft_round_trips_form() {
        let pool = connect_in_memory().await.unwrap();
        let mut form = BookingForm::new(BookingType::IncomingFeed);
        form.title = "Half-filled feed".into();

        let created = create_request(&pool, form.clone(), WorkflowStatus::Draft, &booking())
            .await
            .unwrap();
        assert!(created.transition.is_none());

        let loaded = get_request(&pool, &created.request.id).await.unwrap();
        assert_eq!(loaded.form, form);
        assert_eq!(loaded.status, WorkflowStatus::Draft);
    }

    #[tokio::test]
    async fn test_get_unknown_request_is_not_found() {
        let pool = connect_in_memory().await.unwrap();
        let err = get_request(&pool, "req-missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_action_with_stale_expected_status_conflicts() {
        let pool = connect_in_memory().await.unwrap();
        let created = create_request(&pool, complete_form(), WorkflowStatus::Submitted, &booking())
            .await
            .unwrap();
        let noc = Actor::new(UserRole::Noc, None);

        let err = apply_action(
            &pool,
            &created.request.id,
            WorkflowAction::Acknowledge,
            &ActionPayload::default(),
            &noc,
            Some(WorkflowStatus::Draft),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Workflow(WorkflowError::StatusChanged {
                expected: WorkflowStatus::Draft,
                actual: WorkflowStatus::Submitted
            })
        ));

        // Nothing was written
        let transitions = history::list_transitions(&pool, &created.request.id).await.unwrap();
        assert_eq!(transitions.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_actions_on_file_database_conflict_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        let pool = crate::db::connect(&dir.path().join("race.db")).await.unwrap();

        for _ in 0..10 {
            let created =
                create_request(&pool, complete_form(), WorkflowStatus::Submitted, &booking())
                    .await
                    .unwrap();

            let handles: Vec<_> = (0..5)
                .map(|i| {
                    let pool = pool.clone();
                    let id = created.request.id.clone();
                    tokio::spawn(async move {
                        let payload = ActionPayload {
                            assigned_resources: Some(format!("Encoder-0{}", i)),
                            ..Default::default()
                        };
                        apply_action(
                            &pool,
                            &id,
                            WorkflowAction::SendToIngest,
                            &payload,
                            &Actor::new(UserRole::Noc, None),
                            None,
                        )
                        .await
                    })
                })
                .collect();

            let mut won = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(_) => won += 1,
                    Err(Error::Workflow(
                        WorkflowError::InvalidTransition { .. }
                        | WorkflowError::StatusChanged { .. },
                    )) => {}
                    Err(other) => panic!("losing action should conflict, got {:?}", other),
                }
            }
            assert_eq!(won, 1, "exactly one action should win");

            let transitions = history::list_transitions(&pool, &created.request.id).await.unwrap();
            assert_eq!(transitions.len(), 2);
            let resources = history::list_resources(&pool, &created.request.id).await.unwrap();
            assert_eq!(resources.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_send_to_ingest_records_each_resource() {
        let pool = connect_in_memory().await.unwrap();
        let created = create_request(&pool, complete_form(), WorkflowStatus::Submitted, &booking())
            .await
            .unwrap();
        let payload = ActionPayload {
            assigned_resources: Some("Encoder-01, SRT-TX-A".into()),
            ..Default::default()
        };

        let outcome = apply_action(
            &pool,
            &created.request.id,
            WorkflowAction::SendToIngest,
            &payload,
            &Actor::new(UserRole::Noc, None),
            None,
        )
        .await
        .unwrap();

        assert_eq!(outcome.request.status, WorkflowStatus::WithIngest);
        assert_eq!(outcome.transition.comment, "Resources assigned: Encoder-01, SRT-TX-A");
        let stored = history::list_resources(&pool, &created.request.id).await.unwrap();
        let names: Vec<_> = stored.iter().map(|r| r.resource_name.as_str()).collect();
        assert_eq!(names, vec!["Encoder-01", "SRT-TX-A"]);
        assert!(stored.iter().all(|r| r.assigned_by == "NOC Team"));
    }

    #[tokio::test]
    async fn test_update_form_refused_after_submission() {
        let pool = connect_in_memory().await.unwrap();
        let created = create_request(&pool, complete_form(), WorkflowStatus::Submitted, &booking())
            .await
            .unwrap();
        let patch = json!({ "title": "Changed" });

        let err = update_form(&pool, &created.request.id, patch.as_object().unwrap(), &booking())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Workflow(WorkflowError::NotEditable { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_escapes_like_wildcards() {
        let pool = connect_in_memory().await.unwrap();
        let mut form = complete_form();
        form.title = "100% live".into();
        create_request(&pool, form, WorkflowStatus::Draft, &booking()).await.unwrap();
        create_request(&pool, complete_form(), WorkflowStatus::Draft, &booking())
            .await
            .unwrap();

        let filter = RequestFilter {
            search: Some("0%".into()),
            ..Default::default()
        };
        let page = list_requests(&pool, UserRole::Booking, &filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].form.title, "100% live");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c\\"), "a\\_b\\%c\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}

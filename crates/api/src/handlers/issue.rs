//! Handlers for the `/issues` resource and its sub-resources (assignees,
//! watchers, labels, activity).
//!
//! Mutations follow a fixed sequence: commit the entity write, append the
//! activity entry, broadcast to the project room, then dispatch
//! notifications. Activity and notification failures are logged but never
//! fail a mutation that already committed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kite_core::activity::{actions, entities};
use kite_core::error::CoreError;
use kite_core::rooms::RoomId;
use kite_core::types::DbId;
use kite_db::models::issue::{CreateIssue, Issue, IssueFilter, UpdateIssue, PRIORITIES, STATUSES};
use kite_db::repositories::{ActivityLogRepo, IssueRepo, LabelRepo, ProjectRepo};
use kite_events::ServerEvent;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::project::require_member;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum activity entries returned per feed request.
const ACTIVITY_LIMIT: i64 = 100;

fn validate_status(status: &Option<String>) -> AppResult<()> {
    if let Some(s) = status {
        if !STATUSES.contains(&s.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid status '{s}', expected one of {STATUSES:?}"
            ))));
        }
    }
    Ok(())
}

fn validate_priority(priority: &Option<String>) -> AppResult<()> {
    if let Some(p) = priority {
        if !PRIORITIES.contains(&p.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid priority '{p}', expected one of {PRIORITIES:?}"
            ))));
        }
    }
    Ok(())
}

/// Fetch an issue or 404.
async fn find_issue(pool: &kite_db::DbPool, issue_id: DbId) -> AppResult<Issue> {
    IssueRepo::find_by_id(pool, issue_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Issue",
                id: issue_id,
            })
        })
}

/// Append an activity entry, logging instead of failing the mutation.
///
/// The entity write has already committed at this point; the client keeps
/// its success response even if the feed write fails.
async fn record_activity(
    state: &AppState,
    action: &str,
    issue_id: DbId,
    user_id: DbId,
    metadata: serde_json::Value,
) {
    if let Err(e) = ActivityLogRepo::append(
        &state.pool,
        action,
        entities::ISSUE,
        issue_id,
        user_id,
        Some(&metadata),
    )
    .await
    {
        tracing::error!(error = %e, action, issue_id, "Failed to record activity");
    }
}

// ---------------------------------------------------------------------------
// Issue CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/issues
///
/// Create an issue, record it in the activity log, broadcast `task_created`
/// to the project room, and notify the initial assignees.
pub async fn create_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateIssue>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Issue title must not be empty".into(),
        )));
    }
    validate_status(&input.status)?;
    validate_priority(&input.priority)?;

    ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id: input.project_id,
        })?;
    require_member(&state.pool, input.project_id, auth.user_id).await?;

    let issue = IssueRepo::create(&state.pool, &input, auth.user_id).await?;
    tracing::info!(issue_id = issue.id, project_id = issue.project_id, "Issue created");

    record_activity(
        &state,
        actions::ISSUE_CREATED,
        issue.id,
        auth.user_id,
        json!({ "title": issue.title }),
    )
    .await;

    state
        .ws_manager
        .publish(
            RoomId::Project(issue.project_id),
            &ServerEvent::TaskCreated(issue.clone()),
        )
        .await;

    if let Some(assignee_ids) = &input.assignee_ids {
        for &assignee_id in assignee_ids {
            if let Err(e) = state
                .dispatcher
                .notify_task_assigned(auth.user_id, assignee_id, &issue)
                .await
            {
                tracing::error!(error = %e, assignee_id, "Failed to notify assignee");
            }
        }
    }

    Ok((StatusCode::CREATED, Json(json!({ "data": issue }))))
}

/// GET /api/v1/issues
///
/// List issues, optionally filtered by project, status, priority, assignee,
/// or creator. Project-scoped listings require membership.
pub async fn list_issues(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<IssueFilter>,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(project_id) = filter.project_id {
        require_member(&state.pool, project_id, auth.user_id).await?;
    }

    let issues = IssueRepo::list(&state.pool, &filter).await?;
    Ok(Json(json!({ "data": issues })))
}

/// GET /api/v1/issues/{id}
///
/// Return the issue with its assignees and labels.
pub async fn get_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    let assignees = IssueRepo::assignees(&state.pool, issue_id).await?;
    let labels = IssueRepo::labels(&state.pool, issue_id).await?;

    Ok(Json(json!({
        "data": {
            "issue": issue,
            "assignees": assignees,
            "labels": labels,
        }
    })))
}

/// PUT /api/v1/issues/{id}
///
/// Apply a partial update, record the changed fields in the activity log,
/// broadcast `task_updated`, and notify the current assignees.
pub async fn update_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
    Json(input): Json<UpdateIssue>,
) -> AppResult<Json<serde_json::Value>> {
    validate_status(&input.status)?;
    validate_priority(&input.priority)?;

    let before = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, before.project_id, auth.user_id).await?;

    let issue = IssueRepo::update(&state.pool, issue_id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Issue",
            id: issue_id,
        })?;

    record_activity(
        &state,
        actions::ISSUE_UPDATED,
        issue.id,
        auth.user_id,
        json!({ "changes": diff_changes(&before, &issue) }),
    )
    .await;

    state
        .ws_manager
        .publish(
            RoomId::Project(issue.project_id),
            &ServerEvent::TaskUpdated(issue.clone()),
        )
        .await;

    let assignees = IssueRepo::assignees(&state.pool, issue.id).await?;
    for assignee_id in assignees {
        if let Err(e) = state
            .dispatcher
            .notify_task_updated(auth.user_id, assignee_id, &issue)
            .await
        {
            tracing::error!(error = %e, assignee_id, "Failed to notify assignee");
        }
    }

    Ok(Json(json!({ "data": issue })))
}

/// DELETE /api/v1/issues/{id}
///
/// Only the issue creator or the project owner may delete. Broadcasts
/// `task_deleted` with the bare id to the project room.
pub async fn delete_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let issue = find_issue(&state.pool, issue_id).await?;

    let is_owner = ProjectRepo::is_owner(&state.pool, issue.project_id, auth.user_id).await?;
    if issue.created_by != auth.user_id && !is_owner {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the issue creator or project owner can delete it".into(),
        )));
    }

    IssueRepo::delete(&state.pool, issue_id).await?;
    tracing::info!(issue_id, "Issue deleted");

    state
        .ws_manager
        .publish(
            RoomId::Project(issue.project_id),
            &ServerEvent::TaskDeleted { task_id: issue_id },
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Field-by-field diff for the activity feed: `{"field": {"from": a, "to": b}}`
/// for every field the update actually changed.
fn diff_changes(before: &Issue, after: &Issue) -> serde_json::Value {
    let mut changes = serde_json::Map::new();

    if before.title != after.title {
        changes.insert(
            "title".into(),
            json!({ "from": before.title, "to": after.title }),
        );
    }
    if before.description != after.description {
        changes.insert(
            "description".into(),
            json!({ "from": before.description, "to": after.description }),
        );
    }
    if before.status != after.status {
        changes.insert(
            "status".into(),
            json!({ "from": before.status, "to": after.status }),
        );
    }
    if before.priority != after.priority {
        changes.insert(
            "priority".into(),
            json!({ "from": before.priority, "to": after.priority }),
        );
    }
    if before.due_date != after.due_date {
        changes.insert(
            "due_date".into(),
            json!({ "from": before.due_date, "to": after.due_date }),
        );
    }

    serde_json::Value::Object(changes)
}

// ---------------------------------------------------------------------------
// Assignees
// ---------------------------------------------------------------------------

/// Request body for `POST /issues/{id}/assignees`.
#[derive(Debug, Deserialize)]
pub struct AssignInput {
    pub user_id: DbId,
}

/// GET /api/v1/issues/{id}/assignees
pub async fn list_assignees(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    let assignees = IssueRepo::assignees(&state.pool, issue_id).await?;
    Ok(Json(json!({ "data": assignees })))
}

/// POST /api/v1/issues/{id}/assignees
///
/// Assign a project member to the issue and notify them.
pub async fn assign_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
    Json(input): Json<AssignInput>,
) -> AppResult<StatusCode> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    if !ProjectRepo::is_member(&state.pool, issue.project_id, input.user_id).await? {
        return Err(AppError::BadRequest(
            "Assignee is not a member of the project".into(),
        ));
    }

    let added = IssueRepo::add_assignee(&state.pool, issue_id, input.user_id).await?;
    if !added {
        return Err(AppError::Core(CoreError::Conflict(
            "User is already assigned to this issue".into(),
        )));
    }

    if let Err(e) = state
        .dispatcher
        .notify_task_assigned(auth.user_id, input.user_id, &issue)
        .await
    {
        tracing::error!(error = %e, assignee_id = input.user_id, "Failed to notify assignee");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/issues/{id}/assignees/{user_id}
pub async fn unassign_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((issue_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    let removed = IssueRepo::remove_assignee(&state.pool, issue_id, user_id).await?;
    if !removed {
        return Err(AppError::BadRequest(
            "User is not assigned to this issue".into(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Watchers
// ---------------------------------------------------------------------------

/// POST /api/v1/issues/{id}/watchers
///
/// Subscribe the authenticated user to comment notifications. Idempotent.
pub async fn watch_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    IssueRepo::add_watcher(&state.pool, issue_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/issues/{id}/watchers
pub async fn unwatch_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    IssueRepo::remove_watcher(&state.pool, issue_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// POST /api/v1/issues/{id}/labels/{label_id}
///
/// Attach a label from the issue's project. Re-attaching is a no-op.
pub async fn add_label_to_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((issue_id, label_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    let label = LabelRepo::find_by_id(&state.pool, label_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Label",
            id: label_id,
        })?;
    if label.project_id != issue.project_id {
        return Err(AppError::BadRequest(
            "Label belongs to a different project".into(),
        ));
    }

    let added = IssueRepo::add_label(&state.pool, issue_id, label_id).await?;
    if added {
        record_activity(
            &state,
            actions::LABEL_ADDED,
            issue_id,
            auth.user_id,
            json!({ "label_id": label_id, "label": label.name }),
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/issues/{id}/labels/{label_id}
pub async fn remove_label_from_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((issue_id, label_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    let removed = IssueRepo::remove_label(&state.pool, issue_id, label_id).await?;
    if removed {
        record_activity(
            &state,
            actions::LABEL_REMOVED,
            issue_id,
            auth.user_id,
            json!({ "label_id": label_id }),
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Activity feed
// ---------------------------------------------------------------------------

/// GET /api/v1/issues/{id}/activity
///
/// The issue's activity feed in commit order (oldest first).
pub async fn get_activity(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let issue = find_issue(&state.pool, issue_id).await?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    let feed =
        ActivityLogRepo::list_for_entity(&state.pool, entities::ISSUE, issue_id, ACTIVITY_LIMIT)
            .await?;
    Ok(Json(json!({ "data": feed })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn issue_with(status: &str, priority: &str) -> Issue {
        Issue {
            id: 1,
            project_id: 1,
            title: "A".into(),
            description: None,
            status: status.into(),
            priority: priority.into(),
            due_date: None,
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn diff_reports_only_changed_fields() {
        let before = issue_with("TODO", "MEDIUM");
        let mut after = issue_with("DONE", "MEDIUM");
        after.title = "A".into();

        let changes = diff_changes(&before, &after);
        let obj = changes.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(changes["status"]["from"], "TODO");
        assert_eq!(changes["status"]["to"], "DONE");
    }

    #[test]
    fn diff_of_identical_issues_is_empty() {
        let a = issue_with("TODO", "LOW");
        let changes = diff_changes(&a, &a.clone());
        assert!(changes.as_object().unwrap().is_empty());
    }

    #[test]
    fn status_validation_rejects_unknown_values() {
        assert!(validate_status(&Some("SHIPPED".into())).is_err());
        assert!(validate_status(&Some("IN_PROGRESS".into())).is_ok());
        assert!(validate_status(&None).is_ok());
    }

    #[test]
    fn priority_validation_rejects_unknown_values() {
        assert!(validate_priority(&Some("CRITICAL".into())).is_err());
        assert!(validate_priority(&Some("URGENT".into())).is_ok());
    }
}

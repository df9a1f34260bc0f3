//! Handlers for issue comments.
//!
//! Creating a comment broadcasts `comment_added` to the issue room and
//! notifies every watcher of the issue (except the commenter).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kite_core::activity::{actions, entities};
use kite_core::error::CoreError;
use kite_core::rooms::RoomId;
use kite_core::types::DbId;
use kite_db::models::comment::CommentInput;
use kite_db::repositories::{ActivityLogRepo, CommentRepo, IssueRepo, UserRepo};
use kite_events::ServerEvent;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::project::require_member;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/issues/{id}/comments
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
    Json(input): Json<CommentInput>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Comment content must not be empty".into(),
        )));
    }

    let issue = IssueRepo::find_by_id(&state.pool, issue_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Issue",
            id: issue_id,
        })?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    let comment = CommentRepo::create(&state.pool, issue_id, auth.user_id, &input.content).await?;

    if let Err(e) = ActivityLogRepo::append(
        &state.pool,
        actions::COMMENT_ADDED,
        entities::ISSUE,
        issue_id,
        auth.user_id,
        Some(&json!({ "comment_id": comment.id })),
    )
    .await
    {
        tracing::error!(error = %e, issue_id, "Failed to record activity");
    }

    state
        .ws_manager
        .publish(
            RoomId::Issue(issue_id),
            &ServerEvent::CommentAdded(comment.clone()),
        )
        .await;

    // Watcher notifications carry the commenter's display name; the
    // dispatcher skips the commenter if they watch their own issue.
    let commenter_name = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_else(|| "Someone".to_string());

    let watchers = IssueRepo::watchers(&state.pool, issue_id).await?;
    for watcher_id in watchers {
        if let Err(e) = state
            .dispatcher
            .notify_comment_added(auth.user_id, watcher_id, &commenter_name, &issue)
            .await
        {
            tracing::error!(error = %e, watcher_id, "Failed to notify watcher");
        }
    }

    Ok((StatusCode::CREATED, Json(json!({ "data": comment }))))
}

/// GET /api/v1/issues/{id}/comments
///
/// Comments in creation order (oldest first).
pub async fn list_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let issue = IssueRepo::find_by_id(&state.pool, issue_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Issue",
            id: issue_id,
        })?;
    require_member(&state.pool, issue.project_id, auth.user_id).await?;

    let comments = CommentRepo::list_for_issue(&state.pool, issue_id).await?;
    Ok(Json(json!({ "data": comments })))
}

/// PUT /api/v1/comments/{id}
///
/// Only the comment's author may edit it.
pub async fn update_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
    Json(input): Json<CommentInput>,
) -> AppResult<Json<serde_json::Value>> {
    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Comment content must not be empty".into(),
        )));
    }

    let existing = CommentRepo::find_by_id(&state.pool, comment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        })?;
    if existing.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the comment author can edit it".into(),
        )));
    }

    let comment = CommentRepo::update(&state.pool, comment_id, &input.content)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        })?;

    Ok(Json(json!({ "data": comment })))
}

/// DELETE /api/v1/comments/{id}
///
/// Only the comment's author may delete it.
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = CommentRepo::find_by_id(&state.pool, comment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        })?;
    if existing.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the comment author can delete it".into(),
        )));
    }

    CommentRepo::delete(&state.pool, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

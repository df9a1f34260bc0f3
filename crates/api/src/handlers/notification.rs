//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication. Read-state changes go through the
//! dispatcher so recipient checks live in one place.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kite_core::types::DbId;
use kite_db::repositories::NotificationRepo;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for notification listing.
const DEFAULT_LIMIT: i64 = 50;

/// Resolve the effective page window from raw query values.
///
/// Limits are capped at [`MAX_LIMIT`]; negative limits and offsets are
/// clamped to zero rather than reaching the database as invalid
/// `LIMIT`/`OFFSET` arguments.
fn page_window(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).clamp(0, MAX_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

/// GET /api/v1/notifications
///
/// List the authenticated user's notifications, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let (limit, offset) = page_window(params.limit, params.offset);
    let unread_only = params.unread_only.unwrap_or(false);

    let notifications =
        NotificationRepo::list_for_user(&state.pool, auth.user_id, unread_only, limit, offset)
            .await?;

    Ok(Json(json!({ "data": notifications })))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark a single notification as read. Returns 204 No Content; 403 if the
/// notification belongs to another user. Idempotent.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state
        .dispatcher
        .mark_as_read(notification_id, auth.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
///
/// Mark all of the authenticated user's notifications as read.
/// Returns the number of notifications that were marked.
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.dispatcher.mark_all_as_read(auth.user_id).await?;

    Ok(Json(json!({
        "data": { "marked_read": count }
    })))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.dispatcher.unread_count(auth.user_id).await?;

    Ok(Json(json!({
        "data": { "count": count }
    })))
}

//! Handlers for the `/workspaces` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kite_core::error::CoreError;
use kite_core::types::DbId;
use kite_db::models::workspace::CreateWorkspace;
use kite_db::repositories::WorkspaceRepo;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/workspaces
pub async fn create_workspace(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkspace>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Workspace name must not be empty".into(),
        )));
    }

    let workspace = WorkspaceRepo::create(&state.pool, input.name.trim(), auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": workspace }))))
}

/// GET /api/v1/workspaces
pub async fn list_workspaces(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let workspaces = WorkspaceRepo::list(&state.pool).await?;
    Ok(Json(json!({ "data": workspaces })))
}

/// GET /api/v1/workspaces/{id}
pub async fn get_workspace(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(workspace_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let workspace = WorkspaceRepo::find_by_id(&state.pool, workspace_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Workspace",
            id: workspace_id,
        })?;

    Ok(Json(json!({ "data": workspace })))
}

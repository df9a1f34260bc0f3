//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kite_core::error::CoreError;
use kite_core::types::DbId;
use kite_db::models::project::{CreateProject, UpdateProject};
use kite_db::repositories::ProjectRepo;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Verify project membership, mapping non-members to 403.
///
/// Shared by every project-scoped handler (issues, comments, labels).
pub async fn require_member(
    pool: &kite_db::DbPool,
    project_id: DbId,
    user_id: DbId,
) -> AppResult<()> {
    if !ProjectRepo::is_member(pool, project_id, user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not a member of this project".into(),
        )));
    }
    Ok(())
}

/// POST /api/v1/projects
pub async fn create_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project name must not be empty".into(),
        )));
    }

    let project = ProjectRepo::create(&state.pool, &input, auth.user_id).await?;
    tracing::info!(project_id = project.id, owner_id = auth.user_id, "Project created");
    Ok((StatusCode::CREATED, Json(json!({ "data": project }))))
}

/// GET /api/v1/projects
///
/// List the projects the authenticated user belongs to.
pub async fn list_projects(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let projects = ProjectRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(json!({ "data": projects })))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let project = ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        })?;

    require_member(&state.pool, project_id, auth.user_id).await?;

    Ok(Json(json!({ "data": project })))
}

/// PUT /api/v1/projects/{id}
pub async fn update_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<serde_json::Value>> {
    require_member(&state.pool, project_id, auth.user_id).await?;

    let project = ProjectRepo::update(&state.pool, project_id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        })?;

    Ok(Json(json!({ "data": project })))
}

/// DELETE /api/v1/projects/{id}
///
/// Only the project owner may delete it.
pub async fn delete_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProjectRepo::is_owner(&state.pool, project_id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the project owner can delete it".into(),
        )));
    }

    let deleted = ProjectRepo::delete(&state.pool, project_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }));
    }

    tracing::info!(project_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for `POST /projects/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberInput {
    pub user_id: DbId,
}

/// POST /api/v1/projects/{id}/members
///
/// Add a user to the project. Idempotent; members may invite others.
pub async fn add_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<AddMemberInput>,
) -> AppResult<StatusCode> {
    require_member(&state.pool, project_id, auth.user_id).await?;

    ProjectRepo::add_member(&state.pool, project_id, input.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

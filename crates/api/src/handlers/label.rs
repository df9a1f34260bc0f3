//! Handlers for project labels.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kite_core::error::CoreError;
use kite_core::types::DbId;
use kite_db::models::label::CreateLabel;
use kite_db::repositories::LabelRepo;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::project::require_member;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/projects/{id}/labels
///
/// Label names are unique per project; duplicates return 409.
pub async fn create_label(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateLabel>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Label name must not be empty".into(),
        )));
    }

    require_member(&state.pool, project_id, auth.user_id).await?;

    let label = LabelRepo::create(
        &state.pool,
        project_id,
        input.name.trim(),
        input.color.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": label }))))
}

/// GET /api/v1/projects/{id}/labels
pub async fn list_labels(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    require_member(&state.pool, project_id, auth.user_id).await?;

    let labels = LabelRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(json!({ "data": labels })))
}

/// DELETE /api/v1/labels/{id}
///
/// Removing a label detaches it from every issue (cascade).
pub async fn delete_label(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(label_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let label = LabelRepo::find_by_id(&state.pool, label_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Label",
            id: label_id,
        })?;
    require_member(&state.pool, label.project_id, auth.user_id).await?;

    LabelRepo::delete(&state.pool, label_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

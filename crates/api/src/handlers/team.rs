//! Handlers for the `/teams` resource.
//!
//! Teams are member groups inside a workspace. The creator becomes the
//! team's LEAD; membership changes are open to existing members.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kite_core::error::CoreError;
use kite_core::types::DbId;
use kite_db::models::team::{CreateTeam, UpdateTeam, ROLES};
use kite_db::repositories::{TeamRepo, WorkspaceRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Verify team membership, mapping non-members to 403.
async fn require_member(pool: &kite_db::DbPool, team_id: DbId, user_id: DbId) -> AppResult<()> {
    if !TeamRepo::is_member(pool, team_id, user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not a member of this team".into(),
        )));
    }
    Ok(())
}

/// Validate a membership role against the closed vocabulary.
fn validate_role(role: &str) -> AppResult<()> {
    if !ROLES.contains(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{role}', expected one of: {}",
            ROLES.join(", ")
        ))));
    }
    Ok(())
}

/// POST /api/v1/teams
pub async fn create_team(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTeam>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Team name must not be empty".into(),
        )));
    }
    WorkspaceRepo::find_by_id(&state.pool, input.workspace_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Workspace",
            id: input.workspace_id,
        })?;

    let team = TeamRepo::create(&state.pool, &input, auth.user_id).await?;
    tracing::info!(team_id = team.id, created_by = auth.user_id, "Team created");
    Ok((StatusCode::CREATED, Json(json!({ "data": team }))))
}

/// Query parameters for `GET /teams`.
#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub workspace_id: DbId,
}

/// GET /api/v1/teams?workspace_id={id}
pub async fn list_teams(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TeamQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let teams = TeamRepo::list_for_workspace(&state.pool, params.workspace_id).await?;
    Ok(Json(json!({ "data": teams })))
}

/// GET /api/v1/teams/{id}
///
/// Returns the team together with its member roster.
pub async fn get_team(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let team = TeamRepo::find_by_id(&state.pool, team_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Team",
            id: team_id,
        })?;
    let members = TeamRepo::members(&state.pool, team_id).await?;

    Ok(Json(json!({ "data": { "team": team, "members": members } })))
}

/// PUT /api/v1/teams/{id}
pub async fn update_team(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<DbId>,
    Json(input): Json<UpdateTeam>,
) -> AppResult<Json<serde_json::Value>> {
    require_member(&state.pool, team_id, auth.user_id).await?;

    let team = TeamRepo::update(&state.pool, team_id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Team",
            id: team_id,
        })?;

    Ok(Json(json!({ "data": team })))
}

/// Request body for `POST /teams/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddTeamMemberInput {
    pub user_id: DbId,
    /// Defaults to MEMBER.
    pub role: Option<String>,
}

/// POST /api/v1/teams/{id}/members
///
/// Add a user to the team. 409 if already a member.
pub async fn add_team_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<DbId>,
    Json(input): Json<AddTeamMemberInput>,
) -> AppResult<StatusCode> {
    require_member(&state.pool, team_id, auth.user_id).await?;

    let role = input.role.as_deref().unwrap_or("MEMBER");
    validate_role(role)?;

    let added = TeamRepo::add_member(&state.pool, team_id, input.user_id, role).await?;
    if !added {
        return Err(AppError::Core(CoreError::Conflict(
            "User is already a member of this team".into(),
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/teams/{id}/members/{user_id}
///
/// Remove a user from the team. Idempotent.
pub async fn remove_team_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((team_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    require_member(&state.pool, team_id, auth.user_id).await?;

    TeamRepo::remove_member(&state.pool, team_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_validate() {
        assert!(validate_role("LEAD").is_ok());
        assert!(validate_role("MEMBER").is_ok());
    }

    #[test]
    fn unknown_or_miscased_roles_are_rejected() {
        assert!(validate_role("OWNER").is_err());
        assert!(validate_role("member").is_err());
        assert!(validate_role("").is_err());
    }
}

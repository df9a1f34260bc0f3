//! Route definitions for the `/teams` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::team;
use crate::state::AppState;

/// Routes mounted at `/teams`.
///
/// ```text
/// GET    /                       -> list_teams (?workspace_id=)
/// POST   /                       -> create_team
/// GET    /{id}                   -> get_team (with member roster)
/// PUT    /{id}                   -> update_team
/// POST   /{id}/members           -> add_team_member
/// DELETE /{id}/members/{user_id} -> remove_team_member
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(team::list_teams).post(team::create_team))
        .route("/{id}", get(team::get_team).put(team::update_team))
        .route("/{id}/members", post(team::add_team_member))
        .route("/{id}/members/{user_id}", delete(team::remove_team_member))
}

//! Route definitions for the `/projects` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{label, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /             -> list_projects
/// POST   /             -> create_project
/// GET    /{id}         -> get_project
/// PUT    /{id}         -> update_project
/// DELETE /{id}         -> delete_project (owner only)
/// POST   /{id}/members -> add_member
/// GET    /{id}/labels  -> list_labels
/// POST   /{id}/labels  -> create_label
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list_projects).post(project::create_project))
        .route(
            "/{id}",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route("/{id}/members", post(project::add_member))
        .route(
            "/{id}/labels",
            get(label::list_labels).post(label::create_label),
        )
}

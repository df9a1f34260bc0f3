//! Route definitions for the `/workspaces` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::workspace;
use crate::state::AppState;

/// Routes mounted at `/workspaces`.
///
/// ```text
/// GET  /     -> list_workspaces
/// POST /     -> create_workspace
/// GET  /{id} -> get_workspace
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workspace::list_workspaces).post(workspace::create_workspace),
        )
        .route("/{id}", get(workspace::get_workspace))
}

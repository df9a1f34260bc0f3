pub mod auth;
pub mod comment;
pub mod health;
pub mod issue;
pub mod label;
pub mod notification;
pub mod project;
pub mod team;
pub mod workspace;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                WebSocket (token query param)
///
/// /auth/signup                       signup (public)
/// /auth/login                        login (public)
/// /auth/me                           current user
///
/// /workspaces                        list, create
/// /workspaces/{id}                   get
///
/// /teams                             list (?workspace_id), create
/// /teams/{id}                        get (with roster), update
/// /teams/{id}/members                add member (POST)
/// /teams/{id}/members/{user_id}      remove member (DELETE)
///
/// /projects                          list, create
/// /projects/{id}                     get, update, delete
/// /projects/{id}/members             add member (POST)
/// /projects/{id}/labels              list, create
///
/// /issues                            list (filterable), create
/// /issues/{id}                       get, update, delete
/// /issues/{id}/comments              list, create
/// /issues/{id}/assignees             list, assign
/// /issues/{id}/assignees/{user_id}   unassign (DELETE)
/// /issues/{id}/watchers              watch (POST), unwatch (DELETE)
/// /issues/{id}/labels/{label_id}     attach (POST), detach (DELETE)
/// /issues/{id}/activity              activity feed (GET)
///
/// /comments/{id}                     update, delete (author only)
///
/// /labels/{id}                       delete
///
/// /notifications                     list (?unread_only, limit, offset)
/// /notifications/read-all            mark all read (POST)
/// /notifications/unread-count        unread count (GET)
/// /notifications/{id}/read           mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Authentication routes (signup, login, me).
        .nest("/auth", auth::router())
        // Workspaces group projects and teams.
        .nest("/workspaces", workspace::router())
        // Teams and their member rosters.
        .nest("/teams", team::router())
        // Projects (also nests members and labels).
        .nest("/projects", project::router())
        // Issues and their sub-resources.
        .nest("/issues", issue::router())
        // Direct comment edits/deletes.
        .nest("/comments", comment::router())
        // Direct label deletes.
        .nest("/labels", label::router())
        // Notification list and read-state.
        .nest("/notifications", notification::router())
}

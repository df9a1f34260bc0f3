//! Route definitions for the `/issues` resource and its sub-resources.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{comment, issue};
use crate::state::AppState;

/// Routes mounted at `/issues`.
///
/// ```text
/// GET    /                           -> list_issues (filterable)
/// POST   /                           -> create_issue
/// GET    /{id}                       -> get_issue (with assignees + labels)
/// PUT    /{id}                       -> update_issue
/// DELETE /{id}                       -> delete_issue (creator or owner)
///
/// GET    /{id}/comments              -> list_comments
/// POST   /{id}/comments              -> create_comment
///
/// GET    /{id}/assignees             -> list_assignees
/// POST   /{id}/assignees             -> assign_user
/// DELETE /{id}/assignees/{user_id}   -> unassign_user
///
/// POST   /{id}/watchers              -> watch_issue
/// DELETE /{id}/watchers              -> unwatch_issue
///
/// POST   /{id}/labels/{label_id}     -> add_label_to_issue
/// DELETE /{id}/labels/{label_id}     -> remove_label_from_issue
///
/// GET    /{id}/activity              -> get_activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(issue::list_issues).post(issue::create_issue))
        .route(
            "/{id}",
            get(issue::get_issue)
                .put(issue::update_issue)
                .delete(issue::delete_issue),
        )
        .route(
            "/{id}/comments",
            get(comment::list_comments).post(comment::create_comment),
        )
        .route(
            "/{id}/assignees",
            get(issue::list_assignees).post(issue::assign_user),
        )
        .route("/{id}/assignees/{user_id}", delete(issue::unassign_user))
        .route(
            "/{id}/watchers",
            post(issue::watch_issue).delete(issue::unwatch_issue),
        )
        .route(
            "/{id}/labels/{label_id}",
            post(issue::add_label_to_issue).delete(issue::remove_label_from_issue),
        )
        .route("/{id}/activity", get(issue::get_activity))
}

//! Route definitions for top-level comment operations.
//!
//! Creation and listing live under `/issues/{id}/comments`; edits and
//! deletions address the comment directly.

use axum::routing::put;
use axum::Router;

use crate::handlers::comment;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// PUT    /{id} -> update_comment (author only)
/// DELETE /{id} -> delete_comment (author only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        put(comment::update_comment).delete(comment::delete_comment),
    )
}

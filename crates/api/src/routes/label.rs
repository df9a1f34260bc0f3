//! Route definitions for top-level label operations.
//!
//! Creation and listing live under `/projects/{id}/labels`; deletion
//! addresses the label directly.

use axum::routing::delete;
use axum::Router;

use crate::handlers::label;
use crate::state::AppState;

/// Routes mounted at `/labels`.
///
/// ```text
/// DELETE /{id} -> delete_label
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(label::delete_label))
}

//! Activity log entity model.
//!
//! Entries are append-only (no `updated_at`): they are written once by the
//! mutation path and never modified or deleted afterwards.

use kite_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `activity_log` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    pub action: String,
    pub entity_type: String,
    pub entity_id: DbId,
    pub user_id: DbId,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

//! Label entity models and DTOs.

use kite_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `labels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Label {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub color: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a label within a project.
#[derive(Debug, Deserialize)]
pub struct CreateLabel {
    pub name: String,
    pub color: Option<String>,
}

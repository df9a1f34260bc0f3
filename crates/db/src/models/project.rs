//! Project entity models and DTOs.

use kite_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub workspace_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a project. The creator becomes the owner and the first
/// member.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub workspace_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating a project. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

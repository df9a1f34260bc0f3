//! Team entity models and DTOs.

use kite_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Allowed values for `team_members.role`.
pub const ROLES: &[&str] = &["LEAD", "MEMBER"];

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub workspace_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `team_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMember {
    pub user_id: DbId,
    pub role: String,
}

/// DTO for creating a team. The creator becomes its first member, as LEAD.
#[derive(Debug, Deserialize)]
pub struct CreateTeam {
    pub workspace_id: DbId,
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating a team. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub description: Option<String>,
}

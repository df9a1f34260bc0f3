//! Issue entity models and DTOs.
//!
//! Issues are called "tasks" on the realtime wire (`task_created`,
//! `task_updated`, `task_deleted`) for client compatibility.

use kite_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Allowed values for `issues.status`.
pub const STATUSES: &[&str] = &["TODO", "IN_PROGRESS", "DONE"];

/// Allowed values for `issues.priority`.
pub const PRIORITIES: &[&str] = &["LOW", "MEDIUM", "HIGH", "URGENT"];

/// A row from the `issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<Timestamp>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an issue.
#[derive(Debug, Deserialize)]
pub struct CreateIssue {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<Timestamp>,
    /// Users to assign at creation time.
    pub assignee_ids: Option<Vec<DbId>>,
}

/// DTO for updating an issue. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<Timestamp>,
}

/// Filter parameters for listing issues.
#[derive(Debug, Default, Deserialize)]
pub struct IssueFilter {
    pub project_id: Option<DbId>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

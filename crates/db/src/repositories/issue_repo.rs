//! Repository for the `issues` table and its join tables
//! (assignees, watchers, labels).

use kite_core::types::DbId;
use sqlx::PgPool;

use crate::models::issue::{CreateIssue, Issue, IssueFilter, UpdateIssue};
use crate::models::label::Label;

const COLUMNS: &str = "id, project_id, title, description, status, priority, \
                       due_date, created_by, created_at, updated_at";

/// Maximum page size for issue listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for issue listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD and relation operations for issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Create an issue and its initial assignees in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateIssue,
        created_by: DbId,
    ) -> Result<Issue, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO issues (project_id, title, description, status, priority, due_date, created_by) \
             VALUES ($1, $2, $3, COALESCE($4, 'TODO'), COALESCE($5, 'MEDIUM'), $6, $7) \
             RETURNING {COLUMNS}"
        );
        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.due_date)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(assignee_ids) = &input.assignee_ids {
            for user_id in assignee_ids {
                sqlx::query(
                    "INSERT INTO issue_assignees (issue_id, user_id) \
                     VALUES ($1, $2) ON CONFLICT DO NOTHING",
                )
                .bind(issue.id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(issue)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List issues matching the filter, newest first.
    pub async fn list(pool: &PgPool, filter: &IssueFilter) -> Result<Vec<Issue>, sqlx::Error> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = filter.offset.unwrap_or(0);

        let mut conditions = Vec::new();
        if filter.project_id.is_some() {
            conditions.push("i.project_id = $1");
        }
        if filter.status.is_some() {
            conditions.push("i.status = $2");
        }
        if filter.priority.is_some() {
            conditions.push("i.priority = $3");
        }
        if filter.assignee_id.is_some() {
            conditions.push(
                "EXISTS (SELECT 1 FROM issue_assignees ia \
                 WHERE ia.issue_id = i.id AND ia.user_id = $4)",
            );
        }
        if filter.created_by.is_some() {
            conditions.push("i.created_by = $5");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // Every parameter is always bound; unset filters bind NULL and their
        // condition is omitted from the WHERE clause, so the placeholder
        // numbering stays fixed.
        let query = format!(
            "SELECT i.{} FROM issues i {where_clause} \
             ORDER BY i.created_at DESC \
             LIMIT $6 OFFSET $7",
            COLUMNS.replace(", ", ", i.")
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(filter.project_id)
            .bind(&filter.status)
            .bind(&filter.priority)
            .bind(filter.assignee_id)
            .bind(filter.created_by)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the issue does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIssue,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "UPDATE issues \
             SET title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 status = COALESCE($4, status), \
                 priority = COALESCE($5, priority), \
                 due_date = COALESCE($6, due_date), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.due_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete an issue. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Assignees
    // -----------------------------------------------------------------------

    pub async fn assignees(pool: &PgPool, issue_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM issue_assignees WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_all(pool)
            .await
    }

    /// Assign a user. Returns `false` if the user was already assigned.
    pub async fn add_assignee(
        pool: &PgPool,
        issue_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO issue_assignees (issue_id, user_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(issue_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unassign a user. Returns `false` if the user was not assigned.
    pub async fn remove_assignee(
        pool: &PgPool,
        issue_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM issue_assignees WHERE issue_id = $1 AND user_id = $2")
                .bind(issue_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Watchers
    // -----------------------------------------------------------------------

    pub async fn watchers(pool: &PgPool, issue_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM issue_watchers WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_all(pool)
            .await
    }

    /// Watch an issue. Idempotent.
    pub async fn add_watcher(
        pool: &PgPool,
        issue_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO issue_watchers (issue_id, user_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(issue_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Unwatch an issue. Idempotent.
    pub async fn remove_watcher(
        pool: &PgPool,
        issue_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM issue_watchers WHERE issue_id = $1 AND user_id = $2")
            .bind(issue_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    pub async fn labels(pool: &PgPool, issue_id: DbId) -> Result<Vec<Label>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            "SELECT l.id, l.project_id, l.name, l.color, l.created_at \
             FROM labels l \
             JOIN issue_labels il ON il.label_id = l.id \
             WHERE il.issue_id = $1 \
             ORDER BY l.name",
        )
        .bind(issue_id)
        .fetch_all(pool)
        .await
    }

    /// Attach a label. Returns `false` if it was already attached.
    pub async fn add_label(
        pool: &PgPool,
        issue_id: DbId,
        label_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO issue_labels (issue_id, label_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(issue_id)
        .bind(label_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Detach a label. Returns `false` if it was not attached.
    pub async fn remove_label(
        pool: &PgPool,
        issue_id: DbId,
        label_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issue_labels WHERE issue_id = $1 AND label_id = $2")
            .bind(issue_id)
            .bind(label_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

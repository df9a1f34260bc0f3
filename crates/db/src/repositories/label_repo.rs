//! Repository for the `labels` table.

use kite_core::types::DbId;
use sqlx::PgPool;

use crate::models::label::Label;

const COLUMNS: &str = "id, project_id, name, color, created_at";

/// Provides CRUD operations for labels.
pub struct LabelRepo;

impl LabelRepo {
    /// Insert a label. `(project_id, name)` is unique; duplicates surface as
    /// a database error for the caller to classify.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        name: &str,
        color: Option<&str>,
    ) -> Result<Label, sqlx::Error> {
        let query = format!(
            "INSERT INTO labels (project_id, name, color) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Label>(&query)
            .bind(project_id)
            .bind(name)
            .bind(color)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Label>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM labels WHERE id = $1");
        sqlx::query_as::<_, Label>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Label>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM labels WHERE project_id = $1 ORDER BY name");
        sqlx::query_as::<_, Label>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a label. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

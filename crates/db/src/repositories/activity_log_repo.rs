//! Repository for the append-only `activity_log` table.
//!
//! Appends run synchronously inside the mutation handler, after the entity
//! write commits and before the response is produced. For a given entity the
//! feed is totally ordered by `created_at` with the row id as insertion-order
//! tie-break.

use kite_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::ActivityLog;

const COLUMNS: &str = "id, action, entity_type, entity_id, user_id, metadata, created_at";

/// Append and read operations for the activity log. Entries are never
/// updated or deleted.
pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Durably append one entry, returning the stored row.
    pub async fn append(
        pool: &PgPool,
        action: &str,
        entity_type: &str,
        entity_id: DbId,
        user_id: DbId,
        metadata: Option<&serde_json::Value>,
    ) -> Result<ActivityLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_log (action, entity_type, entity_id, user_id, metadata) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(action)
            .bind(entity_type)
            .bind(entity_id)
            .bind(user_id)
            .bind(metadata)
            .fetch_one(pool)
            .await
    }

    /// Read an entity's feed in commit order (timestamp, then insertion
    /// sequence for ties).
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_log \
             WHERE entity_type = $1 AND entity_id = $2 \
             ORDER BY created_at, id \
             LIMIT $3"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

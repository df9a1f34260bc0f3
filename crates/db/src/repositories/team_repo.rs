//! Repository for the `teams` and `team_members` tables.

use kite_core::types::DbId;
use sqlx::PgPool;

use crate::models::team::{CreateTeam, Team, TeamMember, UpdateTeam};

const COLUMNS: &str = "id, workspace_id, name, description, created_by, created_at, updated_at";

/// Provides CRUD and membership operations for teams.
pub struct TeamRepo;

impl TeamRepo {
    /// Create a team and enroll the creator as its LEAD, in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTeam,
        created_by: DbId,
    ) -> Result<Team, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO teams (workspace_id, name, description, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let team = sqlx::query_as::<_, Team>(&query)
            .bind(input.workspace_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, 'LEAD')")
            .bind(team.id)
            .bind(created_by)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(team)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the teams of a workspace.
    pub async fn list_for_workspace(
        pool: &PgPool,
        workspace_id: DbId,
    ) -> Result<Vec<Team>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM teams WHERE workspace_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(workspace_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the team does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTeam,
    ) -> Result<Option<Team>, sqlx::Error> {
        let query = format!(
            "UPDATE teams \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// List a team's members with their roles, stable order.
    pub async fn members(pool: &PgPool, team_id: DbId) -> Result<Vec<TeamMember>, sqlx::Error> {
        sqlx::query_as::<_, TeamMember>(
            "SELECT user_id, role FROM team_members WHERE team_id = $1 ORDER BY user_id",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    /// Add a user to the team. Returns `false` if already a member; the
    /// existing role is left untouched in that case.
    pub async fn add_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO team_members (team_id, user_id, role) \
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a user from the team. Returns `false` if they were not a member.
    pub async fn remove_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2")
                .bind(team_id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(exists.is_some())
    }
}

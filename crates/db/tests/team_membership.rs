//! Integration tests for team CRUD and membership.
//!
//! Requires a running Postgres reachable via `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

use kite_db::models::team::{CreateTeam, UpdateTeam};
use kite_db::models::user::CreateUser;
use kite_db::repositories::{TeamRepo, UserRepo, WorkspaceRepo};
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, name: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: name.into(),
            email: format!("{name}@test.com"),
            password_hash: "x".into(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_workspace(pool: &PgPool, owner_id: i64) -> i64 {
    WorkspaceRepo::create(pool, "Acme", owner_id).await.unwrap().id
}

/// The creator is enrolled as LEAD in the same transaction as the team row.
#[ignore]
#[sqlx::test(migrations = "./migrations")]
async fn creator_becomes_lead(pool: PgPool) {
    let owner = seed_user(&pool, "alice").await;
    let workspace_id = seed_workspace(&pool, owner).await;

    let team = TeamRepo::create(
        &pool,
        &CreateTeam {
            workspace_id,
            name: "Platform".into(),
            description: None,
        },
        owner,
    )
    .await
    .unwrap();

    let members = TeamRepo::members(&pool, team.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, owner);
    assert_eq!(members[0].role, "LEAD");
    assert!(TeamRepo::is_member(&pool, team.id, owner).await.unwrap());
}

/// Re-adding an existing member reports `false` and keeps the original role.
#[ignore]
#[sqlx::test(migrations = "./migrations")]
async fn add_member_is_rejected_for_existing_members(pool: PgPool) {
    let owner = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let workspace_id = seed_workspace(&pool, owner).await;
    let team = TeamRepo::create(
        &pool,
        &CreateTeam {
            workspace_id,
            name: "Platform".into(),
            description: None,
        },
        owner,
    )
    .await
    .unwrap();

    assert!(TeamRepo::add_member(&pool, team.id, bob, "MEMBER").await.unwrap());
    assert!(!TeamRepo::add_member(&pool, team.id, bob, "LEAD").await.unwrap());

    let members = TeamRepo::members(&pool, team.id).await.unwrap();
    let bob_row = members.iter().find(|m| m.user_id == bob).unwrap();
    assert_eq!(bob_row.role, "MEMBER");
}

/// Removal reports whether a row was actually deleted, and is idempotent.
#[ignore]
#[sqlx::test(migrations = "./migrations")]
async fn remove_member_reports_prior_membership(pool: PgPool) {
    let owner = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let workspace_id = seed_workspace(&pool, owner).await;
    let team = TeamRepo::create(
        &pool,
        &CreateTeam {
            workspace_id,
            name: "Platform".into(),
            description: None,
        },
        owner,
    )
    .await
    .unwrap();
    TeamRepo::add_member(&pool, team.id, bob, "MEMBER").await.unwrap();

    assert!(TeamRepo::remove_member(&pool, team.id, bob).await.unwrap());
    assert!(!TeamRepo::remove_member(&pool, team.id, bob).await.unwrap());
    assert!(!TeamRepo::is_member(&pool, team.id, bob).await.unwrap());
}

/// Listing is scoped to the workspace; duplicate names within one
/// workspace violate `uq_teams_workspace_name`.
#[ignore]
#[sqlx::test(migrations = "./migrations")]
async fn teams_are_scoped_and_uniquely_named_per_workspace(pool: PgPool) {
    let owner = seed_user(&pool, "alice").await;
    let ws_a = seed_workspace(&pool, owner).await;
    let ws_b = WorkspaceRepo::create(&pool, "Beta", owner).await.unwrap().id;

    let input = |workspace_id| CreateTeam {
        workspace_id,
        name: "Platform".into(),
        description: None,
    };
    TeamRepo::create(&pool, &input(ws_a), owner).await.unwrap();
    // Same name in a different workspace is fine.
    TeamRepo::create(&pool, &input(ws_b), owner).await.unwrap();
    // Same name in the same workspace is not.
    let duplicate = TeamRepo::create(&pool, &input(ws_a), owner).await;
    assert!(duplicate.is_err());

    let teams = TeamRepo::list_for_workspace(&pool, ws_a).await.unwrap();
    assert_eq!(teams.len(), 1);

    let updated = TeamRepo::update(
        &pool,
        teams[0].id,
        &UpdateTeam {
            name: Some("Platform Core".into()),
            description: Some("infra".into()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Platform Core");
    assert_eq!(updated.description.as_deref(), Some("infra"));
}

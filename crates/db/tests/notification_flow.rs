//! Integration tests for the notification read-state machine.
//!
//! Requires a running Postgres reachable via `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

use kite_core::notifications;
use kite_db::models::user::CreateUser;
use kite_db::repositories::{NotificationRepo, UserRepo};
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

/// created(unread) -> read; re-marking is a no-op, not an error.
#[ignore]
#[sqlx::test(migrations = "./migrations")]
async fn mark_read_is_idempotent_and_decrements_unread_count(pool: PgPool) {
    let user_id = seed_user(&pool, "bob").await;

    let n = NotificationRepo::create(
        &pool,
        user_id,
        notifications::TASK_ASSIGNED,
        "You were assigned to task: Demo",
        None,
    )
    .await
    .unwrap();
    assert!(!n.is_read);
    assert!(n.read_at.is_none());

    assert_eq!(NotificationRepo::unread_count(&pool, user_id).await.unwrap(), 1);

    NotificationRepo::mark_read(&pool, n.id).await.unwrap();
    assert_eq!(NotificationRepo::unread_count(&pool, user_id).await.unwrap(), 0);

    let read = NotificationRepo::find_by_id(&pool, n.id).await.unwrap().unwrap();
    assert!(read.is_read);
    let first_read_at = read.read_at.expect("read_at set on first mark");

    // Second mark: no error, no change.
    NotificationRepo::mark_read(&pool, n.id).await.unwrap();
    let again = NotificationRepo::find_by_id(&pool, n.id).await.unwrap().unwrap();
    assert_eq!(again.read_at, Some(first_read_at));
}

/// mark_all_read flags every unread row for the user, and only that user.
#[ignore]
#[sqlx::test(migrations = "./migrations")]
async fn mark_all_read_scopes_to_one_user(pool: PgPool) {
    let bob = seed_user(&pool, "bob").await;
    let carol = seed_user(&pool, "carol").await;

    for i in 0..3 {
        NotificationRepo::create(
            &pool,
            bob,
            notifications::COMMENT_ADDED,
            &format!("comment {i}"),
            None,
        )
        .await
        .unwrap();
    }
    NotificationRepo::create(&pool, carol, notifications::TASK_UPDATED, "untouched", None)
        .await
        .unwrap();

    let marked = NotificationRepo::mark_all_read(&pool, bob).await.unwrap();
    assert_eq!(marked, 3);
    assert_eq!(NotificationRepo::unread_count(&pool, bob).await.unwrap(), 0);
    assert_eq!(NotificationRepo::unread_count(&pool, carol).await.unwrap(), 1);

    // Idempotent: nothing left to mark.
    assert_eq!(NotificationRepo::mark_all_read(&pool, bob).await.unwrap(), 0);
}

/// unread_only listing filters read rows out.
#[ignore]
#[sqlx::test(migrations = "./migrations")]
async fn list_unread_only_filters_read_rows(pool: PgPool) {
    let user_id = seed_user(&pool, "dave").await;

    let a = NotificationRepo::create(&pool, user_id, notifications::TASK_ASSIGNED, "a", None)
        .await
        .unwrap();
    NotificationRepo::create(&pool, user_id, notifications::TASK_ASSIGNED, "b", None)
        .await
        .unwrap();

    NotificationRepo::mark_read(&pool, a.id).await.unwrap();

    let unread = NotificationRepo::list_for_user(&pool, user_id, true, 50, 0)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].message, "b");

    let all = NotificationRepo::list_for_user(&pool, user_id, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

//! Unit tests for `WsManager`.
//!
//! These tests exercise the room registry and broadcast router directly,
//! without performing any HTTP upgrades. They verify join/leave semantics,
//! room-scoped delivery, disconnect cleanup, and graceful shutdown.

use axum::extract::ws::Message;
use kite_api::ws::{WsError, WsManager};
use kite_core::rooms::RoomId;
use kite_events::ServerEvent;
use tokio::sync::mpsc::UnboundedReceiver;

/// Helper: a small event with a recognizable payload.
fn deleted(task_id: i64) -> ServerEvent {
    ServerEvent::TaskDeleted { task_id }
}

/// Helper: pull the next Text frame off a receiver and parse it as JSON.
async fn next_json(rx: &mut UnboundedReceiver<Message>) -> serde_json::Value {
    match rx.recv().await.expect("expected a frame") {
        Message::Text(text) => serde_json::from_str(&text).expect("frame should be JSON"),
        other => panic!("Expected Text frame, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Connection lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), Some(1)).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), Some(1)).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Room membership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticated_connection_is_in_its_user_room() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), Some(7)).await;

    let members = manager.members_of(RoomId::User(7)).await;
    assert!(members.contains("conn-1"));
}

#[tokio::test]
async fn join_is_idempotent() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), Some(1)).await;

    manager.join("conn-1", RoomId::Project(3)).await.unwrap();
    manager.join("conn-1", RoomId::Project(3)).await.unwrap();

    let members = manager.members_of(RoomId::Project(3)).await;
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn leave_never_joined_room_is_noop() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), Some(1)).await;

    // Never joined; must not error or disturb anything.
    manager.leave("conn-1", RoomId::Issue(9)).await;
    manager.leave("unknown-conn", RoomId::Issue(9)).await;

    assert!(manager.members_of(RoomId::Issue(9)).await.is_empty());
}

#[tokio::test]
async fn join_unknown_connection_fails() {
    let manager = WsManager::new();

    let result = manager.join("ghost", RoomId::Project(1)).await;
    assert_eq!(result, Err(WsError::UnknownConnection("ghost".to_string())));
}

#[tokio::test]
async fn unauthenticated_connection_cannot_join() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-anon".to_string(), None).await;

    let result = manager.join("conn-anon", RoomId::Project(1)).await;
    assert_eq!(result, Err(WsError::NotAuthenticated));
}

#[tokio::test]
async fn remove_cleans_up_all_room_memberships() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), Some(4)).await;

    manager.join("conn-1", RoomId::Project(1)).await.unwrap();
    manager.join("conn-1", RoomId::Issue(2)).await.unwrap();
    manager.join("conn-1", RoomId::Workspace(3)).await.unwrap();

    manager.remove("conn-1").await;

    assert!(manager.members_of(RoomId::Project(1)).await.is_empty());
    assert!(manager.members_of(RoomId::Issue(2)).await.is_empty());
    assert!(manager.members_of(RoomId::Workspace(3)).await.is_empty());
    assert!(manager.members_of(RoomId::User(4)).await.is_empty());
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_reaches_only_room_members() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), Some(1)).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some(2)).await;

    manager.join("conn-1", RoomId::Project(5)).await.unwrap();
    // conn-2 joins a different project.
    manager.join("conn-2", RoomId::Project(6)).await.unwrap();

    let sent = manager.publish(RoomId::Project(5), &deleted(42)).await;
    assert_eq!(sent, 1);

    let json = next_json(&mut rx1).await;
    assert_eq!(json["event"], "task_deleted");
    assert_eq!(json["payload"]["taskId"], 42);

    // conn-2 must not have received anything.
    assert!(
        rx2.try_recv().is_err(),
        "Non-member received a room-scoped event"
    );
}

#[tokio::test]
async fn publish_to_empty_room_delivers_nothing() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), Some(1)).await;

    let sent = manager.publish(RoomId::Project(99), &deleted(1)).await;
    assert_eq!(sent, 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn no_delivery_after_leave() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), Some(1)).await;

    manager.join("conn-1", RoomId::Issue(7)).await.unwrap();
    manager.leave("conn-1", RoomId::Issue(7)).await;

    let sent = manager.publish(RoomId::Issue(7), &deleted(7)).await;
    assert_eq!(sent, 0);
    assert!(
        rx.try_recv().is_err(),
        "Event delivered to a connection that left the room"
    );
}

#[tokio::test]
async fn closed_channel_does_not_block_other_members() {
    let manager = WsManager::new();
    let rx_dead = manager.add("conn-dead".to_string(), Some(1)).await;
    let mut rx_live = manager.add("conn-live".to_string(), Some(2)).await;

    manager.join("conn-dead", RoomId::Project(1)).await.unwrap();
    manager.join("conn-live", RoomId::Project(1)).await.unwrap();

    // Simulate a dead client: its receiver is gone.
    drop(rx_dead);

    let sent = manager.publish(RoomId::Project(1), &deleted(3)).await;
    assert_eq!(sent, 1, "only the live member counts as delivered");

    let json = next_json(&mut rx_live).await;
    assert_eq!(json["event"], "task_deleted");
}

#[tokio::test]
async fn events_reach_every_member_of_the_room() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), Some(1)).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some(2)).await;
    let mut rx3 = manager.add("conn-3".to_string(), Some(3)).await;

    for conn in ["conn-1", "conn-2", "conn-3"] {
        manager.join(conn, RoomId::Workspace(1)).await.unwrap();
    }

    let sent = manager.publish(RoomId::Workspace(1), &deleted(10)).await;
    assert_eq!(sent, 3);

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let json = next_json(rx).await;
        assert_eq!(json["payload"]["taskId"], 10);
    }
}

#[tokio::test]
async fn user_room_targets_every_connection_of_that_user() {
    let manager = WsManager::new();
    // Same user, two devices.
    let mut rx_a = manager.add("conn-a".to_string(), Some(9)).await;
    let mut rx_b = manager.add("conn-b".to_string(), Some(9)).await;
    let mut rx_other = manager.add("conn-c".to_string(), Some(10)).await;

    let sent = manager.publish(RoomId::User(9), &deleted(1)).await;
    assert_eq!(sent, 2);

    assert_eq!(next_json(&mut rx_a).await["event"], "task_deleted");
    assert_eq!(next_json(&mut rx_b).await["event"], "task_deleted");
    assert!(rx_other.try_recv().is_err());
}

#[tokio::test]
async fn send_to_connection_targets_one_connection() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), Some(1)).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some(2)).await;

    let event = ServerEvent::Error {
        message: "Invalid room identifier: bogus".to_string(),
    };
    assert!(manager.send_to_connection("conn-1", &event).await);
    assert!(!manager.send_to_connection("ghost", &event).await);

    let json = next_json(&mut rx1).await;
    assert_eq!(json["event"], "error");
    assert_eq!(json["payload"]["message"], "Invalid room identifier: bogus");
    assert!(rx2.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Heartbeat sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_pings_live_connections() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), Some(1)).await;

    let evicted = manager.ping_all().await;
    assert_eq!(evicted, 0);

    let msg = rx.recv().await.expect("expected a Ping frame");
    assert!(matches!(msg, Message::Ping(_)), "Expected Ping, got: {msg:?}");
}

#[tokio::test]
async fn ping_all_evicts_connections_with_closed_channels() {
    let manager = WsManager::new();
    let rx_dead = manager.add("conn-dead".to_string(), Some(1)).await;
    let mut rx_live = manager.add("conn-live".to_string(), Some(2)).await;
    manager.join("conn-dead", RoomId::Project(4)).await.unwrap();
    manager.join("conn-live", RoomId::Project(4)).await.unwrap();

    // The dead client's receive loop never ran cleanup.
    drop(rx_dead);

    let evicted = manager.ping_all().await;
    assert_eq!(evicted, 1);
    assert_eq!(manager.connection_count().await, 1);

    // Its memberships are gone too, including the auto-joined user room.
    assert!(!manager
        .members_of(RoomId::Project(4))
        .await
        .contains("conn-dead"));
    assert!(manager.members_of(RoomId::User(1)).await.is_empty());

    // The survivor got its ping and still receives room traffic.
    let msg = rx_live.recv().await.expect("expected a Ping frame");
    assert!(matches!(msg, Message::Ping(_)));
    let sent = manager.publish(RoomId::Project(4), &deleted(8)).await;
    assert_eq!(sent, 1);
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), Some(1)).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some(2)).await;
    manager.join("conn-1", RoomId::Project(1)).await.unwrap();
    assert_eq!(manager.connection_count().await, 2);

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(manager.members_of(RoomId::Project(1)).await.is_empty());

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(
        matches!(msg1, Message::Close(None)),
        "Expected Close(None), got: {msg1:?}"
    );

    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(
        matches!(msg2, Message::Close(None)),
        "Expected Close(None), got: {msg2:?}"
    );

    // After Close, the channel should be closed (no more messages).
    assert!(
        rx1.recv().await.is_none(),
        "Channel should be closed after shutdown"
    );
}

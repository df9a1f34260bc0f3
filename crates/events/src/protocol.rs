//! Frame types for the realtime protocol.
//!
//! Event names and field names here are the wire contract; existing clients
//! depend on them byte-for-byte. Rooms travel as strings and are parsed into
//! [`kite_core::rooms::RoomId`] server-side.

use kite_core::types::DbId;
use kite_db::models::comment::Comment;
use kite_db::models::issue::Issue;
use kite_db::models::notification::Notification;
use serde::{Deserialize, Serialize};

/// A client→server frame.
///
/// ```json
/// {"type": "join", "room": "project:7"}
/// {"type": "leave", "room": "issue:3"}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { room: String },
    Leave { room: String },
}

/// A server→client frame: `{"event": "<name>", "payload": ...}`.
///
/// Variant names serialize to the snake_case event names of the contract.
/// Issues are called "tasks" on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A new issue in the project room's project.
    TaskCreated(Issue),
    /// An issue changed; carries the full updated row.
    TaskUpdated(Issue),
    /// An issue was removed; only the id survives. The field is camelCase
    /// on the wire, unlike everything else; clients destructure `taskId`.
    TaskDeleted {
        #[serde(rename = "taskId")]
        task_id: DbId,
    },
    /// A new comment in the issue room's issue.
    CommentAdded(Comment),
    /// A persisted notification addressed to the receiving user.
    Notification(Notification),
    /// A rejected client request (e.g. joining before authentication).
    /// The connection stays open.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_issue() -> Issue {
        Issue {
            id: 7,
            project_id: 3,
            title: "Fix login".into(),
            description: None,
            status: "TODO".into(),
            priority: "MEDIUM".into(),
            due_date: None,
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn client_join_frame_deserializes() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join","room":"project:7"}"#).unwrap();
        match msg {
            ClientMessage::Join { room } => assert_eq!(room, "project:7"),
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn client_leave_frame_deserializes() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"leave","room":"issue:3"}"#).unwrap();
        match msg {
            ClientMessage::Leave { room } => assert_eq!(room, "issue:3"),
            other => panic!("expected Leave, got {other:?}"),
        }
    }

    #[test]
    fn unknown_client_frame_is_an_error() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"shout","room":"x"}"#).is_err());
    }

    #[test]
    fn task_created_uses_exact_event_name() {
        let json = serde_json::to_value(ServerEvent::TaskCreated(sample_issue())).unwrap();
        assert_eq!(json["event"], "task_created");
        assert_eq!(json["payload"]["id"], 7);
        assert_eq!(json["payload"]["title"], "Fix login");
    }

    #[test]
    fn task_updated_uses_exact_event_name() {
        let json = serde_json::to_value(ServerEvent::TaskUpdated(sample_issue())).unwrap();
        assert_eq!(json["event"], "task_updated");
    }

    #[test]
    fn task_deleted_carries_only_the_id() {
        let json = serde_json::to_value(ServerEvent::TaskDeleted { task_id: 42 }).unwrap();
        assert_eq!(json["event"], "task_deleted");
        assert_eq!(json["payload"], serde_json::json!({"taskId": 42}));
    }

    #[test]
    fn comment_added_uses_exact_event_name() {
        let comment = Comment {
            id: 1,
            issue_id: 7,
            user_id: 2,
            content: "looks good".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(ServerEvent::CommentAdded(comment)).unwrap();
        assert_eq!(json["event"], "comment_added");
        assert_eq!(json["payload"]["content"], "looks good");
    }

    #[test]
    fn notification_event_carries_read_state() {
        let notification = Notification {
            id: 9,
            user_id: 5,
            kind: "TASK_ASSIGNED".into(),
            message: "You were assigned to task: Fix login".into(),
            related_issue_id: Some(7),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(ServerEvent::Notification(notification)).unwrap();
        assert_eq!(json["event"], "notification");
        assert_eq!(json["payload"]["kind"], "TASK_ASSIGNED");
        assert_eq!(json["payload"]["is_read"], false);
        assert_eq!(json["payload"]["related_issue_id"], 7);
    }
}

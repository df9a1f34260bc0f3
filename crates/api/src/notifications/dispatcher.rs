//! Persist-then-deliver notification dispatch.
//!
//! Every notification is written to the database before any WebSocket
//! delivery is attempted, so an offline recipient still finds it in their
//! notification list. Delivery targets the recipient's `user:<id>` room and
//! is best-effort; a failed send never rolls back the stored row.

use std::sync::Arc;

use kite_core::error::CoreError;
use kite_core::notifications as kinds;
use kite_core::rooms::RoomId;
use kite_core::types::DbId;
use kite_db::models::issue::Issue;
use kite_db::models::notification::Notification;
use kite_db::repositories::NotificationRepo;
use kite_db::DbPool;
use kite_events::ServerEvent;

use crate::error::{AppError, AppResult};
use crate::ws::WsManager;

/// Creates notifications and routes them to connected recipients.
pub struct NotificationDispatcher {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    /// Persist a notification and push it to the recipient's user room.
    ///
    /// Actions a user performs on their own behalf are suppressed: when
    /// `actor_id == recipient_id` nothing is stored or delivered and
    /// `Ok(None)` is returned.
    pub async fn notify(
        &self,
        actor_id: DbId,
        recipient_id: DbId,
        kind: &str,
        message: &str,
        related_issue_id: Option<DbId>,
    ) -> Result<Option<Notification>, sqlx::Error> {
        if actor_id == recipient_id {
            return Ok(None);
        }

        let notification =
            NotificationRepo::create(&self.pool, recipient_id, kind, message, related_issue_id)
                .await?;

        let delivered = self
            .ws_manager
            .publish(
                RoomId::User(recipient_id),
                &ServerEvent::Notification(notification.clone()),
            )
            .await;
        tracing::debug!(
            notification_id = notification.id,
            recipient_id,
            delivered,
            "Notification dispatched"
        );

        Ok(Some(notification))
    }

    /// Notify a user that they were assigned to an issue.
    pub async fn notify_task_assigned(
        &self,
        actor_id: DbId,
        assignee_id: DbId,
        issue: &Issue,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let message = format!("You were assigned to task: {}", issue.title);
        self.notify(
            actor_id,
            assignee_id,
            kinds::TASK_ASSIGNED,
            &message,
            Some(issue.id),
        )
        .await
    }

    /// Notify a user that an issue they are assigned to changed.
    pub async fn notify_task_updated(
        &self,
        actor_id: DbId,
        recipient_id: DbId,
        issue: &Issue,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let message = format!("Task updated: {}", issue.title);
        self.notify(
            actor_id,
            recipient_id,
            kinds::TASK_UPDATED,
            &message,
            Some(issue.id),
        )
        .await
    }

    /// Notify a watcher that someone commented on a watched issue.
    pub async fn notify_comment_added(
        &self,
        actor_id: DbId,
        watcher_id: DbId,
        commenter_name: &str,
        issue: &Issue,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let message = format!("{} commented on task: {}", commenter_name, issue.title);
        self.notify(
            actor_id,
            watcher_id,
            kinds::COMMENT_ADDED,
            &message,
            Some(issue.id),
        )
        .await
    }

    /// Mark one notification as read on behalf of `caller_id`.
    ///
    /// Only the recipient may mark their notification; anyone else gets
    /// Forbidden. Marking an already-read notification is a no-op.
    pub async fn mark_as_read(&self, notification_id: DbId, caller_id: DbId) -> AppResult<()> {
        let notification = NotificationRepo::find_by_id(&self.pool, notification_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Notification",
                id: notification_id,
            })?;

        if notification.user_id != caller_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "Notification belongs to another user".into(),
            )));
        }

        NotificationRepo::mark_read(&self.pool, notification_id).await?;
        Ok(())
    }

    /// Mark all of a user's unread notifications as read.
    ///
    /// Returns the number of notifications that were marked.
    pub async fn mark_all_as_read(&self, user_id: DbId) -> Result<u64, sqlx::Error> {
        NotificationRepo::mark_all_read(&self.pool, user_id).await
    }

    /// The number of unread notifications for a user.
    pub async fn unread_count(&self, user_id: DbId) -> Result<i64, sqlx::Error> {
        NotificationRepo::unread_count(&self.pool, user_id).await
    }
}

//! Notification kind constants.
//!
//! Stored verbatim in the `notifications.kind` column and transmitted
//! unchanged inside `notification` events.

pub const TASK_ASSIGNED: &str = "TASK_ASSIGNED";
pub const TASK_UPDATED: &str = "TASK_UPDATED";
pub const COMMENT_ADDED: &str = "COMMENT_ADDED";

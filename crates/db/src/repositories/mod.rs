//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_log_repo;
pub mod comment_repo;
pub mod issue_repo;
pub mod label_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod team_repo;
pub mod user_repo;
pub mod workspace_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use comment_repo::CommentRepo;
pub use issue_repo::IssueRepo;
pub use label_repo::LabelRepo;
pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;
pub use team_repo::TeamRepo;
pub use user_repo::UserRepo;
pub use workspace_repo::WorkspaceRepo;

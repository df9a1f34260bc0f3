//! Activity log constants.
//!
//! This module lives in `core` (zero internal deps) so both the repository
//! layer and the API handlers can name action kinds without a dependency on
//! either.

/// Known action kinds for activity log entries.
pub mod actions {
    pub const ISSUE_CREATED: &str = "ISSUE_CREATED";
    pub const ISSUE_UPDATED: &str = "ISSUE_UPDATED";
    pub const COMMENT_ADDED: &str = "COMMENT_ADDED";
    pub const LABEL_ADDED: &str = "LABEL_ADDED";
    pub const LABEL_REMOVED: &str = "LABEL_REMOVED";
}

/// Known entity types referenced by activity log entries.
pub mod entities {
    pub const ISSUE: &str = "issue";
}

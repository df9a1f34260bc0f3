//! Kite realtime wire protocol.
//!
//! Typed frames exchanged over the WebSocket connection:
//!
//! - [`ClientMessage`] — client→server room membership requests.
//! - [`ServerEvent`] — server→client domain events, tagged with the exact
//!   event names established by the client contract (`task_created`,
//!   `task_updated`, `task_deleted`, `comment_added`, `notification`).

mod protocol;

pub use protocol::{ClientMessage, ServerEvent};

//! Notification pipeline: persist first, then deliver over WebSocket.

mod dispatcher;

pub use dispatcher::NotificationDispatcher;

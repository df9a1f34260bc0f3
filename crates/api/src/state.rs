use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notifications::NotificationDispatcher;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: kite_db::DbPool,
    /// Server configuration (JWT secret, CORS origins, timeouts).
    pub config: Arc<ServerConfig>,
    /// WebSocket room registry and broadcast router.
    pub ws_manager: Arc<WsManager>,
    /// Persist-then-deliver notification pipeline.
    pub dispatcher: Arc<NotificationDispatcher>,
}

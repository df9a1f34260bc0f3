//! WebSocket connection registry and room-based broadcast router.
//!
//! Connections and room memberships live behind a single `RwLock` so every
//! read sees one consistent snapshot: a connection is either in a room's
//! member set and resolvable, or absent from both maps. Joining twice is a
//! no-op, as is leaving a room the connection never joined.

use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use kite_core::rooms::RoomId;
use kite_core::types::{DbId, Timestamp};
use kite_events::ServerEvent;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Errors from room membership operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WsError {
    /// The connection has no resolved user identity and may not join rooms.
    #[error("Connection is not authenticated")]
    NotAuthenticated,
    /// The connection id is not registered.
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),
}

/// Metadata for a single WebSocket connection.
struct WsConnection {
    /// Authenticated user id, if the handshake carried a valid token.
    user_id: Option<DbId>,
    /// Channel sender for outbound messages to this connection.
    sender: WsSender,
    /// Rooms this connection currently belongs to.
    rooms: HashSet<RoomId>,
    /// When this connection was established.
    #[allow(dead_code)]
    connected_at: Timestamp,
}

/// Both maps of the registry, guarded together.
#[derive(Default)]
struct Registry {
    connections: HashMap<String, WsConnection>,
    rooms: HashMap<RoomId, HashSet<String>>,
}

/// Manages all active WebSocket connections and their room memberships.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    inner: RwLock<Registry>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry::default()),
        }
    }

    /// Register a new connection.
    ///
    /// Authenticated connections are joined to their personal `user:<id>`
    /// room immediately, so notifications reach them without an explicit
    /// join frame.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: Option<DbId>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut rooms = HashSet::new();
        if let Some(uid) = user_id {
            rooms.insert(RoomId::User(uid));
        }

        let mut guard = self.inner.write().await;
        let registry = &mut *guard;
        for room in &rooms {
            registry
                .rooms
                .entry(*room)
                .or_default()
                .insert(conn_id.clone());
        }
        registry.connections.insert(
            conn_id,
            WsConnection {
                user_id,
                sender: tx,
                rooms,
                connected_at: chrono::Utc::now(),
            },
        );
        rx
    }

    /// Remove a connection, dropping all of its room memberships.
    ///
    /// Empty member sets are removed so `rooms` never accumulates tombstones.
    /// No-op for unknown ids.
    pub async fn remove(&self, conn_id: &str) {
        let mut guard = self.inner.write().await;
        let registry = &mut *guard;
        if let Some(conn) = registry.connections.remove(conn_id) {
            for room in conn.rooms {
                if let Some(members) = registry.rooms.get_mut(&room) {
                    members.remove(conn_id);
                    if members.is_empty() {
                        registry.rooms.remove(&room);
                    }
                }
            }
        }
    }

    /// Add a connection to a room. Idempotent.
    ///
    /// Fails with [`WsError::NotAuthenticated`] if the connection has no
    /// resolved user identity, and [`WsError::UnknownConnection`] if the id
    /// is not registered.
    pub async fn join(&self, conn_id: &str, room: RoomId) -> Result<(), WsError> {
        let mut guard = self.inner.write().await;
        let registry = &mut *guard;
        let conn = registry
            .connections
            .get_mut(conn_id)
            .ok_or_else(|| WsError::UnknownConnection(conn_id.to_string()))?;
        if conn.user_id.is_none() {
            return Err(WsError::NotAuthenticated);
        }
        conn.rooms.insert(room);
        registry
            .rooms
            .entry(room)
            .or_default()
            .insert(conn_id.to_string());
        Ok(())
    }

    /// Remove a connection from a room. Idempotent: leaving a room the
    /// connection never joined (or an unknown connection) is a no-op.
    pub async fn leave(&self, conn_id: &str, room: RoomId) {
        let mut guard = self.inner.write().await;
        let registry = &mut *guard;
        if let Some(conn) = registry.connections.get_mut(conn_id) {
            conn.rooms.remove(&room);
        }
        if let Some(members) = registry.rooms.get_mut(&room) {
            members.remove(conn_id);
            if members.is_empty() {
                registry.rooms.remove(&room);
            }
        }
    }

    /// Snapshot the current member connection ids of a room.
    pub async fn members_of(&self, room: RoomId) -> HashSet<String> {
        self.inner
            .read()
            .await
            .rooms
            .get(&room)
            .cloned()
            .unwrap_or_default()
    }

    /// The authenticated user behind a connection, if any.
    pub async fn user_of(&self, conn_id: &str) -> Option<DbId> {
        self.inner
            .read()
            .await
            .connections
            .get(conn_id)
            .and_then(|c| c.user_id)
    }

    /// Serialize an event once and deliver it to every current member of a
    /// room. Best-effort: a closed channel skips that member only (it will
    /// be cleaned up by its own receive loop), never the rest.
    ///
    /// Returns the number of members the event was queued for.
    pub async fn publish(&self, room: RoomId, event: &ServerEvent) -> usize {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, room = %room, "Failed to serialize event");
                return 0;
            }
        };

        let registry = self.inner.read().await;
        let Some(members) = registry.rooms.get(&room) else {
            return 0;
        };

        let mut count = 0;
        for conn_id in members {
            let Some(conn) = registry.connections.get(conn_id) else {
                continue;
            };
            if conn.sender.send(Message::Text(text.clone().into())).is_ok() {
                count += 1;
            } else {
                tracing::debug!(conn_id = %conn_id, room = %room, "Dropping event for closed connection");
            }
        }
        count
    }

    /// Send an event to a single connection, regardless of rooms.
    ///
    /// Used for per-connection protocol errors. Returns `false` if the
    /// connection is unknown or its channel is closed.
    pub async fn send_to_connection(&self, conn_id: &str, event: &ServerEvent) -> bool {
        let Ok(text) = serde_json::to_string(event) else {
            return false;
        };
        let registry = self.inner.read().await;
        registry
            .connections
            .get(conn_id)
            .map(|conn| conn.sender.send(Message::Text(text.into())).is_ok())
            .unwrap_or(false)
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Send a Close frame to every connection, then clear both maps.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut registry = self.inner.write().await;
        let count = registry.connections.len();
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        registry.connections.clear();
        registry.rooms.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client, evicting any connection
    /// whose channel has already closed.
    ///
    /// The receive loop normally removes its own connection on disconnect;
    /// this sweep catches channels that died without that cleanup running,
    /// so dead entries do not linger in room member sets between heartbeats.
    ///
    /// Returns the number of connections evicted.
    pub async fn ping_all(&self) -> usize {
        let mut guard = self.inner.write().await;
        let registry = &mut *guard;

        let dead: Vec<String> = registry
            .connections
            .iter()
            .filter(|(_, conn)| conn.sender.send(Message::Ping(Bytes::new())).is_err())
            .map(|(conn_id, _)| conn_id.clone())
            .collect();

        for conn_id in &dead {
            if let Some(conn) = registry.connections.remove(conn_id) {
                for room in conn.rooms {
                    if let Some(members) = registry.rooms.get_mut(&room) {
                        members.remove(conn_id);
                        if members.is_empty() {
                            registry.rooms.remove(&room);
                        }
                    }
                }
            }
        }
        dead.len()
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

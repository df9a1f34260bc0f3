//! HTTP upgrade handler and per-connection message loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use kite_core::error::CoreError;
use kite_core::rooms::RoomId;
use kite_core::types::DbId;
use kite_events::{ClientMessage, ServerEvent};
use serde::Deserialize;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Query parameters for the WebSocket handshake.
///
/// Browsers cannot set headers on WebSocket upgrades, so the access token
/// travels as a query parameter instead.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// HTTP handler that authenticates and upgrades the connection to WebSocket.
///
/// The token is validated once, before the upgrade: a missing or invalid
/// token yields a plain 401 response and no WebSocket is established. Token
/// expiry after the handshake does not terminate the connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let token = query.token.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Missing token query parameter".into()))
    })?;

    let claims = validate_token(&token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, claims.sub)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes join/leave frames on the current task.
///   4. Cleans up all room memberships on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, user_id: DbId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = ws_manager.add(conn_id.clone(), Some(user_id)).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound frames.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_client_frame(&ws_manager, &conn_id, user_id, &text).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {
                // Binary and Ping frames carry no protocol meaning here.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection (and its room memberships) and abort the
    // sender task.
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket disconnected");
}

/// Parse and apply one inbound text frame.
///
/// Malformed frames and rejected joins produce an `error` event on this
/// connection only; the connection itself stays open.
async fn handle_client_frame(
    ws_manager: &Arc<WsManager>,
    conn_id: &str,
    user_id: DbId,
    text: &str,
) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(conn_id = %conn_id, error = %e, "Unparseable client frame");
            send_error(ws_manager, conn_id, "Malformed message").await;
            return;
        }
    };

    match message {
        ClientMessage::Join { room } => {
            let room_id = match room.parse::<RoomId>() {
                Ok(room_id) => room_id,
                Err(e) => {
                    send_error(ws_manager, conn_id, &e.to_string()).await;
                    return;
                }
            };

            // A user room belongs to exactly one user; others may not
            // subscribe to it.
            if let Some(owner) = room_id.user_id() {
                if owner != user_id {
                    send_error(ws_manager, conn_id, "Cannot join another user's room").await;
                    return;
                }
            }

            match ws_manager.join(conn_id, room_id).await {
                Ok(()) => {
                    tracing::debug!(conn_id = %conn_id, room = %room_id, "Joined room");
                }
                Err(e) => {
                    send_error(ws_manager, conn_id, &e.to_string()).await;
                }
            }
        }
        ClientMessage::Leave { room } => {
            match room.parse::<RoomId>() {
                Ok(room_id) => {
                    ws_manager.leave(conn_id, room_id).await;
                    tracing::debug!(conn_id = %conn_id, room = %room_id, "Left room");
                }
                Err(e) => {
                    send_error(ws_manager, conn_id, &e.to_string()).await;
                }
            }
        }
    }
}

async fn send_error(ws_manager: &Arc<WsManager>, conn_id: &str, message: &str) {
    let event = ServerEvent::Error {
        message: message.to_string(),
    };
    ws_manager.send_to_connection(conn_id, &event).await;
}

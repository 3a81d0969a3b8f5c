//! WebSocket upgrade handler and message loop
//!
//! Each live-feed connection gets a welcome message with its connection ID,
//! then two halves run side by side: a writer task draining the connection's
//! queue into the socket, and a reader answering `request_products` and
//! `ping` until the client goes away.

use super::manager::ConnectionManager;
use super::protocol::{ClientMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::stream::StreamExt;
use std::sync::Arc;

/// GET /ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(manager): State<Arc<ConnectionManager>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, manager))
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize ServerMessage");
            None
        }
    }
}

async fn handle_socket(socket: WebSocket, manager: Arc<ConnectionManager>) {
    let (conn_id, mut outbox) = manager.connect().await;
    tracing::info!(connection_id = %conn_id, "live feed client connected");

    let (mut sink, mut stream) = socket.split();

    // Queued first so it precedes any event dispatched meanwhile
    manager
        .send_to(
            &conn_id,
            ServerMessage::Welcome {
                connection_id: conn_id.clone(),
            },
        )
        .await;

    let writer_id = conn_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            let Some(frame) = encode(&message) else {
                continue;
            };
            if sink.send(frame).await.is_err() {
                tracing::debug!(connection_id = %writer_id, "WebSocket write failed, closing");
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                handle_client_message(&manager, &conn_id, &text).await;
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %conn_id, "Client sent close frame");
                break;
            }
            // Pings are answered by axum; binary frames are not part of the protocol
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(connection_id = %conn_id, error = %e, "WebSocket read error");
                break;
            }
        }
    }

    writer.abort();
    manager.disconnect(&conn_id).await;
    tracing::info!(connection_id = %conn_id, "live feed client disconnected");
}

/// Process a single client message
async fn handle_client_message(manager: &ConnectionManager, connection_id: &str, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            let error_msg = ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            };
            manager.send_to(connection_id, error_msg).await;
            return;
        }
    };

    match msg {
        ClientMessage::RequestProducts => {
            manager.send_recent_products(connection_id).await;
        }
        ClientMessage::Ping => {
            manager.send_to(connection_id, ServerMessage::Pong).await;
        }
    }
}

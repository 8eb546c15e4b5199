use crate::registry::{ConnectionHandle, ConnectionSink, SinkError};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::server::ServerState;

/// Body returned for any plain HTTP request that is not `/version`.
pub(crate) const BAD_REQUEST_BODY: &str = "WebSocket connection is expected here.";

/// Agent string served by `/version`.
pub(crate) fn agent_string() -> String {
    format!("skelcast/{}", env!("CARGO_PKG_VERSION"))
}

/// Outbound sink backed by the per-connection forward channel. A send
/// after the forward task has ended is the closed-pipe condition.
pub(crate) struct WebSocketSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ConnectionSink for WebSocketSink {
    fn send(&self, payload: &str) -> Result<(), SinkError> {
        self.tx
            .send(payload.to_string())
            .map_err(|_| SinkError::Closed)
    }
}

/// Handler for the version endpoint
pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, agent_string())
}

/// Handler for anything that is neither `/version` nor an upgrade
pub async fn bad_request_handler() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, BAD_REQUEST_BODY)
}

/// Handler for the WebSocket endpoint. Plain HTTP requests land here too
/// when they hit `/` without upgrade headers, and get the 400 treatment.
pub async fn ws_handler(
    State(state): State<ServerState>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    match ws {
        Some(ws) => ws.on_upgrade(move |socket| handle_socket(socket, state)),
        None => bad_request_handler().await.into_response(),
    }
}

/// Drive one established WebSocket connection until it closes.
///
/// The connection is registered for broadcast on entry and deregistered on
/// exit; membership in the registry is the only lifetime signal the rest
/// of the system sees. Inbound client messages are drained and discarded —
/// the receive loop exists solely to detect closure.
async fn handle_socket(socket: WebSocket, state: ServerState) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = ConnectionHandle::new(Arc::new(WebSocketSink { tx }));
    let id = handle.id();

    state.registry.add(handle);
    info!(connection = %id, clients = state.registry.len(), "WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Some(payload) => {
                        if sender.send(Message::Text(payload)).await.is_err() {
                            debug!(connection = %id, "Send failed, client gone");
                            break;
                        }
                    }
                    // Broadcaster pruned us; nothing left to forward.
                    None => break,
                }
            }
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(connection = %id, "Client closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(connection = %id, error = %e, "Receive error, dropping client");
                        break;
                    }
                }
            }
        }
    }

    state.registry.remove(&id);
    info!(connection = %id, clients = state.registry.len(), "WebSocket client disconnected");
}

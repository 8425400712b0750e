//! WebSocket viewer transport
//!
//! Connects a socket to the sync coordinator: the snapshot frames are
//! already queued on the session when the upgrade completes, so the
//! forwarding loop just drains the session channel into binary messages,
//! one frame per message. Viewers never send protocol data; anything
//! other than ping/close from the client is ignored.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;

use crate::relay::Relay;

/// Upgrade an HTTP request to a viewer session
///
/// # Route
///
/// `GET /ws`
pub async fn ws_viewer(
    ws: WebSocketUpgrade,
    State(relay): State<Arc<Relay>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_viewer(socket, relay))
}

async fn handle_viewer(mut socket: WebSocket, relay: Arc<Relay>) {
    let mut session = match relay.connect().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to connect viewer session");
            return;
        }
    };
    let session_id = session.id();
    tracing::debug!(session_id, "Viewer socket connected");

    loop {
        tokio::select! {
            frame = session.next_frame() => {
                match frame {
                    Some(frame) => {
                        if socket.send(Message::Binary(frame)).await.is_err() {
                            tracing::debug!(session_id, "Viewer gone (send failed)");
                            break;
                        }
                    }
                    // Coordinator dropped the session.
                    None => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id, "Viewer disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id, error = %e, "Viewer socket error");
                        break;
                    }
                    // Viewers have nothing to say; ignore text/binary input.
                    _ => {}
                }
            }
        }
    }

    session.close();
    relay.disconnect(session_id).await;
    tracing::debug!(session_id, "Viewer session closed");
}

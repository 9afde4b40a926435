// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! WebSocket handler for live reload functionality.

use super::registry::{Session, SessionRegistry};
use axum::extract::ws::{Message, WebSocket};
use std::sync::Arc;

/// Handles a WebSocket connection for live reload notifications.
///
/// The session stays registered for as long as the socket is open.
pub async fn handle_websocket(socket: WebSocket, registry: Arc<SessionRegistry>) {
    let session = registry.connect();
    serve_session(socket, session).await;
}

async fn serve_session(mut socket: WebSocket, mut session: Session) {
    loop {
        tokio::select! {
            event = session.next_event() => {
                match event {
                    Some(event) => {
                        let message = Message::Text(event.as_message().to_string());
                        if socket.send(message).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }
    tracing::debug!("Closing live reload session {}", session.id());
}

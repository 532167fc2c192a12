//! Live record feed over WebSocket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;

use parkease_core::BranchId;

use crate::auth::AuthUser;
use crate::events::RecordEvent;
use crate::state::AppState;

/// Upgrade to a WebSocket streaming the caller's record events as JSON text
/// frames.
pub async fn live_feed(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ws: WebSocketUpgrade,
) -> Response {
    let events = state.events.subscribe();
    let branch_id = auth.branch_id;

    tracing::debug!(branch_id = %branch_id, "Live feed subscriber connected");

    ws.on_upgrade(move |socket| stream_events(socket, events, branch_id))
}

async fn stream_events(socket: WebSocket, mut events: Receiver<RecordEvent>, branch_id: BranchId) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event.is_for(&branch_id) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(branch_id = %branch_id, skipped, "Live feed subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!(branch_id = %branch_id, "Live feed subscriber disconnected");
}

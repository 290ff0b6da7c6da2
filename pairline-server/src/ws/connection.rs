//! WebSocket connection handling

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use pairline_core::HubEvent;
use tracing::{debug, error, info, warn};

use crate::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Relay hub events to one client until either side goes away
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscription = state.store.subscribe().await;
    let id = subscription.id();

    info!(subscriber = id, "WebSocket client connected");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    debug!(subscriber = id, "Subscription closed by hub");
                    break;
                };
                if let Err(e) = send_event(&mut sender, &event).await {
                    debug!(subscriber = id, "Failed to deliver {}: {}", event.name(), e);
                    break;
                }
            }
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    debug!(subscriber = id, "WebSocket client sent close frame");
                    break;
                }
                Some(Ok(Message::Ping(data))) => {
                    if sender.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(_)) => {
                    // Client frames carry no commands
                }
                Some(Err(e)) => {
                    error!(subscriber = id, "WebSocket error: {}", e);
                    break;
                }
            }
        }
    }

    state.store.hub().unsubscribe(id).await;
    info!(subscriber = id, "WebSocket client disconnected");
}

async fn send_event(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    event: &HubEvent,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize {} event: {}", event.name(), e);
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await?;
    Ok(())
}

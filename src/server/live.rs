use super::AppState;
use crate::protocol::LiveEvent;
use crate::watcher;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

pub(super) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    // Subscribe before the initial scan so nothing added in between is lost.
    let mut events = state.events.subscribe();
    info!("Live client connected");

    let dir = state.config.ebooks_dir();
    let existing = match tokio::task::spawn_blocking(move || watcher::scan(&dir)).await {
        Ok(existing) => existing,
        Err(err) => {
            warn!("Initial library scan failed: {err}");
            Default::default()
        }
    };
    for path in &existing {
        if !send_event(&mut sender, &watcher::event_for(path)).await {
            return;
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if !send_event(&mut sender, &event).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live client lagged behind library events");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!("Live socket error: {err}");
                    break;
                }
            },
        }
    }
    info!("Live client disconnected");
}

async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &LiveEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(err) => {
            warn!("Failed to encode live event: {err}");
            return true;
        }
    };
    sender.send(Message::Text(json)).await.is_ok()
}

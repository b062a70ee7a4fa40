//! Live library notifications over the server WebSocket.

use crate::app::Message;
use crate::cancellation::CancellationToken;
use crate::protocol::LiveEvent;
use futures_util::StreamExt;
use reqwest::Url;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

/// Keep a notification socket open until `token` is cancelled or the
/// controller goes away. A lost connection is retried after `reconnect_delay`
/// and every (re)connection asks for a catalog refresh, since files may have
/// arrived while disconnected.
pub async fn listen(
    url: Url,
    tx: UnboundedSender<Message>,
    reconnect_delay: Duration,
    token: CancellationToken,
) {
    while !token.is_cancelled() && !tx.is_closed() {
        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((mut socket, _)) => {
                info!(url = %url, "Live updates connected");
                if tx.send(Message::LiveConnected).is_err() {
                    return;
                }
                while let Some(frame) = socket.next().await {
                    if token.is_cancelled() {
                        return;
                    }
                    match frame {
                        Ok(WsMessage::Text(text)) => match parse_event(&text) {
                            Some(message) => {
                                if tx.send(message).is_err() {
                                    return;
                                }
                            }
                            None => debug!(payload = %text, "Ignoring unknown live event"),
                        },
                        Ok(WsMessage::Close(_)) => break,
                        Ok(_) => {}
                        Err(err) => {
                            warn!("Live update stream failed: {err}");
                            break;
                        }
                    }
                }
                warn!(url = %url, "Live updates disconnected");
            }
            Err(err) => {
                debug!(url = %url, "Live updates unavailable: {err}");
            }
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}

pub fn parse_event(text: &str) -> Option<Message> {
    match serde_json::from_str::<LiveEvent>(text).ok()? {
        LiveEvent::NewEbook { path } => Some(Message::EbookDiscovered { path }),
    }
}

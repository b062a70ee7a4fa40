use super::api::ApiClient;
use crate::app::{Effect, Message};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Run one effect on the tokio pool and post its result back to the
/// controller loop. Results for requests the controller no longer waits on
/// are discarded there, not here.
pub fn spawn_effect(api: &ApiClient, effect: Effect, tx: &UnboundedSender<Message>) {
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let message = run_effect(&api, effect).await;
        if tx.send(message).is_err() {
            debug!("Controller gone; dropping effect result");
        }
    });
}

async fn run_effect(api: &ApiClient, effect: Effect) -> Message {
    match effect {
        Effect::LoadEbooks { request_id } => Message::EbooksLoaded {
            request_id,
            result: api.list_ebooks().await.map_err(describe),
        },
        Effect::LoadVoices => Message::VoicesLoaded {
            result: api.list_voices().await.map_err(describe),
        },
        Effect::ExtractText {
            request_id,
            filename,
        } => {
            let result = api.extract_text(&filename).await.map_err(describe);
            Message::TextExtracted {
                request_id,
                filename,
                result,
            }
        }
        Effect::Synthesize {
            request_id,
            filename,
            section,
            voice_id,
            text,
            output_name,
        } => {
            let result = api
                .synthesize(&text, &voice_id, &output_name)
                .await
                .map_err(describe);
            if let Err(err) = &result {
                warn!(file = %filename, section, voice = %voice_id, "Synthesis failed: {err}");
            }
            Message::SpeechSynthesized {
                request_id,
                filename,
                section,
                voice_id,
                result,
            }
        }
    }
}

fn describe(err: anyhow::Error) -> String {
    format!("{err:#}")
}

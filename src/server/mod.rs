//! HTTP and WebSocket front for the library, extraction and synthesis runners.
//!
//! Every request is independent; the only shared state is the configuration,
//! the two runners and the broadcast side of the library watcher.

mod error;
mod live;
mod routes;

pub use error::ApiError;

use crate::cancellation::CancellationToken;
use crate::config::AppConfig;
use crate::extract::Extractor;
use crate::protocol::LiveEvent;
use crate::tts::SpeechSynthesizer;
use crate::watcher;
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub extractor: Extractor,
    pub synthesizer: SpeechSynthesizer,
    pub events: broadcast::Sender<LiveEvent>,
}

impl AppState {
    pub fn new(config: AppConfig, events: broadcast::Sender<LiveEvent>) -> Self {
        let extractor = Extractor::new(
            config.extract_command.clone(),
            config.temp_dir(),
            config.extract_timeout(),
        );
        let synthesizer = SpeechSynthesizer::new(
            config.tts_command.clone(),
            config.voices_dir(),
            config.audio_dir(),
            config.temp_dir(),
            config.tts_timeout(),
        );
        Self {
            config: Arc::new(config),
            extractor,
            synthesizer,
            events,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ebooks", get(routes::list_ebooks))
        .route("/api/voices", get(routes::list_voices))
        .route("/api/extract-text/:filename", get(routes::extract_text))
        .route("/api/text-to-speech", post(routes::text_to_speech))
        .route("/audio/:file", get(routes::serve_audio))
        .route("/health", get(routes::health))
        .route("/ws", get(live::ws_handler))
        .with_state(state)
}

/// Run the server until ctrl-c.
pub async fn serve(config: AppConfig) -> Result<()> {
    prepare_dirs(&config).await?;

    let token = CancellationToken::new();
    let events = watcher::spawn(config.ebooks_dir(), config.watch_interval(), token.clone());
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, events);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        addr = %addr,
        ebooks = %state.config.ebooks_dir,
        voices = state.config.voices.len(),
        "Narrator server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("Server error")?;

    token.cancel();
    Ok(())
}

/// Create the library, audio and temp directories if they are missing.
async fn prepare_dirs(config: &AppConfig) -> Result<()> {
    for dir in [config.ebooks_dir(), config.audio_dir(), config.temp_dir()] {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directories_are_created() {
        let root = tempfile::tempdir().unwrap();
        let path = |name: &str| root.path().join(name).to_string_lossy().into_owned();
        let config = AppConfig {
            ebooks_dir: path("books"),
            audio_dir: path("public/audio"),
            temp_dir: path("temp"),
            ..AppConfig::default()
        };

        prepare_dirs(&config).await.unwrap();
        assert!(config.ebooks_dir().is_dir());
        assert!(config.audio_dir().is_dir());
        assert!(config.temp_dir().is_dir());
        assert!(crate::catalog::list_ebooks(&config.ebooks_dir()).unwrap().is_empty());
    }
}

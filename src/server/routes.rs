use super::AppState;
use super::error::ApiError;
use crate::catalog;
use crate::protocol::{Ebook, ExtractedText, SynthesisRequest, SynthesisResponse, Voice};
use crate::sections::split_sections;
use crate::tts::SynthesisError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{debug, info, warn};

pub(super) async fn list_ebooks(State(state): State<AppState>) -> Result<Json<Vec<Ebook>>, ApiError> {
    let dir = state.config.ebooks_dir();
    let ebooks = tokio::task::spawn_blocking(move || catalog::list_ebooks(&dir))
        .await
        .map_err(|err| ApiError::internal("Listing task failed", err))?
        .map_err(|err| ApiError::internal("Failed to list ebooks", format!("{err:#}")))?;
    Ok(Json(ebooks))
}

pub(super) async fn list_voices(State(state): State<AppState>) -> Json<Vec<Voice>> {
    Json(state.config.voices.clone())
}

pub(super) async fn extract_text(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ExtractedText>, ApiError> {
    if !catalog::is_plain_file_name(&filename) {
        return Err(ApiError::BadRequest(format!("Invalid filename: {filename}")));
    }
    let path = state.config.ebooks_dir().join(&filename);
    if !path.is_file() {
        return Err(ApiError::NotFound(format!("File not found: {filename}")));
    }

    let text = state
        .extractor
        .extract(&path)
        .await
        .map_err(|err| ApiError::internal("Text extraction failed", format!("{err:#}")))?;
    let sections = split_sections(&text);
    info!(file = %filename, sections = sections.len(), "Extracted ebook text");
    Ok(Json(ExtractedText {
        title: catalog::title_for(&filename),
        sections,
    }))
}

pub(super) async fn text_to_speech(
    State(state): State<AppState>,
    body: Result<Json<SynthesisRequest>, JsonRejection>,
) -> Result<Json<SynthesisResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    if request.text.trim().is_empty()
        || request.voice_id.is_empty()
        || request.output_file_name.is_empty()
    {
        return Err(ApiError::BadRequest(
            "Missing parameters: text, voiceId and outputFileName are required".into(),
        ));
    }
    if !catalog::is_plain_file_name(&request.output_file_name) {
        return Err(ApiError::BadRequest(format!(
            "Invalid outputFileName: {}",
            request.output_file_name
        )));
    }
    if catalog::find_voice(&state.config.voices, &request.voice_id).is_none() {
        return Err(ApiError::NotFound(format!(
            "Unknown voice: {}",
            request.voice_id
        )));
    }

    let clip = state
        .synthesizer
        .synthesize(&request.text, &request.voice_id, &request.output_file_name)
        .await
        .map_err(|err| match err {
            SynthesisError::ModelMissing(path) => {
                warn!(path = %path.display(), "Configured voice has no model on disk");
                ApiError::internal("Text-to-speech conversion failed", "voice model missing")
            }
            other => ApiError::internal("Text-to-speech conversion failed", other),
        })?;
    debug!(path = %clip.display(), "Clip ready");

    Ok(Json(SynthesisResponse {
        audio_url: format!("/audio/{}.wav", request.output_file_name),
    }))
}

pub(super) async fn serve_audio(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !catalog::is_plain_file_name(&file) {
        return Err(ApiError::BadRequest(format!("Invalid filename: {file}")));
    }
    // Only clips are served; digest sidecars share the directory.
    if !file.to_ascii_lowercase().ends_with(".wav") {
        return Err(ApiError::NotFound(format!("Audio not found: {file}")));
    }
    let path = state.config.audio_dir().join(&file);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("Audio not found: {file}")));
        }
        Err(err) => return Err(ApiError::internal("Failed to read audio", err)),
    };
    Ok(([(header::CONTENT_TYPE, "audio/wav")], bytes))
}

pub(super) async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

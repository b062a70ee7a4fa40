//! JSON shapes exchanged between the narrator server and the reader client.

use serde::{Deserialize, Serialize};

pub use crate::config::VoiceEntry as Voice;

/// Catalog entry for one file in the ebook directory. Identity is `filename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ebook {
    pub filename: String,
    pub title: String,
}

/// Body of `GET /api/extract-text/{filename}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub title: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice_id: String,
    #[serde(default)]
    pub output_file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResponse {
    pub audio_url: String,
}

/// Push notification sent over `/ws`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum LiveEvent {
    NewEbook { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

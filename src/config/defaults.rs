use crate::config::{LogLevel, VoiceEntry};

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    3000
}

pub(crate) fn default_ebooks_dir() -> String {
    "/ebooks".to_string()
}

pub(crate) fn default_audio_dir() -> String {
    "public/audio".to_string()
}

pub(crate) fn default_temp_dir() -> String {
    "temp".to_string()
}

pub(crate) fn default_watch_interval_secs() -> f32 {
    2.0
}

pub(crate) fn default_extract_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_tts_command() -> Vec<String> {
    vec!["python3".to_string(), "-m".to_string(), "piper".to_string()]
}

pub(crate) fn default_tts_voices_dir() -> String {
    "/app/piper/voices".to_string()
}

pub(crate) fn default_tts_timeout_secs() -> u64 {
    300
}

pub(crate) fn default_server_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_synthesis_timeout_secs() -> u64 {
    330
}

pub(crate) fn default_speed() -> f32 {
    1.0
}

pub(crate) fn default_reconnect_delay_secs() -> u64 {
    5
}

pub(crate) fn default_log_level() -> LogLevel {
    LogLevel::Info
}

pub(crate) fn default_voices() -> Vec<VoiceEntry> {
    [
        ("en-us-libritts-high", "English (US) - LibriTTS", "en-US"),
        ("it-riccardo-x-low", "Italiano - Riccardo", "it-IT"),
        ("fr-siwis-medium", "Français - SIWIS", "fr-FR"),
        ("de-thorsten-medium", "Deutsch - Thorsten", "de-DE"),
        ("es-carlfm-x-low", "Español - CarlfM", "es-ES"),
    ]
    .into_iter()
    .map(|(id, name, language)| VoiceEntry {
        id: id.to_string(),
        name: name.to_string(),
        language: language.to_string(),
    })
    .collect()
}

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Flat application configuration; deserialized from the sectioned TOML in `tables`.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_host")]
    pub host: String,
    #[serde(default = "crate::config::defaults::default_port")]
    pub port: u16,
    #[serde(default = "crate::config::defaults::default_ebooks_dir")]
    pub ebooks_dir: String,
    #[serde(default = "crate::config::defaults::default_audio_dir")]
    pub audio_dir: String,
    #[serde(default = "crate::config::defaults::default_temp_dir")]
    pub temp_dir: String,
    #[serde(default = "crate::config::defaults::default_watch_interval_secs")]
    pub watch_interval_secs: f32,
    #[serde(default)]
    pub extract_command: Vec<String>,
    #[serde(default = "crate::config::defaults::default_extract_timeout_secs")]
    pub extract_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_tts_command")]
    pub tts_command: Vec<String>,
    #[serde(default = "crate::config::defaults::default_tts_voices_dir")]
    pub tts_voices_dir: String,
    #[serde(default = "crate::config::defaults::default_tts_timeout_secs")]
    pub tts_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_server_url")]
    pub server_url: String,
    #[serde(default = "crate::config::defaults::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_synthesis_timeout_secs")]
    pub synthesis_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_speed")]
    pub default_speed: f32,
    #[serde(default = "crate::config::defaults::default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_voices")]
    pub voices: Vec<VoiceEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: crate::config::defaults::default_host(),
            port: crate::config::defaults::default_port(),
            ebooks_dir: crate::config::defaults::default_ebooks_dir(),
            audio_dir: crate::config::defaults::default_audio_dir(),
            temp_dir: crate::config::defaults::default_temp_dir(),
            watch_interval_secs: crate::config::defaults::default_watch_interval_secs(),
            extract_command: Vec::new(),
            extract_timeout_secs: crate::config::defaults::default_extract_timeout_secs(),
            tts_command: crate::config::defaults::default_tts_command(),
            tts_voices_dir: crate::config::defaults::default_tts_voices_dir(),
            tts_timeout_secs: crate::config::defaults::default_tts_timeout_secs(),
            server_url: crate::config::defaults::default_server_url(),
            request_timeout_secs: crate::config::defaults::default_request_timeout_secs(),
            synthesis_timeout_secs: crate::config::defaults::default_synthesis_timeout_secs(),
            default_speed: crate::config::defaults::default_speed(),
            reconnect_delay_secs: crate::config::defaults::default_reconnect_delay_secs(),
            log_level: crate::config::defaults::default_log_level(),
            voices: crate::config::defaults::default_voices(),
        }
    }
}

impl AppConfig {
    pub fn ebooks_dir(&self) -> PathBuf {
        PathBuf::from(&self.ebooks_dir)
    }

    pub fn audio_dir(&self) -> PathBuf {
        PathBuf::from(&self.audio_dir)
    }

    pub fn temp_dir(&self) -> PathBuf {
        PathBuf::from(&self.temp_dir)
    }

    pub fn voices_dir(&self) -> PathBuf {
        PathBuf::from(&self.tts_voices_dir)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.watch_interval_secs.max(0.1)).unwrap_or_else(|_| {
            Duration::from_secs_f32(crate::config::defaults::default_watch_interval_secs())
        })
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs.max(1))
    }

    pub fn tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs.max(1))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs.max(1))
    }
}

/// A configured Piper voice, exposed verbatim by `GET /api/voices`.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq, Eq)]
pub struct VoiceEntry {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

use super::defaults;
use super::models::{AppConfig, LogLevel, VoiceEntry};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    extract: ExtractConfig,
    #[serde(default)]
    tts: TtsConfig,
    #[serde(default)]
    client: ClientConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default = "defaults::default_voices")]
    voices: Vec<VoiceEntry>,
}

impl Default for ConfigTables {
    fn default() -> Self {
        ConfigTables {
            server: ServerConfig::default(),
            extract: ExtractConfig::default(),
            tts: TtsConfig::default(),
            client: ClientConfig::default(),
            logging: LoggingConfig::default(),
            voices: defaults::default_voices(),
        }
    }
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            host: tables.server.host,
            port: tables.server.port,
            ebooks_dir: tables.server.ebooks_dir,
            audio_dir: tables.server.audio_dir,
            temp_dir: tables.server.temp_dir,
            watch_interval_secs: tables.server.watch_interval_secs,
            extract_command: tables.extract.command,
            extract_timeout_secs: tables.extract.timeout_secs,
            tts_command: tables.tts.command,
            tts_voices_dir: tables.tts.voices_dir,
            tts_timeout_secs: tables.tts.timeout_secs,
            server_url: tables.client.server_url,
            request_timeout_secs: tables.client.request_timeout_secs,
            synthesis_timeout_secs: tables.client.synthesis_timeout_secs,
            default_speed: tables.client.default_speed,
            reconnect_delay_secs: tables.client.reconnect_delay_secs,
            log_level: tables.logging.log_level,
            voices: tables.voices,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            server: ServerConfig {
                host: config.host.clone(),
                port: config.port,
                ebooks_dir: config.ebooks_dir.clone(),
                audio_dir: config.audio_dir.clone(),
                temp_dir: config.temp_dir.clone(),
                watch_interval_secs: config.watch_interval_secs,
            },
            extract: ExtractConfig {
                command: config.extract_command.clone(),
                timeout_secs: config.extract_timeout_secs,
            },
            tts: TtsConfig {
                command: config.tts_command.clone(),
                voices_dir: config.tts_voices_dir.clone(),
                timeout_secs: config.tts_timeout_secs,
            },
            client: ClientConfig {
                server_url: config.server_url.clone(),
                request_timeout_secs: config.request_timeout_secs,
                synthesis_timeout_secs: config.synthesis_timeout_secs,
                default_speed: config.default_speed,
                reconnect_delay_secs: config.reconnect_delay_secs,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            voices: config.voices.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ServerConfig {
    #[serde(default = "defaults::default_host")]
    host: String,
    #[serde(default = "defaults::default_port")]
    port: u16,
    #[serde(default = "defaults::default_ebooks_dir")]
    ebooks_dir: String,
    #[serde(default = "defaults::default_audio_dir")]
    audio_dir: String,
    #[serde(default = "defaults::default_temp_dir")]
    temp_dir: String,
    #[serde(default = "defaults::default_watch_interval_secs")]
    watch_interval_secs: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: defaults::default_host(),
            port: defaults::default_port(),
            ebooks_dir: defaults::default_ebooks_dir(),
            audio_dir: defaults::default_audio_dir(),
            temp_dir: defaults::default_temp_dir(),
            watch_interval_secs: defaults::default_watch_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ExtractConfig {
    #[serde(default)]
    command: Vec<String>,
    #[serde(default = "defaults::default_extract_timeout_secs")]
    timeout_secs: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            command: Vec::new(),
            timeout_secs: defaults::default_extract_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TtsConfig {
    #[serde(default = "defaults::default_tts_command")]
    command: Vec<String>,
    #[serde(default = "defaults::default_tts_voices_dir")]
    voices_dir: String,
    #[serde(default = "defaults::default_tts_timeout_secs")]
    timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        TtsConfig {
            command: defaults::default_tts_command(),
            voices_dir: defaults::default_tts_voices_dir(),
            timeout_secs: defaults::default_tts_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ClientConfig {
    #[serde(default = "defaults::default_server_url")]
    server_url: String,
    #[serde(default = "defaults::default_request_timeout_secs")]
    request_timeout_secs: u64,
    #[serde(default = "defaults::default_synthesis_timeout_secs")]
    synthesis_timeout_secs: u64,
    #[serde(default = "defaults::default_speed")]
    default_speed: f32,
    #[serde(default = "defaults::default_reconnect_delay_secs")]
    reconnect_delay_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: defaults::default_server_url(),
            request_timeout_secs: defaults::default_request_timeout_secs(),
            synthesis_timeout_secs: defaults::default_synthesis_timeout_secs(),
            default_speed: defaults::default_speed(),
            reconnect_delay_secs: defaults::default_reconnect_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

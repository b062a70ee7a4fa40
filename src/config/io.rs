use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("Parsing config tables")?;
    Ok(tables.into())
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("Serializing config tables")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.ebooks_dir, "/ebooks");
        assert_eq!(cfg.voices.len(), 5);
        assert_eq!(cfg.voices[0].id, "en-us-libritts-high");
        assert!(cfg.extract_command.is_empty());
    }

    #[test]
    fn sections_map_onto_flat_config() {
        let cfg = parse_config(
            r#"
[server]
port = 8080
ebooks_dir = "/srv/books"

[tts]
command = ["piper"]
timeout_secs = 10

[logging]
log_level = "debug"

[[voices]]
id = "demo"
name = "Demo"
language = "en-GB"
"#,
        )
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.ebooks_dir, "/srv/books");
        assert_eq!(cfg.tts_command, vec!["piper".to_string()]);
        assert_eq!(cfg.tts_timeout_secs, 10);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.voices.len(), 1);
        assert_eq!(cfg.voices[0].language, "en-GB");
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut cfg = AppConfig::default();
        cfg.port = 4242;
        cfg.default_speed = 1.5;
        let text = serialize_config(&cfg).unwrap();
        let parsed = parse_config(&text).unwrap();
        assert_eq!(parsed.port, 4242);
        assert!((parsed.default_speed - 1.5).abs() < f32::EPSILON);
        assert_eq!(parsed.voices, cfg.voices);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.toml"));
        assert_eq!(cfg.port, 3000);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();
        let cfg = load_config(&path);
        assert_eq!(cfg.port, 3000);
    }

    #[test]
    fn watch_interval_survives_out_of_range_values() {
        let cfg = parse_config("[server]\nwatch_interval_secs = inf\n").unwrap();
        assert_eq!(cfg.watch_interval(), std::time::Duration::from_secs(2));

        let cfg = parse_config("[server]\nwatch_interval_secs = 0.0\n").unwrap();
        assert!(cfg.watch_interval() >= std::time::Duration::from_millis(99));
    }
}

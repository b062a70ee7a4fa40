//! Entry point for the ebook narrator.
//!
//! - `serve` runs the HTTP/WebSocket server over an ebook directory.
//! - `read` runs the terminal reader against a running server.
//! - `config` prints the effective configuration as TOML.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ebook_narrator::config::{AppConfig, DEFAULT_CONFIG_PATH, load_config, serialize_config};
use ebook_narrator::{client, server};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

#[derive(Debug, Parser)]
#[command(name = "ebook-narrator", version, about = "Narrate ebooks section by section")]
struct Cli {
    /// Configuration file; missing or invalid files fall back to defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Serve the library, text extraction and speech synthesis.
    Serve {
        #[arg(long, env = "PORT")]
        port: Option<u16>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long, env = "EBOOKS_DIR")]
        ebooks_dir: Option<String>,
    },
    /// Read ebooks aloud from a running server.
    Read {
        #[arg(long, env = "NARRATOR_SERVER")]
        server: Option<String>,
        /// Voice to select once the voice list arrives.
        #[arg(long)]
        voice: Option<String>,
        #[arg(long)]
        speed: Option<f32>,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle).await {
        error!("{err:?}");
        std::process::exit(1);
    }
}

async fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config);
    set_log_level(reload_handle, config.log_level.as_filter_str());

    match cli.command {
        Mode::Serve {
            port,
            host,
            ebooks_dir,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(dir) = ebooks_dir {
                config.ebooks_dir = dir;
            }
            log_server_config(&config);
            server::serve(config).await.context("Server stopped with an error")
        }
        Mode::Read {
            server,
            voice,
            speed,
        } => {
            if let Some(server) = server {
                config.server_url = server;
            }
            if let Some(speed) = speed {
                config.default_speed = speed;
            }
            info!(
                server = %config.server_url,
                speed = config.default_speed,
                level = %config.log_level,
                "Starting reader"
            );
            client::run(config, voice).await
        }
        Mode::Config => {
            print!("{}", serialize_config(&config)?);
            Ok(())
        }
    }
}

fn log_server_config(config: &AppConfig) {
    info!(
        ebooks = %config.ebooks_dir,
        audio = %config.audio_dir,
        voices_dir = %config.tts_voices_dir,
        tts = ?config.tts_command,
        extract = ?config.extract_command,
        level = %config.log_level,
        "Active server configuration"
    );
    if config.voices.is_empty() {
        warn!("No voices configured; synthesis requests will be rejected");
    }
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}

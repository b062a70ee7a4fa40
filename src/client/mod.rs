//! Terminal reader: drives the playback controller from stdin commands,
//! server responses and live library events.

mod api;
mod input;
mod live;
mod runtime;

pub use api::ApiClient;
pub use input::{Command, Target, parse};
pub use live::parse_event;

use crate::app::{Controller, Message};
use crate::audio;
use crate::cancellation::CancellationToken;
use crate::config::AppConfig;
use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const TICK: Duration = Duration::from_millis(200);

/// Run the interactive reader against `config.server_url` until `quit` or
/// end of input.
pub async fn run(config: AppConfig, preferred_voice: Option<String>) -> Result<()> {
    let api = ApiClient::new(
        &config.server_url,
        config.request_timeout(),
        config.synthesis_timeout(),
    )?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let token = CancellationToken::new();

    let ws_url = api.ws_url()?;
    tokio::spawn(live::listen(
        ws_url,
        tx.clone(),
        config.reconnect_delay(),
        token.clone(),
    ));

    let mut controller = Controller::new(
        audio::default_backend(),
        config.default_speed,
        preferred_voice,
    );
    info!(server = %config.server_url, "Reader started");
    for effect in controller.bootstrap() {
        runtime::spawn_effect(&api, effect, &tx);
    }
    println!("{}", input::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_status = String::new();

    loop {
        let message = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                match input::parse(&line) {
                    Ok(input::Command::Quit) => break,
                    Ok(input::Command::Help) => {
                        println!("{}", input::HELP);
                        continue;
                    }
                    Ok(command) => match input::resolve(command, &controller) {
                        Ok(Some(message)) => message,
                        Ok(None) => {
                            redraw(&controller, &mut last_status);
                            continue;
                        }
                        Err(err) => {
                            println!("{err}");
                            continue;
                        }
                    },
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                }
            }
            Some(message) = rx.recv() => message,
            _ = ticker.tick() => Message::Tick,
        };

        let is_tick = matches!(message, Message::Tick);
        for effect in controller.reduce(message) {
            runtime::spawn_effect(&api, effect, &tx);
        }
        if is_tick {
            let status = controller.status_line();
            if status != last_status {
                print!("\r{status}  ");
                if let Err(err) = std::io::stdout().flush() {
                    warn!("Failed to flush status line: {err}");
                }
                last_status = status;
            }
        } else {
            redraw(&controller, &mut last_status);
        }
    }

    token.cancel();
    controller.reduce(Message::Stop);
    info!("Reader stopped");
    Ok(())
}

fn redraw(controller: &Controller, last_status: &mut String) {
    println!("\n{}", controller.render());
    *last_status = controller.status_line();
}

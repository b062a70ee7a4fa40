//! Line commands typed at the reader prompt.

use crate::app::{Controller, Message};

pub const HELP: &str = "\
commands:
  list | ls               show the library
  search <text>           filter the library (empty clears)
  open <n|filename>       open an ebook and start narrating
  voices                  show available voices
  voice <n|id>            switch narration voice
  play | pause | toggle   transport (space toggles too)
  stop                    pause and rewind the section
  next | prev             move between sections
  speed <0.5-3.0>         playback speed
  seek <0-100>            jump within the section, in percent
  refresh                 reload the library
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Search(String),
    Open(Target),
    Voices,
    Voice(Target),
    Play,
    Pause,
    Toggle,
    Stop,
    Next,
    Prev,
    Speed(f32),
    Seek(f64),
    Refresh,
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Command, String> {
    if line.trim().is_empty() && line.contains(' ') {
        return Ok(Command::Toggle);
    }
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "list" | "ls" => Command::List,
        "search" | "/" => Command::Search(rest.to_string()),
        "open" | "o" => Command::Open(target(rest, "open")?),
        "voices" => Command::Voices,
        "voice" | "v" => Command::Voice(target(rest, "voice")?),
        "play" | "p" => Command::Play,
        "pause" => Command::Pause,
        "toggle" | "t" => Command::Toggle,
        "stop" | "s" => Command::Stop,
        "next" | "n" => Command::Next,
        "prev" | "b" => Command::Prev,
        "speed" => Command::Speed(
            rest.parse::<f32>()
                .map_err(|_| format!("speed expects a number, got {rest:?}"))?,
        ),
        "seek" => {
            let percent = rest
                .trim_end_matches('%')
                .parse::<f64>()
                .map_err(|_| format!("seek expects a percentage, got {rest:?}"))?;
            Command::Seek(percent / 100.0)
        }
        "refresh" | "r" => Command::Refresh,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "" => return Err("empty command".to_string()),
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };
    Ok(command)
}

fn target(rest: &str, command: &str) -> Result<Target, String> {
    if rest.is_empty() {
        return Err(format!("{command} needs a number or a name"));
    }
    match rest.parse::<usize>() {
        Ok(0) => Err("numbers start at 1".to_string()),
        Ok(n) => Ok(Target::Index(n - 1)),
        Err(_) => Ok(Target::Name(rest.to_string())),
    }
}

/// Map a command onto a controller message. `Ok(None)` means the command is
/// handled by the prompt itself (listing, help, quitting).
pub fn resolve(command: Command, controller: &Controller) -> Result<Option<Message>, String> {
    let message = match command {
        Command::List | Command::Voices | Command::Help | Command::Quit => return Ok(None),
        Command::Search(query) => Message::SearchChanged(query),
        Command::Open(Target::Index(idx)) => {
            let visible = controller.visible_ebooks();
            let ebook = visible
                .get(idx)
                .ok_or_else(|| format!("no ebook #{} in the list", idx + 1))?;
            Message::SelectEbook(ebook.filename.clone())
        }
        Command::Open(Target::Name(name)) => Message::SelectEbook(name),
        Command::Voice(Target::Index(idx)) => {
            let voice = controller
                .voices()
                .get(idx)
                .ok_or_else(|| format!("no voice #{}", idx + 1))?;
            Message::SelectVoice(voice.id.clone())
        }
        Command::Voice(Target::Name(id)) => Message::SelectVoice(id),
        Command::Play => Message::Play,
        Command::Pause => Message::Pause,
        Command::Toggle => Message::TogglePlayPause,
        Command::Stop => Message::Stop,
        Command::Next => Message::NextSection,
        Command::Prev => Message::PrevSection,
        Command::Speed(speed) => Message::SetSpeed(speed),
        Command::Seek(fraction) => Message::Seek(fraction),
        Command::Refresh => Message::RefreshCatalog,
    };
    Ok(Some(message))
}

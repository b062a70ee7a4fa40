use crate::audio::{AudioBackend, AudioHandle};
use crate::protocol::{Ebook, Voice};
use std::time::Duration;

pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingText,
    Synthesizing,
    ReadyPaused,
    ReadyPlaying,
    /// Display-only; the next user action retries.
    Error,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::LoadingText => "loading text",
            Phase::Synthesizing => "synthesizing",
            Phase::ReadyPaused => "paused",
            Phase::ReadyPlaying => "playing",
            Phase::Error => "error",
        }
    }
}

/// The ebook being narrated. `sections` is never empty and
/// `current < sections.len()` always holds.
pub struct PlaybackSession {
    pub(in crate::app) filename: String,
    pub(in crate::app) title: String,
    pub(in crate::app) sections: Vec<String>,
    pub(in crate::app) current: usize,
    pub(in crate::app) handle: Option<Box<dyn AudioHandle>>,
}

impl PlaybackSession {
    pub(in crate::app) fn new(filename: String, title: String, sections: Vec<String>) -> Self {
        Self {
            filename,
            title,
            sections,
            current: 0,
            handle: None,
        }
    }

    pub(in crate::app) fn last_index(&self) -> usize {
        self.sections.len().saturating_sub(1)
    }

    pub(in crate::app) fn current_text(&self) -> &str {
        self.sections
            .get(self.current)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Stop and drop the installed handle, if any.
    pub(in crate::app) fn release_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(in crate::app) struct PendingExtraction {
    pub(in crate::app) request_id: u64,
    pub(in crate::app) filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(in crate::app) struct PendingSynthesis {
    pub(in crate::app) request_id: u64,
    pub(in crate::app) filename: String,
    pub(in crate::app) section: usize,
    pub(in crate::app) voice_id: String,
}

/// Reader state; mutated only through [`Controller::reduce`].
pub struct Controller {
    pub(in crate::app) backend: Box<dyn AudioBackend>,
    pub(in crate::app) ebooks: Vec<Ebook>,
    pub(in crate::app) voices: Vec<Voice>,
    pub(in crate::app) catalog_error: Option<String>,
    pub(in crate::app) voices_error: Option<String>,
    pub(in crate::app) search: String,
    pub(in crate::app) preferred_voice: Option<String>,
    pub(in crate::app) selected_voice: Option<String>,
    pub(in crate::app) speed: f32,
    pub(in crate::app) session: Option<PlaybackSession>,
    pub(in crate::app) phase: Phase,
    pub(in crate::app) notice: Option<String>,
    pub(in crate::app) request_id: u64,
    pub(in crate::app) pending_extraction: Option<PendingExtraction>,
    pub(in crate::app) pending_synthesis: Option<PendingSynthesis>,
    pub(in crate::app) resume_after_synthesis: bool,
    pub(in crate::app) catalog_request_id: u64,
    pub(in crate::app) catalog_in_flight: bool,
    pub(in crate::app) catalog_dirty: bool,
}

impl Controller {
    pub fn new(backend: Box<dyn AudioBackend>, speed: f32, preferred_voice: Option<String>) -> Self {
        Self {
            backend,
            ebooks: Vec::new(),
            voices: Vec::new(),
            catalog_error: None,
            voices_error: None,
            search: String::new(),
            preferred_voice,
            selected_voice: None,
            speed: clamp_speed(speed).unwrap_or(1.0),
            session: None,
            phase: Phase::Idle,
            notice: None,
            request_id: 0,
            pending_extraction: None,
            pending_synthesis: None,
            resume_after_synthesis: true,
            catalog_request_id: 0,
            catalog_in_flight: false,
            catalog_dirty: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn selected_voice(&self) -> Option<&str> {
        self.selected_voice.as_deref()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn current_section(&self) -> Option<usize> {
        self.session.as_ref().map(|session| session.current)
    }

    pub fn section_count(&self) -> usize {
        self.session
            .as_ref()
            .map(|session| session.sections.len())
            .unwrap_or(0)
    }

    pub fn current_ebook(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.filename.as_str())
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Ebooks matching the search filter on title or filename, case-insensitively.
    pub fn visible_ebooks(&self) -> Vec<&Ebook> {
        let needle = self.search.trim().to_lowercase();
        self.ebooks
            .iter()
            .filter(|ebook| {
                needle.is_empty()
                    || ebook.title.to_lowercase().contains(&needle)
                    || ebook.filename.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// `(position, duration)` of the installed clip.
    pub fn progress(&self) -> Option<(Duration, Option<Duration>)> {
        let handle = self.session.as_ref()?.handle.as_ref()?;
        Some((handle.position(), handle.duration()))
    }

    pub(in crate::app) fn next_request_id(&mut self) -> u64 {
        self.request_id = self.request_id.wrapping_add(1);
        self.request_id
    }
}

pub(in crate::app) fn clamp_speed(speed: f32) -> Option<f32> {
    speed
        .is_finite()
        .then(|| speed.clamp(MIN_SPEED, MAX_SPEED))
}

//! Loading an ebook and turning its current section into an installed clip.
//!
//! Every extraction and synthesis request takes a fresh id from the shared
//! counter. A response is applied only while it is still the pending request
//! for the same ebook, section and voice; anything else is dropped quietly.

use super::super::state::{Controller, PendingExtraction, PendingSynthesis, Phase, PlaybackSession};
use super::{Effect, output_name};
use crate::audio::AudioClip;
use crate::protocol::ExtractedText;
use tracing::{debug, info, warn};

impl Controller {
    pub(super) fn handle_select_ebook(&mut self, filename: String, effects: &mut Vec<Effect>) {
        // The old session keeps its sections until the new text arrives, but
        // nothing may keep playing or land on it meanwhile.
        if let Some(session) = self.session.as_mut() {
            session.release_handle();
        }
        self.pending_synthesis = None;

        let request_id = self.next_request_id();
        self.pending_extraction = Some(PendingExtraction {
            request_id,
            filename: filename.clone(),
        });
        self.phase = Phase::LoadingText;
        self.notice = None;
        info!(file = %filename, request_id, "Loading ebook text");
        effects.push(Effect::ExtractText {
            request_id,
            filename,
        });
    }

    pub(super) fn handle_text_extracted(
        &mut self,
        request_id: u64,
        filename: String,
        result: Result<ExtractedText, String>,
        effects: &mut Vec<Effect>,
    ) {
        let expected = PendingExtraction {
            request_id,
            filename: filename.clone(),
        };
        if self.pending_extraction.as_ref() != Some(&expected) {
            debug!(request_id, file = %filename, "Ignoring stale extraction response");
            return;
        }
        self.pending_extraction = None;

        let extracted = match result {
            Ok(extracted) if extracted.sections.is_empty() => {
                Err(format!("{filename} contains no readable text"))
            }
            Ok(extracted) => Ok(extracted),
            Err(err) => Err(format!("Could not load {filename}: {err}")),
        };
        let ExtractedText { title, sections } = match extracted {
            Ok(extracted) => extracted,
            Err(notice) => {
                warn!(file = %filename, "{notice}");
                self.phase = Phase::Error;
                self.notice = Some(notice);
                return;
            }
        };

        info!(file = %filename, sections = sections.len(), "Ebook ready");
        if let Some(mut previous) = self.session.take() {
            previous.release_handle();
        }
        self.session = Some(PlaybackSession::new(filename, title, sections));
        self.request_synthesis(true, effects);
    }

    /// Drop the current clip and ask for the current section in the selected
    /// voice. `autoplay` decides whether the arriving clip starts playing.
    pub(in crate::app) fn request_synthesis(&mut self, autoplay: bool, effects: &mut Vec<Effect>) {
        let Some(voice_id) = self.selected_voice.clone() else {
            if let Some(session) = self.session.as_mut() {
                session.release_handle();
            }
            self.pending_synthesis = None;
            self.phase = Phase::Error;
            self.notice = Some("No voice available for narration".to_string());
            return;
        };
        let request_id = self.next_request_id();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.release_handle();

        let section = session.current;
        let pending = PendingSynthesis {
            request_id,
            filename: session.filename.clone(),
            section,
            voice_id: voice_id.clone(),
        };
        let effect = Effect::Synthesize {
            request_id,
            filename: session.filename.clone(),
            section,
            voice_id: voice_id.clone(),
            text: session.current_text().to_string(),
            output_name: output_name(&session.filename, section, &voice_id),
        };
        info!(
            file = %session.filename,
            section,
            voice = %voice_id,
            request_id,
            "Requesting section audio"
        );

        self.pending_synthesis = Some(pending);
        self.resume_after_synthesis = autoplay;
        self.phase = Phase::Synthesizing;
        self.notice = None;
        effects.push(effect);
    }

    pub(super) fn handle_speech_synthesized(
        &mut self,
        request_id: u64,
        filename: String,
        section: usize,
        voice_id: String,
        result: Result<AudioClip, String>,
    ) {
        let expected = PendingSynthesis {
            request_id,
            filename,
            section,
            voice_id,
        };
        if self.pending_synthesis.as_ref() != Some(&expected) {
            debug!(
                request_id,
                section,
                current = self.request_id,
                "Ignoring stale synthesis response"
            );
            return;
        }
        self.pending_synthesis = None;

        let clip = match result {
            Ok(clip) => clip,
            Err(err) => {
                warn!(section, "Synthesis failed: {err}");
                self.phase = Phase::Error;
                self.notice = Some(format!("Narration failed for section {}: {err}", section + 1));
                return;
            }
        };

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.release_handle();
        let mut handle = match self.backend.open(&clip, self.speed) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(url = %clip.url, "Could not open clip: {err:#}");
                self.phase = Phase::Error;
                self.notice = Some(format!("Could not play section {}: {err}", section + 1));
                return;
            }
        };
        if self.resume_after_synthesis {
            handle.play();
            self.phase = Phase::ReadyPlaying;
        } else {
            self.phase = Phase::ReadyPaused;
        }
        debug!(section, url = %clip.url, phase = ?self.phase, "Installed section clip");
        session.handle = Some(handle);
    }
}

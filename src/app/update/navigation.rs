use super::super::state::{Controller, Phase};
use super::Effect;
use tracing::{debug, info};

impl Controller {
    pub(super) fn handle_next_section(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == Phase::LoadingText {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.current >= session.last_index() {
            debug!(section = session.current, "Already at the last section");
            return;
        }
        session.current += 1;
        self.request_synthesis(true, effects);
    }

    pub(super) fn handle_prev_section(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == Phase::LoadingText {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.current == 0 {
            debug!("Already at the first section");
            return;
        }
        session.current -= 1;
        self.request_synthesis(true, effects);
    }

    pub(super) fn handle_select_voice(&mut self, voice_id: String, effects: &mut Vec<Effect>) {
        if !self.voices.iter().any(|voice| voice.id == voice_id) {
            self.notice = Some(format!("Unknown voice: {voice_id}"));
            return;
        }
        if self.selected_voice.as_deref() == Some(voice_id.as_str()) {
            return;
        }
        info!(voice = %voice_id, "Voice selected");
        self.selected_voice = Some(voice_id);
        if self.session.is_some() && self.phase != Phase::LoadingText {
            self.request_synthesis(true, effects);
        }
    }
}

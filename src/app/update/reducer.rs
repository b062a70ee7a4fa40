use super::super::messages::Message;
use super::super::state::Controller;
use super::Effect;

impl Controller {
    /// Initial loads issued when the reader starts.
    pub fn bootstrap(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.handle_refresh_catalog(&mut effects);
        effects.push(Effect::LoadVoices);
        effects
    }

    pub fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::RefreshCatalog => self.handle_refresh_catalog(&mut effects),
            Message::SearchChanged(query) => self.handle_search_changed(query),
            Message::SelectEbook(filename) => self.handle_select_ebook(filename, &mut effects),
            Message::SelectVoice(voice_id) => self.handle_select_voice(voice_id, &mut effects),
            Message::Play => self.handle_play(&mut effects),
            Message::Pause => self.handle_pause(),
            Message::TogglePlayPause => self.handle_toggle_play_pause(&mut effects),
            Message::Stop => self.handle_stop(),
            Message::NextSection => self.handle_next_section(&mut effects),
            Message::PrevSection => self.handle_prev_section(&mut effects),
            Message::SetSpeed(speed) => self.handle_set_speed(speed),
            Message::Seek(fraction) => self.handle_seek(fraction),
            Message::EbooksLoaded { request_id, result } => {
                self.handle_ebooks_loaded(request_id, result, &mut effects)
            }
            Message::VoicesLoaded { result } => self.handle_voices_loaded(result),
            Message::TextExtracted {
                request_id,
                filename,
                result,
            } => self.handle_text_extracted(request_id, filename, result, &mut effects),
            Message::SpeechSynthesized {
                request_id,
                filename,
                section,
                voice_id,
                result,
            } => self.handle_speech_synthesized(request_id, filename, section, voice_id, result),
            Message::EbookDiscovered { path } => self.handle_ebook_discovered(path, &mut effects),
            Message::LiveConnected => self.handle_refresh_catalog(&mut effects),
            Message::Tick => self.handle_tick(&mut effects),
        }

        effects
    }
}

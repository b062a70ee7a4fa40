use super::super::state::Controller;
use super::Effect;
use crate::protocol::{Ebook, Voice};
use tracing::{debug, info, warn};

impl Controller {
    /// Refreshes never overlap: a request made while one is in flight is
    /// remembered and issued when the current one lands.
    pub(super) fn handle_refresh_catalog(&mut self, effects: &mut Vec<Effect>) {
        if self.voices.is_empty() && self.voices_error.take().is_some() {
            effects.push(Effect::LoadVoices);
        }
        if self.catalog_in_flight {
            self.catalog_dirty = true;
            return;
        }
        self.catalog_request_id = self.catalog_request_id.wrapping_add(1);
        self.catalog_in_flight = true;
        effects.push(Effect::LoadEbooks {
            request_id: self.catalog_request_id,
        });
    }

    pub(super) fn handle_search_changed(&mut self, query: String) {
        self.search = query;
    }

    pub(super) fn handle_ebooks_loaded(
        &mut self,
        request_id: u64,
        result: Result<Vec<Ebook>, String>,
        effects: &mut Vec<Effect>,
    ) {
        if request_id != self.catalog_request_id {
            debug!(
                request_id,
                current = self.catalog_request_id,
                "Ignoring stale catalog response"
            );
            return;
        }
        self.catalog_in_flight = false;
        match result {
            Ok(ebooks) => {
                info!(count = ebooks.len(), "Catalog refreshed");
                self.ebooks = ebooks;
                self.catalog_error = None;
            }
            Err(err) => {
                warn!("Catalog refresh failed: {err}");
                self.ebooks.clear();
                self.catalog_error = Some(err);
            }
        }
        if self.catalog_dirty {
            self.catalog_dirty = false;
            self.handle_refresh_catalog(effects);
        }
    }

    pub(super) fn handle_voices_loaded(&mut self, result: Result<Vec<Voice>, String>) {
        match result {
            Ok(voices) => {
                self.voices = voices;
                self.voices_error = None;
                let still_listed = |id: &str| self.voices.iter().any(|voice| voice.id == id);
                let selected = self
                    .selected_voice
                    .clone()
                    .filter(|id| still_listed(id))
                    .or_else(|| self.preferred_voice.clone().filter(|id| still_listed(id)))
                    .or_else(|| self.voices.first().map(|voice| voice.id.clone()));
                if let Some(preferred) = &self.preferred_voice {
                    if !still_listed(preferred) {
                        warn!(voice = %preferred, "Requested voice is not offered by the server");
                    }
                }
                info!(count = self.voices.len(), selected = ?selected, "Voices loaded");
                self.selected_voice = selected;
            }
            Err(err) => {
                warn!("Loading voices failed: {err}");
                self.voices.clear();
                self.voices_error = Some(err);
            }
        }
    }

    pub(super) fn handle_ebook_discovered(&mut self, path: String, effects: &mut Vec<Effect>) {
        info!(path = %path, "Server reported a new ebook");
        self.handle_refresh_catalog(effects);
    }
}

use super::super::state::{Controller, Phase, clamp_speed};
use super::Effect;
use tracing::{debug, info, warn};

impl Controller {
    pub(super) fn handle_play(&mut self, effects: &mut Vec<Effect>) {
        match self.phase {
            Phase::ReadyPlaying | Phase::LoadingText => {}
            Phase::Synthesizing => self.resume_after_synthesis = true,
            Phase::Idle | Phase::ReadyPaused | Phase::Error => {
                let Some(session) = self.session.as_mut() else {
                    debug!("Play ignored without an open ebook");
                    return;
                };
                match session.handle.as_mut() {
                    Some(handle) => {
                        if handle.is_finished() {
                            if let Err(err) = handle.rewind() {
                                warn!("Rewinding finished clip failed: {err:#}");
                            }
                        }
                        handle.play();
                        self.phase = Phase::ReadyPlaying;
                        self.notice = None;
                    }
                    None => self.request_synthesis(true, effects),
                }
            }
        }
    }

    pub(super) fn handle_pause(&mut self) {
        match self.phase {
            Phase::ReadyPlaying => {
                if let Some(handle) = self.session.as_mut().and_then(|s| s.handle.as_mut()) {
                    handle.pause();
                }
                self.phase = Phase::ReadyPaused;
            }
            Phase::Synthesizing => self.resume_after_synthesis = false,
            _ => {}
        }
    }

    pub(super) fn handle_toggle_play_pause(&mut self, effects: &mut Vec<Effect>) {
        let playing = match self.phase {
            Phase::ReadyPlaying => true,
            Phase::Synthesizing => self.resume_after_synthesis,
            _ => false,
        };
        if playing {
            self.handle_pause();
        } else {
            self.handle_play(effects);
        }
    }

    pub(super) fn handle_stop(&mut self) {
        match self.phase {
            Phase::ReadyPlaying | Phase::ReadyPaused => {
                if let Some(handle) = self.session.as_mut().and_then(|s| s.handle.as_mut()) {
                    handle.pause();
                    if let Err(err) = handle.rewind() {
                        warn!("Rewinding on stop failed: {err:#}");
                    }
                }
                self.phase = Phase::ReadyPaused;
            }
            Phase::Synthesizing => self.resume_after_synthesis = false,
            _ => {}
        }
    }

    pub(super) fn handle_set_speed(&mut self, speed: f32) {
        let Some(speed) = clamp_speed(speed) else {
            warn!(speed, "Ignoring invalid playback speed");
            return;
        };
        self.speed = speed;
        if let Some(handle) = self.session.as_mut().and_then(|s| s.handle.as_mut()) {
            handle.set_speed(speed);
        }
        info!(speed, "Playback speed set");
    }

    pub(super) fn handle_seek(&mut self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let Some(handle) = self.session.as_mut().and_then(|s| s.handle.as_mut()) else {
            return;
        };
        let Some(duration) = handle.duration().filter(|d| !d.is_zero()) else {
            debug!("Seek ignored; clip length unknown");
            return;
        };
        let target = duration.mul_f64(fraction);
        if let Err(err) = handle.seek(target) {
            warn!(?target, "Seek failed: {err:#}");
        }
    }

    pub(super) fn handle_tick(&mut self, effects: &mut Vec<Effect>) {
        if self.phase != Phase::ReadyPlaying {
            return;
        }
        let finished = self
            .session
            .as_ref()
            .and_then(|s| s.handle.as_ref())
            .map(|handle| handle.is_finished())
            .unwrap_or(false);
        if finished {
            self.on_audio_ended(effects);
        }
    }

    fn on_audio_ended(&mut self, effects: &mut Vec<Effect>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.current >= session.last_index() {
            info!(file = %session.filename, "Reached the end of the ebook");
            self.phase = Phase::ReadyPaused;
            return;
        }
        session.current += 1;
        debug!(section = session.current, "Advancing to next section");
        self.request_synthesis(true, effects);
    }
}

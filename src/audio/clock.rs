//! Silent transport that advances a clock instead of driving a device.

use super::{AudioBackend, AudioClip, AudioHandle};
use anyhow::Result;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct ClockBackend;

impl AudioBackend for ClockBackend {
    fn open(&mut self, clip: &AudioClip, speed: f32) -> Result<Box<dyn AudioHandle>> {
        Ok(Box::new(ClockTransport::new(clip.duration(), speed)))
    }
}

/// Media position is `offset` plus wall time since `started`, scaled by speed.
#[derive(Debug, Clone)]
pub struct ClockTransport {
    duration: Option<Duration>,
    speed: f32,
    offset: Duration,
    started: Option<Instant>,
}

impl ClockTransport {
    pub fn new(duration: Option<Duration>, speed: f32) -> Self {
        Self {
            duration,
            speed,
            offset: Duration::ZERO,
            started: None,
        }
    }

    pub fn position_at(&self, now: Instant) -> Duration {
        let elapsed = self
            .started
            .map(|started| now.saturating_duration_since(started).mul_f32(self.speed))
            .unwrap_or_default();
        let position = self.offset + elapsed;
        match self.duration {
            Some(total) => position.min(total),
            None => position,
        }
    }

    fn freeze_at(&mut self, now: Instant) {
        self.offset = self.position_at(now);
        self.started = self.started.map(|_| now);
    }

    pub fn play_at(&mut self, now: Instant) {
        if self.started.is_none() {
            self.started = Some(now);
        }
    }

    pub fn pause_at(&mut self, now: Instant) {
        self.freeze_at(now);
        self.started = None;
    }

    pub fn set_speed_at(&mut self, speed: f32, now: Instant) {
        self.freeze_at(now);
        self.speed = speed;
    }

    pub fn seek_at(&mut self, position: Duration, now: Instant) {
        self.offset = match self.duration {
            Some(total) => position.min(total),
            None => position,
        };
        self.started = self.started.map(|_| now);
    }

    pub fn is_finished_at(&self, now: Instant) -> bool {
        self.duration
            .map(|total| self.position_at(now) >= total)
            .unwrap_or(false)
    }
}

impl AudioHandle for ClockTransport {
    fn play(&mut self) {
        self.play_at(Instant::now());
    }

    fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    fn rewind(&mut self) -> Result<()> {
        self.seek_at(Duration::ZERO, Instant::now());
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.seek_at(position, Instant::now());
        Ok(())
    }

    fn set_speed(&mut self, speed: f32) {
        self.set_speed_at(speed, Instant::now());
    }

    fn position(&self) -> Duration {
        self.position_at(Instant::now())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.started.is_some() && !self.is_finished()
    }

    fn is_finished(&self) -> bool {
        self.is_finished_at(Instant::now())
    }

    fn stop(self: Box<Self>) {}
}

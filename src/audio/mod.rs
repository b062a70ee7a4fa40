//! Audio transport behind the reader.
//!
//! The controller owns at most one [`AudioHandle`] at a time and talks to it
//! only through this trait, so a real output device and the headless clock
//! are interchangeable.

mod clock;
#[cfg(feature = "audio")]
mod rodio_backend;

pub use clock::{ClockBackend, ClockTransport};
#[cfg(feature = "audio")]
pub use rodio_backend::RodioBackend;

use anyhow::Result;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// A rendered section as fetched from the server.
#[derive(Clone)]
pub struct AudioClip {
    pub url: String,
    pub bytes: Arc<[u8]>,
}

impl AudioClip {
    pub fn new(url: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            bytes: bytes.into(),
        }
    }

    /// Length of the clip when it is a readable WAV.
    pub fn duration(&self) -> Option<Duration> {
        wav_duration(&self.bytes)
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("url", &self.url)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

pub fn wav_duration(bytes: &[u8]) -> Option<Duration> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).ok()?;
    let rate = reader.spec().sample_rate;
    if rate == 0 {
        return None;
    }
    Some(Duration::from_secs_f64(
        f64::from(reader.duration()) / f64::from(rate),
    ))
}

/// Creates playable handles for clips. Handles start paused at position zero.
pub trait AudioBackend {
    fn open(&mut self, clip: &AudioClip, speed: f32) -> Result<Box<dyn AudioHandle>>;
}

pub trait AudioHandle {
    fn play(&mut self);
    fn pause(&mut self);
    /// Move back to the start without changing play/pause state.
    fn rewind(&mut self) -> Result<()>;
    fn seek(&mut self, position: Duration) -> Result<()>;
    fn set_speed(&mut self, speed: f32);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn is_playing(&self) -> bool;
    /// True once playback reached the end of the clip.
    fn is_finished(&self) -> bool;
    /// Silence and release the handle.
    fn stop(self: Box<Self>);
}

/// The output device when built with `audio`, otherwise the headless clock.
pub fn default_backend() -> Box<dyn AudioBackend> {
    #[cfg(feature = "audio")]
    {
        match RodioBackend::new() {
            Ok(backend) => return Box::new(backend),
            Err(err) => {
                tracing::warn!("No audio output available, using silent transport: {err:#}");
            }
        }
    }
    Box::new(ClockBackend)
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Minimal mono 16-bit WAV of the given length.
    pub fn silent_wav(sample_rate: u32, samples: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..samples {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_duration_uses_header() {
        let clip = AudioClip::new("/audio/a.wav", test_support::silent_wav(8_000, 12_000));
        assert_eq!(clip.duration(), Some(Duration::from_millis(1_500)));
    }

    #[test]
    fn non_wav_has_unknown_duration() {
        let clip = AudioClip::new("/audio/a.mp3", b"ID3 not a wav".to_vec());
        assert_eq!(clip.duration(), None);
        assert!(format!("{clip:?}").contains("bytes: 13"));
    }
}

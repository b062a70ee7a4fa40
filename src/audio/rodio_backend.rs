//! Playback on the default output device.

use super::{AudioBackend, AudioClip, AudioHandle};
use anyhow::{Context, Result, anyhow};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct RodioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioBackend {
    pub fn new() -> Result<Self> {
        let (_stream, handle) = OutputStream::try_default().context("Opening audio output")?;
        Ok(Self { _stream, handle })
    }
}

impl AudioBackend for RodioBackend {
    fn open(&mut self, clip: &AudioClip, speed: f32) -> Result<Box<dyn AudioHandle>> {
        let sink = Sink::try_new(&self.handle).context("Creating sink")?;
        sink.pause();
        sink.set_speed(speed);
        let source = decode(&clip.bytes)?;
        let duration = clip.duration().or_else(|| source.total_duration());
        sink.append(source);
        debug!(url = %clip.url, ?duration, speed, "Opened clip on output device");
        Ok(Box::new(RodioPlayback {
            sink,
            bytes: clip.bytes.clone(),
            duration,
        }))
    }
}

fn decode(bytes: &Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>> {
    Decoder::new(Cursor::new(bytes.clone())).context("Decoding clip")
}

struct RodioPlayback {
    sink: Sink,
    bytes: Arc<[u8]>,
    duration: Option<Duration>,
}

impl RodioPlayback {
    /// A drained sink has nothing left to seek in; queue the clip again.
    fn reload_if_drained(&mut self) -> Result<()> {
        if self.sink.empty() {
            let paused = self.sink.is_paused();
            self.sink.clear();
            self.sink.append(decode(&self.bytes)?);
            if !paused {
                self.sink.play();
            }
        }
        Ok(())
    }
}

impl AudioHandle for RodioPlayback {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn rewind(&mut self) -> Result<()> {
        self.seek(Duration::ZERO)
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.reload_if_drained()?;
        self.sink
            .try_seek(position)
            .map_err(|err| anyhow!("Seeking clip: {err:?}"))
    }

    fn set_speed(&mut self, speed: f32) {
        self.sink.set_speed(speed);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_playing(&self) -> bool {
        !self.sink.is_paused() && !self.sink.empty()
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn stop(self: Box<Self>) {
        self.sink.stop();
    }
}

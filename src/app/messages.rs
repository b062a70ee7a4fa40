use crate::audio::AudioClip;
use crate::protocol::{Ebook, ExtractedText, Voice};

/// Everything the controller reacts to: user commands, async results and
/// transport ticks.
#[derive(Debug, Clone)]
pub enum Message {
    RefreshCatalog,
    SearchChanged(String),
    SelectEbook(String),
    SelectVoice(String),
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    NextSection,
    PrevSection,
    SetSpeed(f32),
    /// Fraction of the current clip, 0.0 to 1.0.
    Seek(f64),
    EbooksLoaded {
        request_id: u64,
        result: Result<Vec<Ebook>, String>,
    },
    VoicesLoaded {
        result: Result<Vec<Voice>, String>,
    },
    TextExtracted {
        request_id: u64,
        filename: String,
        result: Result<ExtractedText, String>,
    },
    SpeechSynthesized {
        request_id: u64,
        filename: String,
        section: usize,
        voice_id: String,
        result: Result<AudioClip, String>,
    },
    EbookDiscovered {
        path: String,
    },
    LiveConnected,
    Tick,
}

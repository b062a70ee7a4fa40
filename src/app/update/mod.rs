mod catalog;
mod navigation;
mod playback;
mod reducer;
mod synthesis;


/// Work the runtime performs outside the pure reducer. Each result comes back
/// as a [`Message`](super::Message) carrying the same request id.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadEbooks {
        request_id: u64,
    },
    LoadVoices,
    ExtractText {
        request_id: u64,
        filename: String,
    },
    Synthesize {
        request_id: u64,
        filename: String,
        section: usize,
        voice_id: String,
        text: String,
        output_name: String,
    },
}

/// Clip name for one section: `<stem>_section_<index>_<voice>`, restricted to
/// characters that are safe in a URL path segment.
pub fn output_name(filename: &str, section: usize, voice_id: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename);
    let sanitize = |raw: &str| -> String {
        raw.chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect()
    };
    format!("{}_section_{section}_{}", sanitize(stem), sanitize(voice_id))
}

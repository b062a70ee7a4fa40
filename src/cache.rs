//! Reuse of previously synthesized clips.
//!
//! Each generated WAV gets a sidecar `<clip>.sha256` holding a digest of the
//! voice id and the narrated text. A clip is reused only when its sidecar
//! matches the digest of the incoming request, so changing the voice or the
//! text of a section always regenerates the audio.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub fn clip_digest(voice_id: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(voice_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn sidecar_path(clip: &Path) -> PathBuf {
    let mut name = clip
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".sha256");
    clip.with_file_name(name)
}

/// True when `clip` exists and was produced for the same digest.
pub fn is_fresh(clip: &Path, digest: &str) -> bool {
    if !clip.is_file() {
        return false;
    }
    fs::read_to_string(sidecar_path(clip))
        .map(|stored| stored.trim() == digest)
        .unwrap_or(false)
}

pub fn record(clip: &Path, digest: &str) -> Result<()> {
    let path = sidecar_path(clip);
    fs::write(&path, digest)
        .with_context(|| format!("Failed to write clip digest at {}", path.display()))
}

/// Drop a stale sidecar so a failed regeneration never looks fresh.
pub fn forget(clip: &Path) {
    let _ = fs::remove_file(sidecar_path(clip));
}

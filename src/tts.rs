//! Piper speech synthesis.
//!
//! Piper runs as a subprocess per request. Text goes through a temp file,
//! audio is written next to the final clip and renamed into place once the
//! process succeeds, so a reader never sees a half-written WAV.

use crate::cache;
use crate::process::{self, CommandFailure};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("voice model not found at {0}")]
    ModelMissing(PathBuf),
    #[error("Piper failed: {0}")]
    Command(#[from] CommandFailure),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SynthesisError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SynthesisError::Io {
            context: context.into(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    command: Vec<String>,
    voices_dir: PathBuf,
    audio_dir: PathBuf,
    temp_dir: PathBuf,
    timeout: Duration,
}

impl SpeechSynthesizer {
    pub fn new(
        command: Vec<String>,
        voices_dir: PathBuf,
        audio_dir: PathBuf,
        temp_dir: PathBuf,
        timeout: Duration,
    ) -> Self {
        Self {
            command,
            voices_dir,
            audio_dir,
            temp_dir,
            timeout,
        }
    }

    /// `(model, config)` paths for a voice: `<voices>/<id>/<id>.onnx` and `.json`.
    pub fn model_paths(&self, voice_id: &str) -> (PathBuf, PathBuf) {
        let dir = self.voices_dir.join(voice_id);
        (
            dir.join(format!("{voice_id}.onnx")),
            dir.join(format!("{voice_id}.json")),
        )
    }

    pub fn output_path(&self, output_name: &str) -> PathBuf {
        self.audio_dir.join(format!("{output_name}.wav"))
    }

    /// Render `text` with `voice_id` into `<audio_dir>/<output_name>.wav`.
    ///
    /// A clip already rendered from the same voice and text is reused as is.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        output_name: &str,
    ) -> Result<PathBuf, SynthesisError> {
        let output = self.output_path(output_name);
        let digest = cache::clip_digest(voice_id, text);
        if cache::is_fresh(&output, &digest) {
            info!(path = %output.display(), "Reusing cached clip");
            return Ok(output);
        }

        let (model, config) = self.model_paths(voice_id);
        if !model.exists() {
            return Err(SynthesisError::ModelMissing(model));
        }

        for dir in [&self.temp_dir, &self.audio_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|err| SynthesisError::io(format!("creating {}", dir.display()), err))?;
        }

        let input = process::unique_temp_path(&self.temp_dir, output_name, "txt");
        tokio::fs::write(&input, text)
            .await
            .map_err(|err| SynthesisError::io(format!("writing {}", input.display()), err))?;
        let staging = process::unique_temp_path(&self.audio_dir, output_name, "wav");

        info!(
            voice = voice_id,
            chars = text.len(),
            output = %output.display(),
            "Synthesizing section with Piper"
        );
        let args = [
            OsStr::new("--model"),
            model.as_os_str(),
            OsStr::new("--config"),
            config.as_os_str(),
            OsStr::new("--output_file"),
            staging.as_os_str(),
            OsStr::new("--input_file"),
            input.as_os_str(),
        ];
        let result = process::run(&self.command, args, self.timeout).await;
        remove_quietly(&input);

        match result {
            Ok(out) => {
                if !out.stderr.is_empty() {
                    debug!(stderr = %out.stderr, "Piper diagnostics");
                }
            }
            Err(err) => {
                remove_quietly(&staging);
                warn!(voice = voice_id, "Piper synthesis failed: {err}");
                return Err(err.into());
            }
        }

        cache::forget(&output);
        if let Err(err) = fs::rename(&staging, &output) {
            remove_quietly(&staging);
            return Err(SynthesisError::io(
                format!("moving clip into {}", output.display()),
                err,
            ));
        }
        if let Err(err) = cache::record(&output, &digest) {
            warn!(path = %output.display(), "Failed to record clip digest: {err:#}");
        }
        Ok(output)
    }
}

fn remove_quietly(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        debug!(path = %path.display(), "Temp file not removed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        _root: tempfile::TempDir,
        voices: PathBuf,
        audio: PathBuf,
        temp: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let voices = root.path().join("voices");
        let audio = root.path().join("audio");
        let temp = root.path().join("temp");
        fs::create_dir_all(voices.join("demo")).unwrap();
        fs::write(voices.join("demo/demo.onnx"), b"model").unwrap();
        fs::write(voices.join("demo/demo.json"), b"{}").unwrap();
        Fixture {
            _root: root,
            voices,
            audio,
            temp,
        }
    }

    fn synthesizer(fx: &Fixture, script: &str) -> SpeechSynthesizer {
        SpeechSynthesizer::new(
            vec!["sh".into(), "-c".into(), script.into(), "piper".into()],
            fx.voices.clone(),
            fx.audio.clone(),
            fx.temp.clone(),
            Duration::from_secs(5),
        )
    }

    // Fake Piper: copies the input text to --output_file and counts invocations.
    const FAKE_PIPER: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --output_file) out="$2"; shift 2 ;;
    --input_file) in="$2"; shift 2 ;;
    *) shift ;;
  esac
done
echo run >> "$(dirname "$out")/runs.log"
cp "$in" "$out"
"#;

    #[test]
    fn model_paths_follow_voice_layout() {
        let fx = fixture();
        let tts = synthesizer(&fx, "true");
        let (model, config) = tts.model_paths("it-riccardo-x-low");
        assert!(model.ends_with("it-riccardo-x-low/it-riccardo-x-low.onnx"));
        assert!(config.ends_with("it-riccardo-x-low/it-riccardo-x-low.json"));
        assert_eq!(
            tts.output_path("book_section_2_demo").file_name(),
            Some(OsStr::new("book_section_2_demo.wav"))
        );
    }

    #[tokio::test]
    async fn missing_model_is_reported() {
        let fx = fixture();
        let err = synthesizer(&fx, "true")
            .synthesize("Hello", "absent", "out")
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::ModelMissing(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn writes_clip_removes_temp_and_reuses_cache() {
        let fx = fixture();
        let tts = synthesizer(&fx, FAKE_PIPER);

        let clip = tts.synthesize("Hello there", "demo", "book_section_0_demo").await.unwrap();
        assert_eq!(fs::read_to_string(&clip).unwrap(), "Hello there");
        assert_eq!(fs::read_dir(&fx.temp).unwrap().count(), 0);

        tts.synthesize("Hello there", "demo", "book_section_0_demo").await.unwrap();
        let runs = fs::read_to_string(fx.audio.join("runs.log")).unwrap();
        assert_eq!(runs.lines().count(), 1);

        tts.synthesize("Changed text", "demo", "book_section_0_demo").await.unwrap();
        assert_eq!(fs::read_to_string(&clip).unwrap(), "Changed text");
        let runs = fs::read_to_string(fx.audio.join("runs.log")).unwrap();
        assert_eq!(runs.lines().count(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_run_leaves_no_clip() {
        let fx = fixture();
        let tts = synthesizer(&fx, "echo 'model load error' >&2; exit 2");
        let err = tts.synthesize("Hello", "demo", "broken").await.unwrap_err();
        assert!(err.to_string().contains("model load error"));
        assert!(!tts.output_path("broken").exists());
        assert_eq!(fs::read_dir(&fx.temp).unwrap().count(), 0);
    }
}

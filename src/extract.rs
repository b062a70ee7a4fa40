//! Ebook text extraction.
//!
//! When an extraction command is configured it is invoked as
//! `<command...> <input> <output.txt> <.ext>` and the output file is read
//! back. Otherwise EPUB and plain text are handled in-process, PDF goes
//! through `pdftotext`, MOBI through calibre's `ebook-convert`, and every
//! other format through pandoc. Every external tool runs under the same
//! deadline.

use crate::process::{self, CommandFailure};
use anyhow::{Context, Result, anyhow};
use epub::doc::EpubDoc;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Converters used by the built-in path, each as a command prefix.
#[derive(Debug, Clone)]
pub struct Converters {
    pub pdftotext: Vec<String>,
    pub ebook_convert: Vec<String>,
    pub pandoc: Vec<String>,
}

impl Default for Converters {
    fn default() -> Self {
        Self {
            pdftotext: vec!["pdftotext".to_string()],
            ebook_convert: vec!["ebook-convert".to_string()],
            pandoc: vec!["pandoc".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extractor {
    command: Vec<String>,
    converters: Converters,
    temp_dir: PathBuf,
    timeout: Duration,
}

impl Extractor {
    pub fn new(command: Vec<String>, temp_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            command,
            converters: Converters::default(),
            temp_dir,
            timeout,
        }
    }

    pub fn with_converters(mut self, converters: Converters) -> Self {
        self.converters = converters;
        self
    }

    /// Full text of the ebook at `path`, decoded lossily as UTF-8.
    pub async fn extract(&self, path: &Path) -> Result<String> {
        let text = if self.command.is_empty() {
            self.extract_builtin(path).await?
        } else {
            self.extract_with_command(path).await?
        };
        info!(
            path = %path.display(),
            total_chars = text.len(),
            "Finished extracting text"
        );
        Ok(text)
    }

    async fn extract_builtin(&self, path: &Path) -> Result<String> {
        match extension_of(path).as_str() {
            "txt" | "epub" => {
                let owned = path.to_path_buf();
                tokio::task::spawn_blocking(move || read_in_process(&owned))
                    .await
                    .context("Extraction task panicked")?
            }
            "pdf" => {
                info!(path = %path.display(), "Converting PDF with pdftotext");
                let args = [
                    OsStr::new("-enc"),
                    OsStr::new("UTF-8"),
                    path.as_os_str(),
                    OsStr::new("-"),
                ];
                self.convert_to_stdout(&self.converters.pdftotext, args).await
            }
            "mobi" => {
                info!(path = %path.display(), "Converting MOBI with ebook-convert");
                self.convert_to_file(&self.converters.ebook_convert, path, |output| {
                    vec![path.as_os_str().to_owned(), output.as_os_str().to_owned()]
                })
                .await
            }
            _ => {
                info!(path = %path.display(), "Converting source to plain text with pandoc");
                let args = [
                    path.as_os_str(),
                    OsStr::new("--to"),
                    OsStr::new("plain"),
                    OsStr::new("--wrap=none"),
                    OsStr::new("--strip-comments"),
                    OsStr::new("--eol=lf"),
                ];
                self.convert_to_stdout(&self.converters.pandoc, args).await
            }
        }
    }

    async fn convert_to_stdout<I, S>(&self, program: &[String], args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = process::run(program, args, self.timeout)
            .await
            .map_err(describe_failure)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a tool that writes its result to a temp text file, then read it back.
    async fn convert_to_file<F>(&self, program: &[String], path: &Path, args: F) -> Result<String>
    where
        F: FnOnce(&Path) -> Vec<OsString>,
    {
        tokio::fs::create_dir_all(&self.temp_dir)
            .await
            .with_context(|| format!("Failed to create temp dir {}", self.temp_dir.display()))?;

        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("ebook");
        let output = process::unique_temp_path(&self.temp_dir, stem, "txt");
        let result = process::run(program, args(&output), self.timeout).await;

        let text = match result {
            Ok(_) => tokio::fs::read(&output)
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .with_context(|| format!("Failed to read extracted text at {}", output.display())),
            Err(err) => Err(describe_failure(err)),
        };

        if let Err(err) = tokio::fs::remove_file(&output).await {
            debug!(path = %output.display(), "Temp extraction output not removed: {err}");
        }
        text
    }

    async fn extract_with_command(&self, path: &Path) -> Result<String> {
        let extension = OsString::from(format!(".{}", extension_of(path)));
        info!(path = %path.display(), "Extracting text with external command");
        self.convert_to_file(&self.command, path, |output| {
            vec![
                path.as_os_str().to_owned(),
                output.as_os_str().to_owned(),
                extension,
            ]
        })
        .await
    }
}

fn describe_failure(err: CommandFailure) -> anyhow::Error {
    match err {
        CommandFailure::Exited { stderr, status, .. } if !stderr.is_empty() => {
            anyhow!("extraction failed with status {status}: {stderr}")
        }
        other => anyhow!(other).context("extraction failed"),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn read_in_process(path: &Path) -> Result<String> {
    if extension_of(path) == "epub" {
        return load_epub_text(path);
    }
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn load_epub_text(path: &Path) -> Result<String> {
    info!(path = %path.display(), "Loading EPUB content");
    let mut doc =
        EpubDoc::new(path).with_context(|| format!("Failed to open EPUB at {}", path.display()))?;

    let mut combined = String::new();
    let mut chapters = 0usize;

    loop {
        if let Some((chapter, _mime)) = doc.get_current_str() {
            chapters += 1;
            // Wide lines so paragraphs stay on one line; blank lines separate sections.
            let plain = match html2text::from_read(chapter.as_bytes(), 10_000) {
                Ok(clean) => clean,
                Err(err) => {
                    warn!(chapter = chapters, "html2text failed: {err}");
                    chapter
                }
            };
            if !plain.trim().is_empty() {
                if !combined.is_empty() {
                    combined.push_str("\n\n");
                }
                combined.push_str(plain.trim_end());
            }
            debug!(chapter = chapters, added_chars = plain.len(), "Parsed chapter");
        }

        if !doc.go_next() {
            break;
        }
    }

    debug!(chapters, total_chars = combined.len(), "Finished loading EPUB");
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin(temp: &Path) -> Extractor {
        Extractor::new(Vec::new(), temp.to_path_buf(), Duration::from_secs(5))
    }

    fn fake(script: &str, name: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into(), name.into()]
    }

    fn with_fakes(temp: &Path, timeout: Duration) -> Extractor {
        Extractor::new(Vec::new(), temp.to_path_buf(), timeout).with_converters(Converters {
            pdftotext: fake(r#"printf 'pdf %s %s\n\npage two' "$2" "$(basename "$3")""#, "pdftotext"),
            ebook_convert: fake(r#"printf 'mobi %s' "$(basename "$1")" > "$2""#, "ebook-convert"),
            pandoc: fake("sleep 30", "pandoc"),
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pdf_goes_through_pdftotext() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("scan.PDF");
        fs::write(&book, b"%PDF").unwrap();

        let text = with_fakes(&dir.path().join("temp"), Duration::from_secs(5))
            .extract(&book)
            .await
            .unwrap();
        assert_eq!(text, "pdf UTF-8 scan.PDF\n\npage two");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn mobi_goes_through_ebook_convert() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("temp");
        let book = dir.path().join("novel.mobi");
        fs::write(&book, b"BOOKMOBI").unwrap();

        let text = with_fakes(&temp, Duration::from_secs(5))
            .extract(&book)
            .await
            .unwrap();
        assert_eq!(text, "mobi novel.mobi");
        assert_eq!(fs::read_dir(&temp).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_converter_is_cut_off_at_the_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("paper.docx");
        fs::write(&book, b"docx").unwrap();

        let started = std::time::Instant::now();
        let err = with_fakes(dir.path(), Duration::from_millis(300))
            .extract(&book)
            .await
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(format!("{err:#}").contains("did not finish"), "{err:#}");
    }

    #[tokio::test]
    async fn plain_text_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("notes.TXT");
        fs::write(&book, b"First\n\nSecond \xff").unwrap();

        let text = builtin(dir.path()).extract(&book).await.unwrap();
        assert!(text.starts_with("First\n\nSecond "));
        assert!(text.ends_with('\u{FFFD}'));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = builtin(dir.path())
            .extract(&dir.path().join("gone.txt"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn corrupt_epub_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("broken.epub");
        fs::write(&book, b"not a zip archive").unwrap();
        assert!(builtin(dir.path()).extract(&book).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn external_command_receives_input_output_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("temp");
        let book = dir.path().join("story.epub");
        fs::write(&book, b"ignored").unwrap();

        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "printf 'ext=%s\\n\\nbody' \"$3\" > \"$2\"".to_string(),
            "extract".to_string(),
        ];
        let extractor = Extractor::new(command, temp.clone(), Duration::from_secs(5));
        let text = extractor.extract(&book).await.unwrap();
        assert_eq!(text, "ext=.epub\n\nbody");
        assert_eq!(fs::read_dir(&temp).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn external_failure_surfaces_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("story.mobi");
        fs::write(&book, b"ignored").unwrap();

        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo 'unsupported layout' >&2; exit 1".to_string(),
        ];
        let extractor = Extractor::new(command, dir.path().join("temp"), Duration::from_secs(5));
        let err = extractor.extract(&book).await.unwrap_err();
        assert!(format!("{err:#}").contains("unsupported layout"));
    }
}

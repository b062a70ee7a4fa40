//! Terminal projection of the reader state. Pure: nothing here mutates the
//! controller, so it can be re-rendered after every transition.

use super::state::{Controller, Phase};
use std::fmt::Write as _;
use std::time::Duration;

const SNIPPET_CHARS: usize = 72;

impl Controller {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_library(&mut out);
        self.render_voices(&mut out);
        self.render_reader(&mut out);
        out
    }

    /// One-line transport summary refreshed on ticks.
    pub fn status_line(&self) -> String {
        let mut line = format!("[{}]", self.phase.label());
        if let Some(session) = &self.session {
            let _ = write!(
                line,
                " {} {}/{}",
                session.title,
                session.current + 1,
                session.sections.len()
            );
        }
        if let Some(progress) = self.progress_label() {
            let _ = write!(line, " {progress}");
        }
        let _ = write!(line, " {:.2}x", self.speed);
        if let Some(voice) = &self.selected_voice {
            let _ = write!(line, " {voice}");
        }
        line
    }

    fn render_library(&self, out: &mut String) {
        out.push_str("== Library ==");
        if !self.search.trim().is_empty() {
            let _ = write!(out, " (search: {:?})", self.search.trim());
        }
        out.push('\n');
        if let Some(err) = &self.catalog_error {
            let _ = writeln!(out, "  catalog unavailable: {err}");
        }
        let visible = self.visible_ebooks();
        if visible.is_empty() && self.catalog_error.is_none() {
            out.push_str("  (no ebooks)\n");
        }
        let current = self.current_ebook();
        for (idx, ebook) in visible.iter().enumerate() {
            let marker = if current == Some(ebook.filename.as_str()) {
                '*'
            } else {
                ' '
            };
            let _ = writeln!(
                out,
                "{marker} {:>3}. {} ({})",
                idx + 1,
                ebook.title,
                ebook.filename
            );
        }
    }

    fn render_voices(&self, out: &mut String) {
        out.push_str("== Voices ==\n");
        if self.voices.is_empty() {
            match &self.voices_error {
                Some(err) => {
                    let _ = writeln!(out, "  none available: {err}");
                }
                None => out.push_str("  none available\n"),
            }
            return;
        }
        for (idx, voice) in self.voices.iter().enumerate() {
            let marker = if self.selected_voice.as_deref() == Some(voice.id.as_str()) {
                '*'
            } else {
                ' '
            };
            let _ = writeln!(
                out,
                "{marker} {:>3}. {} - {} [{}]",
                idx + 1,
                voice.id,
                voice.name,
                voice.language
            );
        }
    }

    fn render_reader(&self, out: &mut String) {
        out.push_str("== Reader ==\n");
        match &self.session {
            Some(session) => {
                let _ = writeln!(out, "{}", self.status_line());
                let first = session.current.saturating_sub(1);
                let last = (session.current + 1).min(session.last_index());
                for idx in first..=last {
                    let text = &session.sections[idx];
                    if idx == session.current {
                        let _ = writeln!(out, ">> [{}] {}", idx + 1, text.trim());
                    } else {
                        let _ = writeln!(out, "   [{}] {}", idx + 1, snippet(text));
                    }
                }
            }
            None if self.phase == Phase::LoadingText => {
                let _ = writeln!(out, "{}", self.status_line());
            }
            None => out.push_str("  open an ebook to start narration\n"),
        }
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "!! {notice}");
        }
    }

    fn progress_label(&self) -> Option<String> {
        let (position, duration) = self.progress()?;
        Some(match duration {
            Some(total) => format!("{} / {}", format_time(position), format_time(total)),
            None => format_time(position),
        })
    }
}

/// `m:ss`, minutes unbounded.
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(SNIPPET_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(Duration::from_secs(0)), "0:00");
        assert_eq!(format_time(Duration::from_millis(65_900)), "1:05");
        assert_eq!(format_time(Duration::from_secs(3_725)), "62:05");
    }

    #[test]
    fn snippet_flattens_and_truncates() {
        assert_eq!(snippet("short\n  text"), "short text");
        let long = "word ".repeat(40);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), SNIPPET_CHARS + 3);
    }
}

//! Library listing for the ebook source directory.
//!
//! The catalog is rebuilt from the directory on every request; nothing is
//! persisted. Only files with a supported extension are listed and dot-files
//! are skipped, matching what the watcher reports.

use crate::protocol::{Ebook, Voice};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Extensions (lowercase, without the dot) the reader knows how to extract.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["epub", "pdf", "mobi", "txt"];

pub fn is_supported(path: &Path) -> bool {
    if is_hidden(path) {
        return false;
    }
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase()),
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str())
    )
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Display title for a file: its name without the final extension.
pub fn title_for(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(filename)
        .to_string()
}

/// A name that can be joined onto a directory without escaping it.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.starts_with('.')
}

/// List supported ebooks in `dir`, sorted by filename.
pub fn list_ebooks(dir: &Path) -> Result<Vec<Ebook>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read ebook directory {}", dir.display()))?;

    let mut ebooks = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() || !is_supported(&path) {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
            debug!(path = %path.display(), "Skipping non UTF-8 filename");
            continue;
        };
        ebooks.push(Ebook {
            filename: filename.to_string(),
            title: title_for(filename),
        });
    }
    ebooks.sort_by(|a, b| a.filename.cmp(&b.filename));
    debug!(dir = %dir.display(), count = ebooks.len(), "Listed ebooks");
    Ok(ebooks)
}

pub fn find_voice<'a>(voices: &'a [Voice], id: &str) -> Option<&'a Voice> {
    voices.iter().find(|voice| voice.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported(Path::new("/ebooks/Book.EPUB")));
        assert!(is_supported(Path::new("notes.txt")));
        assert!(is_supported(Path::new("scan.pdf")));
        assert!(!is_supported(Path::new("cover.jpg")));
        assert!(!is_supported(Path::new("README")));
        assert!(!is_supported(Path::new(".hidden.epub")));
    }

    #[test]
    fn title_strips_only_last_extension() {
        assert_eq!(title_for("moby.dick.epub"), "moby.dick");
        assert_eq!(title_for("plain"), "plain");
    }

    #[test]
    fn plain_file_names_reject_traversal() {
        assert!(is_plain_file_name("book_section_0"));
        assert!(is_plain_file_name("Le Petit Prince.epub"));
        assert!(!is_plain_file_name("../etc/passwd"));
        assert!(!is_plain_file_name("a/b"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".env"));
    }

    #[test]
    fn lists_only_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.epub", "cover.png", ".partial.epub"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.epub")).unwrap();

        let ebooks = list_ebooks(dir.path()).unwrap();
        let names: Vec<_> = ebooks.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["a.epub", "b.txt"]);
        assert_eq!(ebooks[0].title, "a");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let missing = PathBuf::from("/definitely/not/here");
        assert!(list_ebooks(&missing).is_err());
    }
}

//! Polling watcher for new ebooks.
//!
//! The ebook directory is rescanned on a fixed interval and every supported
//! file that was not present in the previous scan is broadcast as a
//! `new-ebook` event. Removals are not reported.

use crate::cancellation::CancellationToken;
use crate::catalog;
use crate::protocol::LiveEvent;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_BUFFER: usize = 64;

/// Supported, non-hidden files currently in `dir`. Missing directories scan empty.
pub fn scan(dir: &Path) -> BTreeSet<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), "Ebook directory not readable: {err}");
            return BTreeSet::new();
        }
    };
    entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && catalog::is_supported(path))
        .collect()
}

/// Paths in `current` that were absent from `known`, in sorted order.
pub fn added<'a>(known: &'a BTreeSet<PathBuf>, current: &'a BTreeSet<PathBuf>) -> Vec<&'a PathBuf> {
    current.difference(known).collect()
}

pub fn event_for(path: &Path) -> LiveEvent {
    LiveEvent::NewEbook {
        path: path.display().to_string(),
    }
}

/// Start watching `dir`; the loop exits once `token` is cancelled.
pub fn spawn(
    dir: PathBuf,
    interval: Duration,
    token: CancellationToken,
) -> broadcast::Sender<LiveEvent> {
    let (tx, _) = broadcast::channel(EVENT_BUFFER);
    let events = tx.clone();
    tokio::spawn(async move {
        let mut known = scan(&dir);
        info!(
            dir = %dir.display(),
            existing = known.len(),
            ?interval,
            "Watching ebook directory"
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if token.is_cancelled() {
                debug!("Ebook watcher stopped");
                break;
            }
            let current = scan(&dir);
            for path in added(&known, &current) {
                info!(path = %path.display(), "New ebook detected");
                // No receivers just means no client is connected.
                if events.send(event_for(path)).is_err() {
                    debug!("No live subscribers for new ebook event");
                }
            }
            if current.len() < known.len() {
                warn!(
                    removed = known.len() - current.len(),
                    "Ebooks disappeared from the library"
                );
            }
            known = current;
        }
    });
    tx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_filters_unsupported_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.epub", "b.PDF", ".c.txt", "d.docx"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let names: Vec<_> = scan(dir.path())
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["a.epub", "b.PDF"]);
        assert!(scan(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn added_reports_only_new_paths() {
        let known: BTreeSet<PathBuf> = ["/e/a.epub", "/e/b.txt"].iter().map(PathBuf::from).collect();
        let current: BTreeSet<PathBuf> = ["/e/b.txt", "/e/c.mobi"].iter().map(PathBuf::from).collect();
        assert_eq!(added(&known, &current), vec![&PathBuf::from("/e/c.mobi")]);
    }

    #[tokio::test]
    async fn broadcasts_files_added_after_start() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.epub"), b"x").unwrap();
        let token = CancellationToken::new();
        let tx = spawn(dir.path().to_path_buf(), Duration::from_millis(20), token.clone());
        let mut rx = tx.subscribe();

        tokio::time::sleep(Duration::from_millis(60)).await;
        fs::write(dir.path().join("new.txt"), b"x").unwrap();
        fs::write(dir.path().join("skip.png"), b"x").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let LiveEvent::NewEbook { path } = event;
        assert!(path.ends_with("new.txt"));
        token.cancel();
    }
}

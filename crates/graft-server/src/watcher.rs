//! File watching for rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The manifest itself changed
    ManifestModified(PathBuf),

    /// A script that may end up in the bundle changed
    SourceModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `root` recursively, ignoring `ignore` and anything under it.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        root: &Path,
        ignore: Option<PathBuf>,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(std::io::Error::other)?;

        std::thread::spawn(move || {
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                let batch = drain_burst(&sync_rx, event, ignore.as_deref(), debounce_duration);
                for e in batch {
                    if async_tx.blocking_send(e).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Collect `first` and everything that follows it until the channel stays quiet for
/// `window`, so a burst of writes is reported once, after the last write.
fn drain_burst(
    rx: &mpsc::Receiver<notify::Event>,
    first: notify::Event,
    ignore: Option<&Path>,
    window: Duration,
) -> Vec<WatchEvent> {
    let mut batch = Vec::new();
    let mut next = Some(first);

    while let Some(event) = next {
        for path in &event.paths {
            if ignore.is_some_and(|ignored| path.starts_with(ignored)) {
                continue;
            }
            if let Some(e) = classify_event(path, &event.kind) {
                if !batch.contains(&e) {
                    batch.push(e);
                }
            }
        }
        next = rx.recv_timeout(window).ok();
    }

    batch
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => {
            if ext == "toml" {
                Some(WatchEvent::ManifestModified(path.to_path_buf()))
            } else if ext == "js" || ext == "mjs" {
                Some(WatchEvent::SourceModified(path.to_path_buf()))
            } else {
                None
            }
        }
        _ => None,
    }
}

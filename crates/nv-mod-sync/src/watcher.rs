//! Keeps the index and sidecar files in step with live filesystem changes.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use nv_base::{Config, FileKind, Metadata, NavaniError, Result, Snippet, store};
use nv_mod_index::SharedIndex;

use crate::events::{ChangeEvent, ChangeKind, events_from_notify};

/// What handling one change did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Neither a snippet nor a metadata file
    Ignored,
    NoEffect,
    MetadataUpdated,
    SnippetAdded,
    SnippetRemoved,
    MetadataRegenerated,
}

/// Stateless dispatcher from change notifications to index and store calls.
#[derive(Clone)]
pub struct SnippetWatcher {
    config: Arc<Config>,
    index: SharedIndex,
}

impl SnippetWatcher {
    pub fn new(config: Arc<Config>, index: SharedIndex) -> Self {
        Self { config, index }
    }

    pub fn apply(&self, event: &ChangeEvent) -> Result<Outcome> {
        let is_metadata = match self.config.classify_path(&event.path) {
            FileKind::Metadata => true,
            FileKind::Snippet(_) => false,
            FileKind::Other => return Ok(Outcome::Ignored),
        };
        let path = event.path.as_path();

        match (event.kind, is_metadata) {
            (ChangeKind::Modified, true) => self.metadata_modified(path),
            (ChangeKind::Modified, false) | (ChangeKind::Created, true) => Ok(Outcome::NoEffect),
            (ChangeKind::Created, false) => self.snippet_created(path),
            (ChangeKind::Removed, _) | (ChangeKind::Renamed, _) if path.exists() => {
                tracing::info!(path = %path.display(), kind = ?event.kind, "path still present, index unchanged");
                Ok(Outcome::NoEffect)
            }
            (ChangeKind::Removed | ChangeKind::Renamed, false) => self.snippet_removed(path),
            (ChangeKind::Removed | ChangeKind::Renamed, true) => self.metadata_removed(path),
        }
    }

    /// Process events one at a time until every sender is gone.
    pub fn run(&self, events: Receiver<ChangeEvent>) {
        for event in events.iter() {
            match self.apply(&event) {
                Ok(outcome) => {
                    tracing::debug!(path = %event.path.display(), kind = ?event.kind, ?outcome, "change handled")
                }
                Err(e) => tracing::warn!(path = %event.path.display(), kind = ?event.kind, error = %e, "change failed"),
            }
        }
        tracing::info!("change stream closed, watcher stopping");
    }

    fn snippet_path_for(&self, metadata_path: &Path) -> Option<PathBuf> {
        store::snippet_path_for_metadata(metadata_path, &self.config.metadata_suffix)
    }

    fn defaults_for(&self, file_name: &str) -> Metadata {
        Metadata::from_file_name(file_name, &self.config.languages)
    }

    fn metadata_modified(&self, path: &Path) -> Result<Outcome> {
        let Some(snippet_path) = self.snippet_path_for(path) else {
            return Ok(Outcome::NoEffect);
        };
        // A parse failure returns here and leaves the stale entry in place.
        let metadata = store::read_metadata(path)?;
        if self.index.update_metadata(&snippet_path, metadata) {
            Ok(Outcome::MetadataUpdated)
        } else {
            Ok(Outcome::NoEffect)
        }
    }

    fn snippet_created(&self, path: &Path) -> Result<Outcome> {
        if !path.is_file() || self.index.contains(path) {
            return Ok(Outcome::NoEffect);
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(Outcome::Ignored);
        };

        let suffix = &self.config.metadata_suffix;
        let metadata_path = path.with_file_name(format!("{}{}", file_name, suffix));
        let (metadata, needs_write) = match store::read_metadata(&metadata_path) {
            Ok(existing) => (existing, false),
            Err(e) if e.is_not_found() => (self.defaults_for(file_name), true),
            Err(e) => {
                tracing::warn!(error = %e, "replacing unreadable metadata with defaults");
                (self.defaults_for(file_name), true)
            }
        };

        let Some(snippet) = Snippet::from_path(path, metadata, suffix) else {
            return Ok(Outcome::Ignored);
        };
        if needs_write && let Err(e) = store::write_metadata(&snippet) {
            tracing::error!(error = %e, "failed to write metadata for new snippet");
        }
        self.index.add(snippet);
        tracing::info!(path = %path.display(), "snippet added");
        Ok(Outcome::SnippetAdded)
    }

    fn snippet_removed(&self, path: &Path) -> Result<Outcome> {
        let removed = self.index.remove(path);
        let metadata_path = match &removed {
            Some(snippet) => snippet.metadata_path().to_path_buf(),
            None => {
                let mut name = path.as_os_str().to_os_string();
                name.push(&self.config.metadata_suffix);
                PathBuf::from(name)
            }
        };

        match store::remove_metadata(&metadata_path) {
            Ok(()) => tracing::info!(path = %metadata_path.display(), "removed metadata of deleted snippet"),
            Err(e) if e.is_not_found() => {}
            Err(e) => tracing::error!(error = %e, "failed to remove metadata of deleted snippet"),
        }

        Ok(if removed.is_some() { Outcome::SnippetRemoved } else { Outcome::NoEffect })
    }

    fn metadata_removed(&self, path: &Path) -> Result<Outcome> {
        let Some(mut snippet) = self.snippet_path_for(path).and_then(|p| self.index.get(&p)) else {
            return Ok(Outcome::NoEffect);
        };
        let metadata = self.defaults_for(snippet.file_name());
        self.index.update_metadata(snippet.file_path(), metadata.clone());
        snippet.set_metadata(metadata);
        store::write_metadata(&snippet)?;
        tracing::info!(path = %path.display(), "regenerated deleted metadata");
        Ok(Outcome::MetadataRegenerated)
    }
}

/// Running watcher. Dropping it stops the notify backend, which closes the
/// event stream and lets the consumer thread finish.
pub struct WatchHandle {
    watcher: Option<RecommendedWatcher>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Stop watching and wait for queued events to drain.
    pub fn stop(mut self) {
        self.watcher.take();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("snippet watcher thread panicked");
        }
    }
}

/// Watch `config.data_dir` recursively and apply every change to `index` on a
/// background thread. Failing to register the watch is fatal.
pub fn watch(config: Arc<Config>, index: SharedIndex) -> Result<WatchHandle> {
    let (tx, rx) = mpsc::channel::<ChangeEvent>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for change in events_from_notify(event) {
                    if tx.send(change).is_err() {
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "filesystem notification error"),
        },
        notify::Config::default(),
    )
    .map_err(|e| NavaniError::Watch(format!("cannot create watcher: {}", e)))?;

    watcher
        .watch(&config.data_dir, RecursiveMode::Recursive)
        .map_err(|e| NavaniError::Watch(format!("cannot watch {}: {}", config.data_dir.display(), e)))?;

    let consumer = SnippetWatcher::new(config.clone(), index);
    let thread = thread::Builder::new()
        .name("snippet-watcher".to_string())
        .spawn(move || consumer.run(rx))
        .map_err(|e| NavaniError::Watch(format!("cannot spawn watcher thread: {}", e)))?;

    tracing::info!(root = %config.data_dir.display(), "watching for changes");
    Ok(WatchHandle { watcher: Some(watcher), thread: Some(thread) })
}

//! One-shot reconciliation of the data directory with the index and tree.
//!
//! Every snippet candidate ends up indexed with a sidecar on disk, every
//! sidecar without a snippet is deleted. Running it again over an unchanged
//! directory changes nothing.
use std::collections::BTreeMap;
use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

use nv_base::{Config, FileKind, Metadata, NavaniError, Result, Snippet, store};
use nv_mod_index::SnippetIndex;
use nv_mod_tree::{FileTree, NodeId};

/// What a crawl did, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Snippets newly added to the index
    pub snippets: usize,
    pub metadata_written: usize,
    pub orphans_removed: usize,
    /// Per-file or per-directory failures that were logged and skipped
    pub errors: usize,
}

#[derive(Debug)]
pub struct Crawl {
    pub tree: FileTree,
    pub report: CrawlReport,
}

/// Crawl `config.data_dir` into `index` and a fresh tree whose root is open.
/// Only a failure to list the root itself is returned as an error.
pub fn crawl(config: &Config, index: &mut SnippetIndex) -> Result<Crawl> {
    let root = &config.data_dir;
    let entries = fs::read_dir(root).map_err(|e| NavaniError::io(root, e))?;

    let root_name = root.file_name().and_then(|n| n.to_str()).unwrap_or("root").to_string();
    let mut tree = FileTree::new(root_name, root.clone());
    let root_id = tree.root();
    tree.open(root_id);

    let mut crawler = Crawler { config, index, report: CrawlReport::default() };
    crawler.crawl_entries(root, entries, &mut tree, root_id);
    tree.recompute();

    let report = crawler.report;
    tracing::info!(
        root = %root.display(),
        snippets = report.snippets,
        metadata_written = report.metadata_written,
        orphans_removed = report.orphans_removed,
        errors = report.errors,
        "crawl finished"
    );
    Ok(Crawl { tree, report })
}

/// Crawl one directory (and everything below it) under `parent`. A listing
/// failure is logged and skips this subtree only. The caller must
/// `recompute` the tree afterwards.
pub fn crawl_dir(config: &Config, dir: &Path, tree: &mut FileTree, parent: NodeId, index: &mut SnippetIndex) -> CrawlReport {
    let mut crawler = Crawler { config, index, report: CrawlReport::default() };
    crawler.crawl_dir(dir, tree, parent);
    crawler.report
}

struct Crawler<'a> {
    config: &'a Config,
    index: &'a mut SnippetIndex,
    report: CrawlReport,
}

impl Crawler<'_> {
    fn crawl_dir(&mut self, dir: &Path, tree: &mut FileTree, parent: NodeId) {
        match fs::read_dir(dir) {
            Ok(entries) => self.crawl_entries(dir, entries, tree, parent),
            Err(e) => {
                tracing::error!(dir = %dir.display(), error = %e, "cannot list directory, skipping subtree");
                self.report.errors += 1;
            }
        }
    }

    fn crawl_entries(&mut self, dir: &Path, entries: ReadDir, tree: &mut FileTree, parent: NodeId) {
        let mut subdirs: Vec<(String, PathBuf)> = Vec::new();
        let mut candidates: Vec<String> = Vec::new();
        // metadata file name -> still unclaimed by a snippet
        let mut remaining: BTreeMap<String, bool> = BTreeMap::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "unreadable directory entry");
                    self.report.errors += 1;
                    continue;
                }
            };
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };
            let path = entry.path();
            // Does not follow symlinks
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot stat entry");
                    self.report.errors += 1;
                    continue;
                }
            };

            if file_type.is_dir() {
                subdirs.push((name, path));
                continue;
            }
            // Linked files are indexed, linked directories never descended into.
            let is_file = if file_type.is_symlink() {
                fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false)
            } else {
                file_type.is_file()
            };
            if !is_file {
                continue;
            }
            match self.config.classify(&name) {
                FileKind::Metadata => {
                    remaining.insert(name, true);
                }
                FileKind::Snippet(_) => candidates.push(name),
                FileKind::Other => {}
            }
        }

        subdirs.sort();
        candidates.sort();

        let dir_nodes: Vec<(PathBuf, NodeId)> = subdirs
            .into_iter()
            .filter_map(|(name, path)| tree.add_dir(parent, name, path.clone()).map(|id| (path, id)))
            .collect();

        for file_name in &candidates {
            self.index_candidate(dir, file_name, &mut remaining, tree, parent);
        }

        for (path, id) in dir_nodes {
            self.crawl_dir(&path, tree, id);
        }

        for (meta_name, _) in remaining.into_iter().filter(|(_, left)| *left) {
            let meta_path = dir.join(&meta_name);
            match store::remove_metadata(&meta_path) {
                Ok(()) => {
                    tracing::info!(path = %meta_path.display(), "removed orphan metadata");
                    self.report.orphans_removed += 1;
                }
                Err(e) => {
                    tracing::error!(path = %meta_path.display(), error = %e, "failed to remove orphan metadata");
                    self.report.errors += 1;
                }
            }
        }
    }

    fn index_candidate(
        &mut self,
        dir: &Path,
        file_name: &str,
        remaining: &mut BTreeMap<String, bool>,
        tree: &mut FileTree,
        parent: NodeId,
    ) {
        let suffix = &self.config.metadata_suffix;
        let meta_name = format!("{}{}", file_name, suffix);

        let (metadata, needs_write) = match remaining.get_mut(&meta_name) {
            Some(left) => {
                *left = false;
                match store::read_metadata(&dir.join(&meta_name)) {
                    Ok(metadata) => (metadata, false),
                    Err(e) => {
                        tracing::warn!(error = %e, "replacing unreadable metadata with defaults");
                        (Metadata::from_file_name(file_name, &self.config.languages), true)
                    }
                }
            }
            None => (Metadata::from_file_name(file_name, &self.config.languages), true),
        };

        let snippet = Snippet::new(dir, file_name, metadata, suffix);
        if needs_write {
            match store::write_metadata(&snippet) {
                Ok(()) => self.report.metadata_written += 1,
                Err(e) => {
                    tracing::error!(error = %e, "failed to write metadata file");
                    self.report.errors += 1;
                }
            }
        }

        let file_path = snippet.file_path().to_path_buf();
        if self.index.add(snippet) {
            self.report.snippets += 1;
        }
        tree.add_file(parent, file_name, file_path, self.config.language_for(file_name));
    }
}

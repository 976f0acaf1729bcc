use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use nv_base::{Metadata, Snippet};

/// Keys an entry was bucketed under when it was added. Directory and file
/// name never change, so only the metadata-derived keys are remembered.
#[derive(Debug)]
struct BucketKeys {
    name: String,
    language: String,
    tags: Vec<String>,
}

impl BucketKeys {
    fn of(metadata: &Metadata) -> Self {
        let mut tags: Vec<String> = Vec::with_capacity(metadata.tags.len());
        for tag in &metadata.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        Self { name: metadata.name.clone(), language: metadata.language.clone(), tags }
    }
}

#[derive(Debug)]
struct Entry {
    snippet: Snippet,
    keys: BucketKeys,
}

type Buckets<K> = HashMap<K, Vec<PathBuf>>;

/// In-memory multi-key index over all known snippets.
///
/// Canonical storage is keyed by file path. The secondary buckets only hold
/// file paths and are updated inside `add`/`remove`, never on their own.
#[derive(Debug, Default)]
pub struct SnippetIndex {
    by_file_path: HashMap<PathBuf, Entry>,
    by_dir: Buckets<PathBuf>,
    by_file_name: Buckets<String>,
    by_name: Buckets<String>,
    by_language: Buckets<String>,
    by_tag: Buckets<String>,
}

fn push_key<K: Hash + Eq>(buckets: &mut Buckets<K>, key: K, path: &Path) {
    buckets.entry(key).or_default().push(path.to_path_buf());
}

fn drop_key<K, Q>(buckets: &mut Buckets<K>, key: &Q, path: &Path)
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    if let Some(paths) = buckets.get_mut(key) {
        if let Some(pos) = paths.iter().position(|p| p == path) {
            paths.remove(pos);
        }
        if paths.is_empty() {
            buckets.remove(key);
        }
    }
}

fn resolve<'a, K, Q>(entries: &'a HashMap<PathBuf, Entry>, buckets: &Buckets<K>, key: &Q) -> Vec<&'a Snippet>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    buckets
        .get(key)
        .map(|paths| paths.iter().filter_map(|p| entries.get(p)).map(|e| &e.snippet).collect())
        .unwrap_or_default()
}

impl SnippetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snippet under every key it satisfies. Returns false, without
    /// touching anything, if its file path is already indexed.
    pub fn add(&mut self, snippet: Snippet) -> bool {
        let path = snippet.file_path().to_path_buf();
        if self.by_file_path.contains_key(&path) {
            return false;
        }

        tracing::debug!(path = %path.display(), "adding snippet to index");
        let keys = BucketKeys::of(snippet.metadata());
        push_key(&mut self.by_dir, snippet.dir_path().to_path_buf(), &path);
        push_key(&mut self.by_file_name, snippet.file_name().to_string(), &path);
        push_key(&mut self.by_name, keys.name.clone(), &path);
        push_key(&mut self.by_language, keys.language.clone(), &path);
        for tag in &keys.tags {
            push_key(&mut self.by_tag, tag.clone(), &path);
        }
        self.by_file_path.insert(path, Entry { snippet, keys });
        true
    }

    /// Remove the snippet at `file_path` from canonical storage and every
    /// bucket it was added to.
    pub fn remove(&mut self, file_path: &Path) -> Option<Snippet> {
        let Entry { snippet, keys } = self.by_file_path.remove(file_path)?;

        tracing::debug!(path = %file_path.display(), "removing snippet from index");
        drop_key(&mut self.by_dir, snippet.dir_path(), file_path);
        drop_key(&mut self.by_file_name, snippet.file_name(), file_path);
        drop_key(&mut self.by_name, keys.name.as_str(), file_path);
        drop_key(&mut self.by_language, keys.language.as_str(), file_path);
        for tag in &keys.tags {
            drop_key(&mut self.by_tag, tag.as_str(), file_path);
        }
        Some(snippet)
    }

    /// Replace the metadata of an already indexed snippet. Never creates an
    /// entry. Bucket membership stays as it was at `add` time.
    pub fn update_metadata(&mut self, file_path: &Path, metadata: Metadata) -> bool {
        let Some(entry) = self.by_file_path.get_mut(file_path) else {
            return false;
        };
        tracing::debug!(path = %file_path.display(), "updating snippet metadata");
        entry.snippet.set_metadata(metadata);
        true
    }

    /// Snapshot of every indexed snippet, in no particular order.
    pub fn list(&self) -> Vec<Snippet> {
        self.by_file_path.values().map(|e| e.snippet.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snippet> {
        self.by_file_path.values().map(|e| &e.snippet)
    }

    pub fn get(&self, file_path: &Path) -> Option<&Snippet> {
        self.by_file_path.get(file_path).map(|e| &e.snippet)
    }

    pub fn contains(&self, file_path: &Path) -> bool {
        self.by_file_path.contains_key(file_path)
    }

    pub fn len(&self) -> usize {
        self.by_file_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file_path.is_empty()
    }

    pub fn by_dir(&self, dir_path: &Path) -> Vec<&Snippet> {
        resolve(&self.by_file_path, &self.by_dir, dir_path)
    }

    pub fn by_file_name(&self, file_name: &str) -> Vec<&Snippet> {
        resolve(&self.by_file_path, &self.by_file_name, file_name)
    }

    pub fn by_name(&self, name: &str) -> Vec<&Snippet> {
        resolve(&self.by_file_path, &self.by_name, name)
    }

    pub fn by_language(&self, language: &str) -> Vec<&Snippet> {
        resolve(&self.by_file_path, &self.by_language, language)
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Snippet> {
        resolve(&self.by_file_path, &self.by_tag, tag)
    }

    /// Distinct languages with at least one snippet, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_language.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    /// Distinct tags with at least one snippet, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_tag.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }
}

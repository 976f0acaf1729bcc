//! Reader/writer-locked handle shared by the foreground and the watcher thread.
use std::path::Path;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use nv_base::{Metadata, Snippet};

use crate::index::SnippetIndex;

/// Mutations take the write lock, everything else the read lock. Lookups
/// return owned snapshots so no guard outlives the call.
#[derive(Debug, Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<SnippetIndex>>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_index(index: SnippetIndex) -> Self {
        Self { inner: Arc::new(RwLock::new(index)) }
    }

    pub fn add(&self, snippet: Snippet) -> bool {
        self.inner.write().add(snippet)
    }

    pub fn remove(&self, file_path: &Path) -> Option<Snippet> {
        self.inner.write().remove(file_path)
    }

    pub fn update_metadata(&self, file_path: &Path, metadata: Metadata) -> bool {
        self.inner.write().update_metadata(file_path, metadata)
    }

    pub fn list(&self) -> Vec<Snippet> {
        self.inner.read().list()
    }

    pub fn get(&self, file_path: &Path) -> Option<Snippet> {
        self.inner.read().get(file_path).cloned()
    }

    pub fn contains(&self, file_path: &Path) -> bool {
        self.inner.read().contains(file_path)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn by_dir(&self, dir_path: &Path) -> Vec<Snippet> {
        self.inner.read().by_dir(dir_path).into_iter().cloned().collect()
    }

    pub fn by_file_name(&self, file_name: &str) -> Vec<Snippet> {
        self.inner.read().by_file_name(file_name).into_iter().cloned().collect()
    }

    pub fn by_name(&self, name: &str) -> Vec<Snippet> {
        self.inner.read().by_name(name).into_iter().cloned().collect()
    }

    pub fn by_language(&self, language: &str) -> Vec<Snippet> {
        self.inner.read().by_language(language).into_iter().cloned().collect()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<Snippet> {
        self.inner.read().by_tag(tag).into_iter().cloned().collect()
    }

    /// Hold the read lock for several lookups at once. Keep the guard short-lived:
    /// the watcher blocks on it.
    pub fn read(&self) -> RwLockReadGuard<'_, SnippetIndex> {
        self.inner.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn snippet(i: usize) -> Snippet {
        let meta = Metadata { name: format!("s{}", i), language: "rust".into(), ..Default::default() };
        Snippet::new("/d", format!("s{}.rs", i), meta, ".meta.json")
    }

    #[test]
    fn test_clones_share_state() {
        let index = SharedIndex::new();
        let other = index.clone();
        index.add(snippet(1));
        assert_eq!(other.len(), 1);
        assert!(other.contains(Path::new("/d/s1.rs")));
        assert_eq!(other.by_language("rust").len(), 1);
    }

    #[test]
    fn test_concurrent_writer_and_readers() {
        let index = SharedIndex::new();
        let writer = {
            let index = index.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    index.add(snippet(i));
                }
            })
        };
        let reader = {
            let index = index.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let guard = index.read();
                    // Canonical and language views agree under one read lock.
                    assert_eq!(guard.len(), guard.by_language("rust").len());
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(index.list().len(), 200);
    }

    #[test]
    fn test_update_and_remove_through_handle() {
        let index = SharedIndex::new();
        index.add(snippet(7));
        let path = Path::new("/d/s7.rs");
        let meta = Metadata { description: "changed".into(), ..index.get(path).unwrap().metadata().clone() };
        assert!(index.update_metadata(path, meta));
        assert_eq!(index.get(path).unwrap().metadata().description, "changed");
        assert!(index.remove(path).is_some());
        assert!(index.is_empty());
    }
}

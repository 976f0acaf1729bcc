//! Metadata store: sidecar documents and snippet file contents on disk.
//!
//! All calls are synchronous and never retried. Callers decide whether a
//! failure matters; for crawl and watch it never does.
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NavaniError, Result};
use crate::models::{Metadata, Snippet};

/// Write the snippet's metadata as a pretty-printed JSON document at its metadata path.
pub fn write_metadata(snippet: &Snippet) -> Result<()> {
    let content = serde_json::to_string_pretty(snippet.metadata())?;
    let path = snippet.metadata_path();
    fs::write(path, content).map_err(|e| NavaniError::io(path, e))
}

/// Read a metadata document. Absent file -> `NotFound`, malformed content -> `Parse`.
pub fn read_metadata(path: &Path) -> Result<Metadata> {
    let content = fs::read_to_string(path).map_err(|e| NavaniError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| NavaniError::Parse { path: path.to_path_buf(), source })
}

pub fn remove_metadata(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| NavaniError::io(path, e))
}

/// Snippet path paired with a metadata path, `None` if the suffix does not match.
pub fn snippet_path_for_metadata(metadata_path: &Path, metadata_suffix: &str) -> Option<PathBuf> {
    let name = metadata_path.file_name()?.to_str()?;
    let stem = name.strip_suffix(metadata_suffix)?;
    if stem.is_empty() {
        return None;
    }
    Some(metadata_path.with_file_name(stem))
}

pub fn read_snippet_content(snippet: &Snippet) -> Result<String> {
    let path = snippet.file_path();
    fs::read_to_string(path).map_err(|e| NavaniError::io(path, e))
}

pub fn write_snippet(snippet: &Snippet, content: &str) -> Result<()> {
    let path = snippet.file_path();
    fs::write(path, content).map_err(|e| NavaniError::io(path, e))
}

/// Write the snippet file, then its metadata. Not atomic across the two files.
pub fn create_snippet(snippet: &Snippet, content: &str) -> Result<()> {
    write_snippet(snippet, content)?;
    write_metadata(snippet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(dir: &Path) -> Snippet {
        let meta = Metadata {
            name: "hello".to_string(),
            description: "prints hello".to_string(),
            language: "python".to_string(),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_100,
            copies: 4,
            tags: vec!["greeting".to_string(), "demo".to_string(), "demo".to_string()],
        };
        Snippet::new(dir, "hello.py", meta, ".meta.json")
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let tmp = TempDir::new().unwrap();
        let snippet = sample(tmp.path());
        write_metadata(&snippet).unwrap();

        let read = read_metadata(snippet.metadata_path()).unwrap();
        assert_eq!(&read, snippet.metadata());
    }

    #[test]
    fn test_written_document_field_names() {
        let tmp = TempDir::new().unwrap();
        let snippet = sample(tmp.path());
        write_metadata(&snippet).unwrap();

        let raw = fs::read_to_string(snippet.metadata_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for key in ["name", "description", "language", "created_at", "updated_at", "copies", "tags"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert!(raw.contains("\n  \"name\""), "document should be indented");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = read_metadata(&tmp.path().join("nope.py.meta.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_malformed_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.py.meta.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_metadata(&path), Err(NavaniError::Parse { .. })));

        fs::write(&path, r#"{"copies": "many"}"#).unwrap();
        assert!(matches!(read_metadata(&path), Err(NavaniError::Parse { .. })));
    }

    #[test]
    fn test_read_partial_document_defaults_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("p.py.meta.json");
        fs::write(&path, r#"{"name": "p", "tags": ["x"]}"#).unwrap();
        let meta = read_metadata(&path).unwrap();
        assert_eq!(meta.name, "p");
        assert_eq!(meta.tags, vec!["x".to_string()]);
        assert_eq!(meta.copies, 0);
    }

    #[test]
    fn test_read_null_fields_as_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("n.py.meta.json");
        let doc = r#"{"name":"Greeter","description":null,"language":"python","created_at":5,"updated_at":null,"copies":9,"tags":null}"#;
        fs::write(&path, doc).unwrap();
        let meta = read_metadata(&path).unwrap();
        assert_eq!(meta.name, "Greeter");
        assert_eq!(meta.description, "");
        assert_eq!(meta.created_at, 5);
        assert_eq!(meta.updated_at, 0);
        assert_eq!(meta.copies, 9);
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn test_read_negative_copies() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("c.py.meta.json");
        fs::write(&path, r#"{"name":"c","copies":-2}"#).unwrap();
        assert_eq!(read_metadata(&path).unwrap().copies, -2);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let snippet = Snippet::new(tmp.path().join("gone"), "a.py", Metadata::default(), ".meta.json");
        assert!(write_metadata(&snippet).is_err());
    }

    #[test]
    fn test_snippet_path_for_metadata() {
        assert_eq!(
            snippet_path_for_metadata(Path::new("/d/a.py.meta.json"), ".meta.json"),
            Some(PathBuf::from("/d/a.py"))
        );
        assert_eq!(snippet_path_for_metadata(Path::new("/d/a.py"), ".meta.json"), None);
        assert_eq!(snippet_path_for_metadata(Path::new("/d/.meta.json"), ".meta.json"), None);
    }

    #[test]
    fn test_create_snippet_writes_both_files() {
        let tmp = TempDir::new().unwrap();
        let snippet = sample(tmp.path());
        create_snippet(&snippet, "print('hello')\n").unwrap();
        assert_eq!(read_snippet_content(&snippet).unwrap(), "print('hello')\n");
        assert!(snippet.metadata_path().exists());
        remove_metadata(snippet.metadata_path()).unwrap();
        assert!(!snippet.metadata_path().exists());
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{ICON_UNKNOWN, LanguageTable};

/// Descriptive record stored in a snippet's sidecar file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub language: String,
    /// Seconds since epoch
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: i64,
    /// Seconds since epoch
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub copies: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// JSON `null` reads as the field's zero value, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Metadata {
    /// Defaults derived from the snippet's file name alone.
    pub fn from_file_name(file_name: &str, languages: &LanguageTable) -> Self {
        let name = Path::new(file_name).file_name().and_then(|n| n.to_str()).unwrap_or(file_name).to_string();
        let language = languages.language_for_file_name(file_name).unwrap_or(ICON_UNKNOWN).to_string();
        let now = chrono::Utc::now().timestamp();
        Self { name, description: String::new(), language, created_at: now, updated_at: now, copies: 0, tags: Vec::new() }
    }

    /// Lines for the detail view.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Name: {}", self.name),
            format!("Description: {}", self.description),
            format!("Language: {}", self.language),
            format!("Tags: {}", self.tags.join(", ")),
            format!("Used: {} times", self.copies),
        ]
    }
}

/// One indexed snippet file. Paths are fixed at construction; only the
/// metadata may change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    metadata: Metadata,
    file_path: PathBuf,
    dir_path: PathBuf,
    file_name: String,
    metadata_path: PathBuf,
}

impl Snippet {
    pub fn new(dir_path: impl Into<PathBuf>, file_name: impl Into<String>, metadata: Metadata, metadata_suffix: &str) -> Self {
        let dir_path = dir_path.into();
        let file_name = file_name.into();
        let file_path = dir_path.join(&file_name);
        let metadata_path = dir_path.join(format!("{}{}", file_name, metadata_suffix));
        Self { metadata, file_path, dir_path, file_name, metadata_path }
    }

    /// Split a full snippet path into directory and file name.
    pub fn from_path(file_path: &Path, metadata: Metadata, metadata_suffix: &str) -> Option<Self> {
        let file_name = file_path.file_name()?.to_str()?;
        let dir_path = file_path.parent()?;
        Some(Self::new(dir_path, file_name, metadata, metadata_suffix))
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn test_snippet_paths_are_consistent() {
        let snippet = Snippet::new("/data/py", "a.py", Metadata::default(), ".meta.json");
        assert_eq!(snippet.file_path(), snippet.dir_path().join(snippet.file_name()));
        assert_eq!(snippet.metadata_path(), Path::new("/data/py/a.py.meta.json"));
    }

    #[test]
    fn test_from_path_splits() {
        let snippet = Snippet::from_path(Path::new("/data/go/b.go"), Metadata::default(), ".m").unwrap();
        assert_eq!(snippet.dir_path(), Path::new("/data/go"));
        assert_eq!(snippet.file_name(), "b.go");
        assert_eq!(snippet.metadata_path(), Path::new("/data/go/b.go.m"));
    }

    #[test]
    fn test_metadata_from_file_name() {
        let config = Config::defaults();
        let meta = Metadata::from_file_name("a.py", &config.languages);
        assert_eq!(meta.name, "a.py");
        assert_eq!(meta.language, "python");
        assert_eq!(meta.copies, 0);
        assert!(meta.tags.is_empty());
        assert_eq!(meta.created_at, meta.updated_at);
        assert!(meta.created_at > 0);

        let unknown = Metadata::from_file_name("README", &config.languages);
        assert_eq!(unknown.language, "unknown");
    }

    #[test]
    fn test_summary_lines() {
        let meta = Metadata { name: "n".into(), tags: vec!["a".into(), "b".into()], copies: 3, ..Default::default() };
        let lines = meta.summary_lines();
        assert_eq!(lines[3], "Tags: a, b");
        assert_eq!(lines[4], "Used: 3 times");
    }
}

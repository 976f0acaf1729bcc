//! YAML configuration: data locations, metadata suffix, language table, icons and tree glyphs.
//!
//! Defaults are embedded at compile time. A user file is merged on top of them.
//! The resulting `Config` is built once at startup and handed to every component.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{NavaniError, Result};
use crate::filetype::FileKind;

// ============================================================================
// Language table
// ============================================================================

/// Extension (without the leading dot) -> language tag.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(transparent)]
pub struct LanguageTable(HashMap<String, String>);

impl LanguageTable {
    pub fn language_for_extension(&self, extension: &str) -> Option<&str> {
        self.0.get(extension.trim_start_matches('.')).map(|s| s.as_str())
    }

    /// Language of a bare file name, judged by its last extension.
    pub fn language_for_file_name(&self, file_name: &str) -> Option<&str> {
        let ext = Path::new(file_name).extension()?.to_str()?;
        self.language_for_extension(ext)
    }

    /// Reverse lookup. Several extensions may share a language (yml/yaml), the
    /// lexicographically smallest one wins so the answer is stable.
    pub fn extension_for(&self, language: &str) -> Option<&str> {
        self.0.iter().filter(|(_, lang)| lang.as_str() == language).map(|(ext, _)| ext.as_str()).min()
    }

    pub fn register(&mut self, extension: &str, language: &str) {
        self.0.insert(extension.trim_start_matches('.').to_string(), language.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Icons & tree glyphs
// ============================================================================

pub const ICON_DIRECTORY: &str = "directory";
pub const ICON_OPEN_DIRECTORY: &str = "openDirectory";
pub const ICON_EMPTY_DIRECTORY: &str = "emptyDirectory";
pub const ICON_UNKNOWN: &str = "unknown";

/// Icon key (language tag or one of the directory keys) -> glyph.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(transparent)]
pub struct IconTable(HashMap<String, String>);

impl IconTable {
    /// Glyph for `key`, falling back to the "unknown" icon.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).or_else(|| self.0.get(ICON_UNKNOWN)).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn register(&mut self, key: &str, glyph: &str) {
        self.0.insert(key.to_string(), glyph.to_string());
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TreeGlyphs {
    pub open: String,
    pub closed: String,
    /// Connector in front of a node that has later siblings
    pub branch: String,
    /// Connector in front of the last sibling
    pub last_branch: String,
    /// Indentation below an ancestor that has later siblings
    pub indent: String,
    /// Indentation below an ancestor that was the last sibling
    pub blank: String,
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub metadata_suffix: String,
    pub languages: LanguageTable,
    pub icons: IconTable,
    pub tree: TreeGlyphs,
}

/// Overrides read from the user's file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserConfig {
    data_dir: Option<PathBuf>,
    logs_dir: Option<PathBuf>,
    metadata_suffix: Option<String>,
    filetypes: HashMap<String, String>,
    filetype_icons: HashMap<String, String>,
    tree: UserTreeGlyphs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserTreeGlyphs {
    open: Option<String>,
    closed: Option<String>,
    branch: Option<String>,
    last_branch: Option<String>,
    indent: Option<String>,
    blank: Option<String>,
}

fn parse_yaml<T: for<'de> Deserialize<'de>>(name: &str, content: &str) -> T {
    serde_yaml::from_str(content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", name, e))
}

const DEFAULTS_YAML: &str = include_str!("../../../../yamls/defaults.yaml");

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Built-in configuration only.
    pub fn defaults() -> Self {
        parse_yaml("defaults.yaml", DEFAULTS_YAML)
    }

    /// Defaults merged with the user file at `user_file`, if one is given.
    pub fn load(user_file: Option<&Path>) -> Result<Self> {
        let Some(path) = user_file else {
            return Ok(Self::defaults());
        };
        let content = fs::read_to_string(path)
            .map_err(|e| NavaniError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_user_yaml(&content).map_err(|e| match e {
            NavaniError::Config(msg) => NavaniError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Defaults merged with a user YAML document.
    pub fn from_user_yaml(content: &str) -> Result<Self> {
        let user: UserConfig = if content.trim().is_empty() {
            UserConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| NavaniError::Config(e.to_string()))?
        };
        let mut config = Self::defaults();
        config.merge(user);
        config.validate()?;
        Ok(config)
    }

    fn merge(&mut self, user: UserConfig) {
        if let Some(dir) = user.data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = user.logs_dir {
            self.logs_dir = dir;
        }
        if let Some(suffix) = user.metadata_suffix {
            self.metadata_suffix = suffix;
        }
        for (ext, lang) in &user.filetypes {
            self.languages.register(ext, lang);
        }
        for (key, glyph) in &user.filetype_icons {
            self.icons.register(key, glyph);
        }

        let glyphs = user.tree;
        let tree = &mut self.tree;
        for (slot, value) in [
            (&mut tree.open, glyphs.open),
            (&mut tree.closed, glyphs.closed),
            (&mut tree.branch, glyphs.branch),
            (&mut tree.last_branch, glyphs.last_branch),
            (&mut tree.indent, glyphs.indent),
            (&mut tree.blank, glyphs.blank),
        ] {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.metadata_suffix.is_empty() {
            return Err(NavaniError::Config("metadata_suffix must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// True when `file_name` is a sidecar metadata file name.
    pub fn is_metadata_file(&self, file_name: &str) -> bool {
        file_name.len() > self.metadata_suffix.len() && file_name.ends_with(&self.metadata_suffix)
    }

    /// Decide how crawler and watcher treat a file. The metadata suffix is
    /// checked before the language table.
    pub fn classify(&self, file_name: &str) -> FileKind {
        if self.is_metadata_file(file_name) {
            return FileKind::Metadata;
        }
        match self.languages.language_for_file_name(file_name) {
            Some(lang) => FileKind::Snippet(lang.to_string()),
            None => FileKind::Other,
        }
    }

    /// Same as [`Config::classify`] for a full path.
    pub fn classify_path(&self, path: &Path) -> FileKind {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.classify(name),
            None => FileKind::Other,
        }
    }

    /// Language tag for a snippet file name, "unknown" if not in the table.
    pub fn language_for(&self, file_name: &str) -> String {
        self.languages.language_for_file_name(file_name).unwrap_or(ICON_UNKNOWN).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let config = Config::defaults();
        assert_eq!(config.metadata_suffix, ".meta.json");
        assert_eq!(config.languages.language_for_extension("py"), Some("python"));
        assert_eq!(config.languages.language_for_extension(".rs"), Some("rust"));
        assert!(!config.icons.get(ICON_DIRECTORY).is_empty());
    }

    #[test]
    fn test_classify_checks_metadata_before_language() {
        let config = Config::defaults();
        assert_eq!(config.classify("a.py.meta.json"), FileKind::Metadata);
        assert_eq!(config.classify("data.json"), FileKind::Snippet("json".to_string()));
        assert_eq!(config.classify("a.py"), FileKind::Snippet("python".to_string()));
        assert_eq!(config.classify("notes.txt"), FileKind::Other);
        assert_eq!(config.classify(".meta.json"), FileKind::Other);
        assert_eq!(config.classify("Makefile"), FileKind::Other);
    }

    #[test]
    fn test_user_yaml_merges_over_defaults() {
        let config = Config::from_user_yaml(
            "metadata_suffix: .nvmeta\nfiletypes:\n  zig: zig\n  py: python3\nfiletype_icons:\n  zig: Z\ntree:\n  open: \"-\"\n",
        )
        .unwrap();
        assert_eq!(config.metadata_suffix, ".nvmeta");
        assert_eq!(config.languages.language_for_extension("zig"), Some("zig"));
        assert_eq!(config.languages.language_for_extension("py"), Some("python3"));
        assert_eq!(config.languages.language_for_extension("go"), Some("go"));
        assert_eq!(config.icons.get("zig"), "Z");
        assert_eq!(config.tree.open, "-");
        assert_eq!(config.tree.closed, Config::defaults().tree.closed);
    }

    #[test]
    fn test_empty_suffix_rejected() {
        let err = Config::from_user_yaml("metadata_suffix: \"\"\n").unwrap_err();
        assert!(matches!(err, NavaniError::Config(_)));
    }

    #[test]
    fn test_unknown_icon_falls_back() {
        let config = Config::defaults();
        assert_eq!(config.icons.get("no-such-language"), config.icons.get(ICON_UNKNOWN));
    }

    #[test]
    fn test_extension_for_is_stable() {
        let config = Config::defaults();
        assert_eq!(config.languages.extension_for("yaml"), Some("yaml"));
        assert_eq!(config.languages.extension_for("rust"), Some("rs"));
        assert_eq!(config.languages.extension_for("cobol"), None);
    }

    #[test]
    fn test_load_reports_path_once() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("navani.yaml");
        fs::write(&path, "metadata_suffix: \"\"\n").unwrap();
        let msg = Config::load(Some(&path)).unwrap_err().to_string();
        assert!(msg.contains("navani.yaml"));
        assert_eq!(msg.matches("Config error").count(), 1, "{}", msg);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, NavaniError::Config(_)));
    }
}

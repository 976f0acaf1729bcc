use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum NavaniError {
    #[error("IO error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed metadata in {}: {source}", .path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Watch error: {0}")]
    Watch(String),
}

impl NavaniError {
    /// Wrap an I/O error, mapping `NotFound` onto the dedicated variant.
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io { path: path.to_path_buf(), source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, NavaniError>;

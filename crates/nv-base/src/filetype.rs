/// How a file in the data directory is treated by the crawler and the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// Sidecar metadata file (name ends with the metadata suffix)
    Metadata,
    /// Snippet candidate with its language tag
    Snippet(String),
    /// Neither indexed nor tracked
    Other,
}

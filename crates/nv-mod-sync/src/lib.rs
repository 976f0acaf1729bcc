mod crawler;
mod events;
mod watcher;

pub use crawler::{Crawl, CrawlReport, crawl, crawl_dir};
pub use events::{ChangeEvent, ChangeKind, events_from_notify};
pub use watcher::{Outcome, SnippetWatcher, WatchHandle, watch};

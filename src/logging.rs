//! File logging for the `navani` binary.
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use nv_base::{NavaniError, Result};

/// Explicit filter directives, e.g. `NAVANI_LOG=nv_mod_sync=debug`.
const FILTER_ENV: &str = "NAVANI_LOG";
/// Any value switches the default level to debug.
const DEBUG_ENV: &str = "DEBUG";

fn default_directive() -> &'static str {
    if std::env::var_os(DEBUG_ENV).is_some() { "debug" } else { "info" }
}

/// Today's log file inside `logs_dir`.
pub fn log_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join(format!("{}.log", chrono::Local::now().format("%Y-%m-%d")))
}

/// Append all tracing output to today's log file. Called once, before the crawl.
pub fn init(logs_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir).map_err(|e| NavaniError::io(logs_dir, e))?;
    let path = log_path(logs_dir);
    let file = OpenOptions::new().create(true).append(true).open(&path).map_err(|e| NavaniError::io(&path, e))?;

    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| NavaniError::Config(format!("cannot install logger: {}", e)))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), pid = std::process::id(), "navani starting");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_path_is_dated() {
        let tmp = TempDir::new().unwrap();
        let path = log_path(tmp.path());
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "YYYY-MM-DD.log".len());
        assert_eq!(path.parent().unwrap(), tmp.path());
    }
}

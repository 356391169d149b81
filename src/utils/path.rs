//! Path utility functions
//!
//! Cache directory resolution and file helpers used by the caches and CLI.

use std::path::{Path, PathBuf};

use crate::config;

/// Per-user cache directory for the application
///
/// Falls back to a relative `.cache` directory when the platform
/// does not report one.
pub fn get_cache_dir(app_name: &str) -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(app_name))
        .unwrap_or_else(|| PathBuf::from(config::cache::FALLBACK_DIR))
}

/// Create the parent directory of `path` if it has one
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e)),
        _ => Ok(()),
    }
}

/// Serialize `value` as pretty JSON into `path`, creating parent directories
pub fn write_json_pretty<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize {}: {}", path.display(), e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

/// Write plain text into `path`, creating parent directories
pub fn write_text(path: &Path, content: &str) -> Result<(), String> {
    ensure_parent_dir(path)?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

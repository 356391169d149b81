//! Time-based cache for enhanced metadata
//!
//! Unlike the content-hash data cache, this one expires on wall-clock age.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::write_json_pretty;
use crate::{log_error, log_info, log_warn};

use super::models::EnhancedMetadata;

const MODULE: &str = "enhanced::cache";

/// Board key -> metadata
pub type MetadataMap = IndexMap<String, EnhancedMetadata>;

/// Stored metadata with the time it was fetched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    /// Unix time in milliseconds, 0 when never fetched
    pub timestamp: i64,
    pub data: MetadataMap,
}

impl MetadataSnapshot {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }

    /// Usable without refetching: younger than `ttl` and not empty
    pub fn is_fresh(&self, ttl: Duration, now_ms: i64) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.age_ms(now_ms) < ttl_ms && !self.data.is_empty()
    }
}

/// File-backed store for one [`MetadataSnapshot`]
#[derive(Debug, Clone)]
pub struct MetadataCache {
    path: PathBuf,
    ttl: Duration,
}

impl MetadataCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read the snapshot; missing or unreadable files give an empty one
    pub fn load(&self) -> MetadataSnapshot {
        if !self.path.exists() {
            return MetadataSnapshot::default();
        }

        let parsed = std::fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<MetadataSnapshot>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log_warn!(MODULE, "Error loading cached data: {}", e);
                MetadataSnapshot::default()
            }
        }
    }

    /// Store `data` stamped with `now_ms`, logging instead of failing
    pub fn save(&self, data: &MetadataMap, now_ms: i64) {
        let snapshot = MetadataSnapshot {
            timestamp: now_ms,
            data: data.clone(),
        };
        match write_json_pretty(&self.path, &snapshot) {
            Ok(()) => log_info!(
                MODULE,
                "Enhanced device data cached for {} boards",
                data.len()
            ),
            Err(e) => log_error!(MODULE, "Error saving cached data: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn one_board() -> MetadataMap {
        let mut data = MetadataMap::new();
        data.insert("eve".to_string(), EnhancedMetadata::default());
        data
    }

    #[test]
    fn test_freshness() {
        let now = 10 * 86_400_000;
        let snapshot = MetadataSnapshot {
            timestamp: now - 1000,
            data: one_board(),
        };
        assert!(snapshot.is_fresh(DAY, now));
        assert!(!snapshot.is_fresh(DAY, now + 86_400_000));

        let empty = MetadataSnapshot {
            timestamp: now,
            data: MetadataMap::new(),
        };
        assert!(!empty.is_fresh(DAY, now));
        assert!(!MetadataSnapshot::default().is_fresh(DAY, now));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join("enhanced.json"), DAY);
        cache.save(&one_board(), 1234);

        let snapshot = cache.load();
        assert_eq!(snapshot.timestamp, 1234);
        assert_eq!(snapshot.data, one_board());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enhanced.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let snapshot = MetadataCache::new(&path, DAY).load();
        assert_eq!(snapshot, MetadataSnapshot::default());
    }
}

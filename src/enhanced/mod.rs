//! Enhanced board metadata
//!
//! Fetches per-board capability data (Android support, kernel version, EOL)
//! from the Chrome OS update directory, cached on disk for a fixed TTL.

mod cache;
mod models;

pub use cache::{MetadataCache, MetadataMap, MetadataSnapshot};
pub use models::EnhancedMetadata;

use std::time::Duration;

use futures_util::future::join_all;

use crate::builds::board_keys;
use crate::config::Settings;
use crate::fetcher::Fetcher;
use crate::utils::{format_age, ProgressTracker};
use crate::{log_debug, log_info};

const MODULE: &str = "enhanced";

/// Loads the board -> metadata map, from cache while it is fresh
pub struct EnhancedMetadataLoader {
    fetcher: Fetcher,
    cache: MetadataCache,
    settings: Settings,
}

impl EnhancedMetadataLoader {
    pub fn new(fetcher: Fetcher, settings: &Settings) -> Self {
        Self {
            fetcher,
            cache: MetadataCache::new(settings.enhanced_cache_path(), settings.enhanced_ttl()),
            settings: settings.clone(),
        }
    }

    /// Metadata for every board that has upstream data
    ///
    /// A fresh cache is returned without any network call. Otherwise the
    /// board list is rediscovered, every board is fetched in batches and the
    /// result replaces the cache.
    pub async fn load(&self) -> MetadataMap {
        log_info!(MODULE, "Loading enhanced device data...");

        let cached = self.cache.load();
        let now = chrono::Utc::now().timestamp_millis();
        if cached.is_fresh(self.cache.ttl(), now) {
            log_info!(
                MODULE,
                "Using cached enhanced device data ({} old)",
                format_age(cached.age_ms(now))
            );
            return cached.data;
        }

        log_info!(
            MODULE,
            "Cache expired or empty, fetching fresh enhanced device data..."
        );

        let boards = self.discover_boards().await;
        let data = self.fetch_all(&boards).await;
        log_info!(
            MODULE,
            "Successfully loaded enhanced data for {} boards",
            data.len()
        );

        self.cache.save(&data, chrono::Utc::now().timestamp_millis());
        data
    }

    /// Board keys from serving builds, or the fallback list
    async fn discover_boards(&self) -> Vec<String> {
        let boards = self
            .fetcher
            .fetch_json(
                &self.settings.serving_builds_url,
                "Error fetching crosBuilds data",
            )
            .await
            .map(|json| board_keys(&json))
            .unwrap_or_default();

        if boards.is_empty() {
            log_info!(MODULE, "Falling back to known boards list");
            return self.settings.fallback_boards.clone();
        }

        log_info!(MODULE, "Found {} boards in crosBuilds data", boards.len());
        boards
    }

    /// Fetch one board's metadata; any failure yields `None`
    async fn fetch_board(&self, board: &str) -> Option<EnhancedMetadata> {
        let url = self.settings.board_updates_url(board);
        match self.fetcher.get_json(&url).await {
            Ok(data) => Some(EnhancedMetadata::from_board_data(&data)),
            Err(e) => {
                log_debug!(MODULE, "No enhanced data for {}: {}", board, e);
                None
            }
        }
    }

    /// Fetch `boards` in fixed-size batches with a pause between batches
    pub async fn fetch_all(&self, boards: &[String]) -> MetadataMap {
        let batch_size = self.settings.enhanced_batch_size.max(1);
        let delay: Duration = self.settings.enhanced_batch_delay();
        let mut tracker =
            ProgressTracker::new("Enhanced metadata", MODULE, boards.len(), batch_size);
        let mut data = MetadataMap::new();

        let batches: Vec<&[String]> = boards.chunks(batch_size).collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            let results = join_all(batch.iter().map(|board| self.fetch_board(board))).await;

            let mut succeeded = 0;
            for (board, result) in batch.iter().zip(results) {
                if let Some(metadata) = result {
                    data.insert(board.clone(), metadata);
                    succeeded += 1;
                }
            }
            tracker.update(batch.len(), succeeded);

            if index + 1 < batch_count && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        tracker.finish();
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, serve_held, unreachable_url};
    use std::time::Instant;
    use std::path::Path;

    fn board_data(kernel: &str) -> String {
        format!(
            r#"{{"linux_kernel_versions": ["{}"], "android_app_support": true, "architecture": "x86_64"}}"#,
            kernel
        )
    }

    fn settings(cache_dir: &Path, builds_url: String, base_url: String) -> Settings {
        Settings {
            serving_builds_url: builds_url,
            board_updates_base_url: base_url,
            cache_dir: cache_dir.to_path_buf(),
            enhanced_batch_delay_ms: 1,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let unreachable = unreachable_url().await;
        let settings = settings(dir.path(), unreachable.clone(), unreachable);

        let mut data = MetadataMap::new();
        data.insert(
            "eve".to_string(),
            EnhancedMetadata {
                kernel_version: Some("4.4.0".to_string()),
                ..EnhancedMetadata::default()
            },
        );
        MetadataCache::new(settings.enhanced_cache_path(), settings.enhanced_ttl())
            .save(&data, chrono::Utc::now().timestamp_millis());

        let loader = EnhancedMetadataLoader::new(Fetcher::new().unwrap(), &settings);
        assert_eq!(loader.load().await, data);
    }

    #[tokio::test]
    async fn test_miss_fetches_discovered_boards_and_saves() {
        let base = serve(|path| match path {
            "/builds" => (200, r#"{"builds": {"eve": {}, "atlas": {}, "ghost": {}}}"#.to_string()),
            "/updates/eve/stable/data.json" => (200, board_data("4.4.302-abc")),
            "/updates/atlas/stable/data.json" => (200, board_data("5.15.0-r2")),
            _ => (404, "{}".to_string()),
        })
        .await;

        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(
            dir.path(),
            format!("{}/builds", base),
            format!("{}/updates", base),
        );
        settings.enhanced_batch_size = 2;

        // Stale cache entry must be replaced
        MetadataCache::new(settings.enhanced_cache_path(), settings.enhanced_ttl()).save(
            &MetadataMap::from([("old".to_string(), EnhancedMetadata::default())]),
            0,
        );

        let loader = EnhancedMetadataLoader::new(Fetcher::new().unwrap(), &settings);
        let data = loader.load().await;

        assert_eq!(data.len(), 2);
        assert_eq!(data["eve"].kernel_version.as_deref(), Some("4.4.302"));
        assert_eq!(data["atlas"].kernel_version.as_deref(), Some("5.15.0"));
        assert!(data["atlas"].android_app_support);
        assert!(!data.contains_key("ghost"));

        let saved = MetadataCache::new(settings.enhanced_cache_path(), settings.enhanced_ttl()).load();
        assert_eq!(saved.data, data);
        assert!(saved.timestamp > 0);
    }

    #[tokio::test]
    async fn test_fallback_board_list() {
        let base = serve(|path| match path {
            "/updates/eve/stable/data.json" => (200, board_data("4.4.0")),
            "/updates/lumpy/stable/data.json" => (200, "not json".to_string()),
            _ => (404, "{}".to_string()),
        })
        .await;

        let dir = tempfile::tempdir().unwrap();
        let settings = settings(
            dir.path(),
            unreachable_url().await,
            format!("{}/updates", base),
        );

        let loader = EnhancedMetadataLoader::new(Fetcher::new().unwrap(), &settings);
        let data = loader.load().await;

        let keys: Vec<&String> = data.keys().collect();
        assert_eq!(keys, vec!["eve"]);
    }

    #[tokio::test]
    async fn test_fetch_all_batches_with_pause_between() {
        let hold = Duration::from_millis(20);
        let delay = Duration::from_millis(300);
        let (base, log) = serve_held(|_| (200, board_data("5.4.0")), hold).await;

        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(
            dir.path(),
            unreachable_url().await,
            format!("{}/updates", base),
        );
        settings.enhanced_batch_size = 2;
        settings.enhanced_batch_delay_ms = delay.as_millis() as u64;

        let boards: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|b| b.to_string())
            .collect();
        let loader = EnhancedMetadataLoader::new(Fetcher::new().unwrap(), &settings);

        let started = Instant::now();
        let data = loader.fetch_all(&boards).await;
        let elapsed = started.elapsed();

        assert_eq!(data.len(), 5);
        assert!(log.max_in_flight() <= 2, "max in flight {}", log.max_in_flight());

        // Requests of one batch arrive together, batches are a pause apart
        let starts = log.starts();
        assert_eq!(starts.len(), 5);
        let mut groups: Vec<Vec<Instant>> = Vec::new();
        for start in starts {
            let same_batch = groups
                .last()
                .is_some_and(|group| start.duration_since(*group.last().unwrap()) < delay / 2);
            if same_batch {
                groups.last_mut().unwrap().push(start);
            } else {
                groups.push(vec![start]);
            }
        }
        let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        for pair in groups.windows(2) {
            let gap = pair[1][0].duration_since(*pair[0].last().unwrap());
            assert!(gap >= delay, "batches only {:?} apart", gap);
        }

        // No pause after the last batch
        assert!(elapsed < 3 * hold + 3 * delay, "took {:?}", elapsed);
    }
}

//! Build cycle for the device catalog
//!
//! Fetch serving builds and the recovery feed, then either reuse the cached
//! catalog (same content hash) or rebuild it and store the new envelope.

use std::time::Instant;

use serde_json::{json, Value};

use crate::builds::{
    categorize_boards, extract_builds, link_board_devices, process_boards_and_devices, CrosData,
};
use crate::cache::{generate_data_hash, CacheEnvelope, DataCache};
use crate::config::Settings;
use crate::fetcher::Fetcher;
use crate::recovery::{extract_recoveries, process_recovery_data};
use crate::{log_error, log_info};

const MODULE: &str = "pipeline";

pub struct Pipeline {
    fetcher: Fetcher,
    cache: DataCache,
    settings: Settings,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, settings: &Settings) -> Self {
        Self {
            fetcher,
            cache: DataCache::new(settings.data_cache_path()),
            settings: settings.clone(),
        }
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    /// Fetch both sources concurrently and build the catalog
    pub async fn run(&self) -> CrosData {
        log_info!(MODULE, "Starting Chrome OS data fetch...");

        let (serving, recovery) = tokio::join!(
            self.fetcher
                .fetch_json(&self.settings.serving_builds_url, "Error fetching serving builds"),
            self.fetcher
                .fetch_json(&self.settings.recovery_feed_url, "Error fetching recovery data"),
        );

        let Some(serving) = serving else {
            log_error!(MODULE, "No builds found in the response");
            return CrosData::empty();
        };

        self.build(&serving, recovery.as_ref())
    }

    /// Build the catalog from already fetched payloads
    ///
    /// Serving builds without a `builds` object give the empty catalog. A
    /// missing recovery feed is treated as an empty one.
    pub fn build(&self, serving_builds: &Value, recovery_feed: Option<&Value>) -> CrosData {
        let start = Instant::now();

        let Some(builds) = extract_builds(serving_builds) else {
            log_error!(MODULE, "No builds found in the response");
            return CrosData::empty();
        };

        let empty_feed = json!([]);
        let recovery_feed = match recovery_feed {
            Some(feed) if feed.is_array() => feed,
            _ => &empty_feed,
        };
        let records = extract_recoveries(recovery_feed);
        log_info!(MODULE, "Fetched {} recovery images", records.len());

        let data_hash = generate_data_hash(serving_builds, recovery_feed);
        if let Some(envelope) = self.cache.lookup(&data_hash) {
            log_info!(
                MODULE,
                "Using cached device-recovery mappings ({}m old)",
                envelope.age_ms() / 60_000
            );
            log_info!(
                MODULE,
                "Build completed in {}ms (cache hit)",
                start.elapsed().as_millis()
            );
            return envelope.data;
        }

        log_info!(
            MODULE,
            "Cache miss or invalid, rebuilding device-recovery mappings..."
        );

        let catalog = process_boards_and_devices(builds);
        let mut devices = catalog.devices;
        let mut boards = catalog.boards;

        process_recovery_data(&mut devices, &records);
        link_board_devices(&mut boards, &devices);
        log_info!(
            MODULE,
            "Processed {} devices with recovery data",
            devices.len()
        );

        let categorized = categorize_boards(boards);
        let data = CrosData {
            devices,
            boards: categorized.multi_device_boards,
            single_device_boards: categorized.single_device_boards,
        };

        self.cache
            .save(&CacheEnvelope::new(data_hash, data.clone(), records.len()));
        log_info!(
            MODULE,
            "Build completed in {}ms (full rebuild)",
            start.elapsed().as_millis()
        );

        data
    }
}

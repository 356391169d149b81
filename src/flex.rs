//! Chrome OS Flex data
//!
//! Flex is served as its own category upstream, with a separate recovery
//! feed. Devices go through the same normalizer as the main catalog.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builds::{extract_builds, process_boards_and_devices, DeviceMap};
use crate::config::Settings;
use crate::fetcher::Fetcher;
use crate::log_info;
use crate::recovery::{extract_recoveries, RecoveryRecord};

const MODULE: &str = "flex";

/// Flex devices and their recovery images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexData {
    pub devices: DeviceMap,
    pub recoveries: Vec<RecoveryRecord>,
}

impl FlexData {
    /// Build from the two raw payloads; unusable payloads give empty parts
    pub fn from_payloads(serving_builds: Option<&Value>, recovery_feed: Option<&Value>) -> Self {
        let devices = serving_builds
            .and_then(extract_builds)
            .map(|builds| process_boards_and_devices(builds).devices)
            .unwrap_or_default();
        let recoveries = recovery_feed.map(extract_recoveries).unwrap_or_default();
        Self {
            devices,
            recoveries,
        }
    }

    /// Recovery with the highest major platform version
    pub fn latest_recovery(&self) -> Option<&RecoveryRecord> {
        let major = |record: &RecoveryRecord| {
            record
                .version
                .as_deref()
                .and_then(|v| v.split('.').next())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0)
        };
        // First of equal majors wins, as with a stable descending sort
        self.recoveries
            .iter()
            .rev()
            .max_by_key(|record| major(record))
    }
}

/// Fetch Flex builds and recoveries concurrently
pub async fn load_flex(fetcher: &Fetcher, settings: &Settings) -> FlexData {
    log_info!(MODULE, "Fetching Chrome OS Flex data...");

    let (serving, recovery) = tokio::join!(
        fetcher.fetch_json(
            &settings.flex_serving_builds_url,
            "Error fetching Flex serving builds"
        ),
        fetcher.fetch_json(
            &settings.flex_recovery_feed_url,
            "Error fetching Flex recovery data"
        ),
    );

    let data = FlexData::from_payloads(serving.as_ref(), recovery.as_ref());
    log_info!(
        MODULE,
        "Loaded {} Flex devices and {} recovery images",
        data.devices.len(),
        data.recoveries.len()
    );
    data
}

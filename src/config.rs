//! Application configuration
//!
//! Compile-time defaults grouped by concern, plus the runtime [`Settings`]
//! that the CLI builds from an optional JSON file and command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::get_cache_dir;

/// Application identity
pub mod app {
    /// Application name, also used for the cache directory
    pub const NAME: &str = "cros-updates";
    /// User agent sent with every upstream request
    pub const USER_AGENT: &str = concat!("cros-updates/", env!("CARGO_PKG_VERSION"));
}

/// Upstream endpoints
pub mod urls {
    /// Serving builds for every board/model
    pub const SERVING_BUILDS: &str = "https://chromiumdash.appspot.com/cros/fetch_serving_builds";
    /// Recovery image feed
    pub const RECOVERY_FEED: &str =
        "https://dl.google.com/dl/edgedl/chromeos/recovery/recovery2.json";
    /// Serving builds for Chrome OS Flex
    pub const FLEX_SERVING_BUILDS: &str =
        "https://chromiumdash.appspot.com/cros/fetch_serving_builds?deviceCategory=ChromeOS%20Flex";
    /// Recovery image feed for Chrome OS Flex
    pub const FLEX_RECOVERY_FEED: &str =
        "https://dl.google.com/dl/edgedl/chromeos/recovery/cloudready_recovery2.json";
    /// Per-board supplemental data, `{board}/stable/data.json` is appended
    pub const BOARD_UPDATES_BASE: &str =
        "https://raw.githubusercontent.com/jay0lee/chromeos-update-directory/main/data/updates";
}

/// On-disk cache files
pub mod cache {
    /// Fallback cache directory when the platform has none
    pub const FALLBACK_DIR: &str = ".cache";
    /// Content-hash cache of the normalized device/board data
    pub const DATA_FILE: &str = "device-recovery-cache.json";
    /// TTL cache of the enhanced board metadata
    pub const ENHANCED_FILE: &str = "enhanced-devices-cache.json";
}

/// Enhanced metadata loader tuning
pub mod enhanced {
    /// Time a cached metadata map stays fresh
    pub const CACHE_TTL_SECS: u64 = 24 * 60 * 60;
    /// Requests issued together in one batch
    pub const BATCH_SIZE: usize = 10;
    /// Pause between batches
    pub const BATCH_DELAY_MS: u64 = 50;
    /// Boards used when the serving builds list cannot be fetched
    pub const FALLBACK_BOARDS: &[&str] = &[
        "brya", "volteer", "dedede", "hatch", "octopus", "coral", "atlas", "nocturne", "eve",
        "fizz", "poppy", "reef", "gru", "kevin", "oak", "braswell", "baytrail", "auron", "buddy",
        "butterfly", "link", "lumpy",
    ];
}

/// Output file names consumed by the site templates
pub mod output {
    pub const CROS_BUILDS: &str = "crosBuilds.json";
    pub const DEVICE_INDEX: &str = "devices-data.json";
    pub const REDIRECTS: &str = "_redirects";
    pub const ENHANCED: &str = "enhanced-devices.json";
    pub const FLEX: &str = "flex.json";
}

/// Runtime settings
///
/// Every field has a default so a partial JSON settings file is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    pub serving_builds_url: String,
    pub recovery_feed_url: String,
    pub flex_serving_builds_url: String,
    pub flex_recovery_feed_url: String,
    pub board_updates_base_url: String,
    pub cache_dir: PathBuf,
    pub enhanced_ttl_secs: u64,
    pub enhanced_batch_size: usize,
    pub enhanced_batch_delay_ms: u64,
    pub fallback_boards: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serving_builds_url: urls::SERVING_BUILDS.to_string(),
            recovery_feed_url: urls::RECOVERY_FEED.to_string(),
            flex_serving_builds_url: urls::FLEX_SERVING_BUILDS.to_string(),
            flex_recovery_feed_url: urls::FLEX_RECOVERY_FEED.to_string(),
            board_updates_base_url: urls::BOARD_UPDATES_BASE.to_string(),
            cache_dir: get_cache_dir(app::NAME),
            enhanced_ttl_secs: enhanced::CACHE_TTL_SECS,
            enhanced_batch_size: enhanced::BATCH_SIZE,
            enhanced_batch_delay_ms: enhanced::BATCH_DELAY_MS,
            fallback_boards: enhanced::FALLBACK_BOARDS
                .iter()
                .map(|b| b.to_string())
                .collect(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse settings {}: {}", path.display(), e))
    }

    pub fn data_cache_path(&self) -> PathBuf {
        self.cache_dir.join(cache::DATA_FILE)
    }

    pub fn enhanced_cache_path(&self) -> PathBuf {
        self.cache_dir.join(cache::ENHANCED_FILE)
    }

    pub fn enhanced_ttl(&self) -> Duration {
        Duration::from_secs(self.enhanced_ttl_secs)
    }

    pub fn enhanced_batch_delay(&self) -> Duration {
        Duration::from_millis(self.enhanced_batch_delay_ms)
    }

    /// Supplemental data URL for one board
    pub fn board_updates_url(&self, board: &str) -> String {
        format!(
            "{}/{}/stable/data.json",
            self.board_updates_base_url.trim_end_matches('/'),
            board
        )
    }
}

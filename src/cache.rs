//! Content-hash cache
//!
//! Persists the normalized device/board data together with a digest of the
//! upstream payloads it was built from. A stored envelope is reused only when
//! the digest of the current payloads matches; there is no expiry.

use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::builds::CrosData;
use crate::utils::write_json_pretty;
use crate::{log_debug, log_error, log_warn};

const MODULE: &str = "cache";

/// Length of the per-payload digest prefix folded into the data hash
const INNER_DIGEST_LEN: usize = 8;

/// Counts recorded alongside the cached data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub device_count: usize,
    pub board_count: usize,
    pub single_device_board_count: usize,
    pub recovery_count: usize,
}

/// Cached pipeline output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEnvelope {
    pub data_hash: String,
    /// Unix time in milliseconds when the envelope was built
    pub timestamp: i64,
    pub data: CrosData,
    pub stats: CacheStats,
}

impl CacheEnvelope {
    /// Envelope for `data` stamped with the current time
    pub fn new(data_hash: String, data: CrosData, recovery_count: usize) -> Self {
        let stats = CacheStats {
            device_count: data.devices.len(),
            board_count: data.boards.len(),
            single_device_board_count: data.single_device_boards.len(),
            recovery_count,
        };
        Self {
            data_hash,
            timestamp: chrono::Utc::now().timestamp_millis(),
            data,
            stats,
        }
    }

    /// Milliseconds since the envelope was built
    pub fn age_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis() - self.timestamp
    }
}

fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

fn payload_digest(value: &Value) -> String {
    let serialized = serde_json::to_string(value).unwrap_or_default();
    let mut digest = md5_hex(serialized.as_bytes());
    digest.truncate(INNER_DIGEST_LEN);
    digest
}

/// Digest identifying one pair of upstream payloads
///
/// MD5 over a small JSON object holding the board count, the recovery count
/// and the first 8 hex digits of the MD5 of each payload. Identical payloads
/// always give the same hash; any content change gives a different one.
pub fn generate_data_hash(serving_builds: &Value, recovery_data: &Value) -> String {
    let build_count = serving_builds
        .get("builds")
        .and_then(Value::as_object)
        .map(|builds| builds.len())
        .unwrap_or(0);
    let recovery_count = recovery_data.as_array().map(Vec::len).unwrap_or(0);

    let combined = json!({
        "buildCount": build_count,
        "recoveryCount": recovery_count,
        "servingHash": payload_digest(serving_builds),
        "recoveryHash": payload_digest(recovery_data),
    });

    md5_hex(combined.to_string().as_bytes())
}

/// File-backed store for one [`CacheEnvelope`]
#[derive(Debug, Clone)]
pub struct DataCache {
    path: PathBuf,
}

impl DataCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored envelope
    ///
    /// A missing file is a plain miss; an unreadable or corrupt file is
    /// logged and also treated as a miss.
    pub fn load(&self) -> Option<CacheEnvelope> {
        if !self.path.exists() {
            log_debug!(MODULE, "No cache file at {}", self.path.display());
            return None;
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                log_warn!(MODULE, "Cache file unreadable, will rebuild: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEnvelope>(&content) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                log_warn!(MODULE, "Cache file corrupted, will rebuild: {}", e);
                None
            }
        }
    }

    /// Write `envelope`, logging instead of failing
    pub fn save(&self, envelope: &CacheEnvelope) {
        match write_json_pretty(&self.path, envelope) {
            Ok(()) => log_debug!(MODULE, "Cache written to {}", self.path.display()),
            Err(e) => log_error!(MODULE, "Failed to save cache: {}", e),
        }
    }

    /// Stored envelope if it was built from payloads hashing to `data_hash`
    pub fn lookup(&self, data_hash: &str) -> Option<CacheEnvelope> {
        self.load()
            .filter(|envelope| envelope.data_hash == data_hash)
    }
}

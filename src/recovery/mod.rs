//! Recovery image module
//!
//! Parses the recovery feed and attaches images to devices.

mod matcher;
mod models;

pub use matcher::{deduplicate_and_sort, matches_board, process_recovery_data};
pub use models::{RecoveryBuckets, RecoveryChannel, RecoveryEntry, RecoveryRecord};

use serde_json::Value;

use crate::log_warn;

const MODULE: &str = "recovery";

/// Parse the feed array, skipping entries that are not recovery records
///
/// A payload that is not an array yields no records.
pub fn extract_recoveries(feed: &Value) -> Vec<RecoveryRecord> {
    let Some(items) = feed.as_array() else {
        if !feed.is_null() {
            log_warn!(MODULE, "Recovery feed is not an array, ignoring it");
        }
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<RecoveryRecord>(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                log_warn!(MODULE, "Skipping malformed recovery entry #{}: {}", index, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_recoveries_skips_bad_entries() {
        let feed = json!([
            {"file": "eve.bin", "channel": "beta"},
            "not a record",
            {"file": ["wrong type"]},
            {"url": "https://x/atlas.bin"}
        ]);
        let records = extract_recoveries(&feed);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file.as_deref(), Some("eve.bin"));
        assert_eq!(records[1].url.as_deref(), Some("https://x/atlas.bin"));
    }

    #[test]
    fn test_non_array_feed_is_empty() {
        assert!(extract_recoveries(&json!({"a": 1})).is_empty());
        assert!(extract_recoveries(&Value::Null).is_empty());
    }
}

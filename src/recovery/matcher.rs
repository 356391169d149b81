//! Recovery image matching
//!
//! Attaches recovery feed records to devices by board-name substring,
//! buckets them per channel, then deduplicates and sorts each bucket.

use std::collections::HashSet;

use crate::builds::{Device, DeviceMap};
use crate::log_debug;
use crate::utils::version_sort_key;

use super::models::{RecoveryBuckets, RecoveryChannel, RecoveryEntry, RecoveryRecord};

const MODULE: &str = "recovery::matcher";

/// Whether `record` belongs to a device of `main_board`
///
/// Case-insensitive substring match of the board name against the record's
/// file name or URL. This is a heuristic: a board whose name is contained in
/// another board's name also matches that board's images.
pub fn matches_board(record: &RecoveryRecord, main_board: &str) -> bool {
    let board = main_board.to_lowercase();
    if board.is_empty() {
        return false;
    }

    let contains = |field: &Option<String>| {
        field
            .as_deref()
            .map(|value| value.to_lowercase().contains(&board))
            .unwrap_or(false)
    };
    contains(&record.file) || contains(&record.url)
}

/// Seed buckets from the device's legacy push recoveries (stable only)
fn initialize_recoveries(device_key: &str, device: &Device) -> RecoveryBuckets {
    let mut pushed: Vec<(&String, &String)> = device.push_recoveries.iter().collect();
    pushed.sort_by(|a, b| {
        let a = a.0.trim().parse::<f64>().unwrap_or(0.0);
        let b = b.0.trim().parse::<f64>().unwrap_or(0.0);
        b.total_cmp(&a)
    });

    RecoveryBuckets {
        stable: pushed
            .into_iter()
            .map(|(version, url)| RecoveryEntry::from_push_recovery(device_key, version, url))
            .collect(),
        ..RecoveryBuckets::default()
    }
}

/// Channel a matched feed record is merged into
///
/// Stable images come only from the push-recovery seed, so a feed record
/// labelled stable is not merged.
fn feed_channel(record: &RecoveryRecord) -> Option<RecoveryChannel> {
    let label = record.channel.as_deref()?;
    let channel = RecoveryChannel::parse(label)?;
    if channel == RecoveryChannel::Stable {
        return None;
    }
    if label.eq_ignore_ascii_case("lts") {
        log_debug!(MODULE, "Feed channel 'lts' filed under 'ltr'");
    }
    Some(channel)
}

/// Drop repeated (version, url) pairs keeping the first, then sort by
/// numeric version, highest first
pub fn deduplicate_and_sort(entries: Vec<RecoveryEntry>) -> Vec<RecoveryEntry> {
    let mut seen = HashSet::new();
    let mut unique: Vec<RecoveryEntry> = entries
        .into_iter()
        .filter(|entry| {
            let (version, url) = entry.dedup_key();
            seen.insert((version.map(str::to_string), url.map(str::to_string)))
        })
        .collect();

    unique.sort_by(|a, b| {
        version_sort_key(b.version.as_deref()).total_cmp(&version_sort_key(a.version.as_deref()))
    });
    unique
}

/// Attach matching recovery images to every device
///
/// Devices without `recoveries` are first seeded from their push recoveries.
/// Every bucket is deduplicated and sorted afterwards.
pub fn process_recovery_data(devices: &mut DeviceMap, records: &[RecoveryRecord]) {
    let mut matched_total = 0usize;

    for (device_key, device) in devices.iter_mut() {
        let mut recoveries = match device.recoveries.take() {
            Some(existing) => existing,
            None => initialize_recoveries(device_key, device),
        };

        for record in records {
            if !matches_board(record, &device.main_board) {
                continue;
            }
            if let Some(channel) = feed_channel(record) {
                recoveries
                    .get_mut(channel)
                    .push(RecoveryEntry::from_record(record, channel));
                matched_total += 1;
            }
        }

        for channel in RecoveryChannel::ALL {
            let bucket = std::mem::take(recoveries.get_mut(channel));
            *recoveries.get_mut(channel) = deduplicate_and_sort(bucket);
        }

        device.recoveries = Some(recoveries);
    }

    log_debug!(
        MODULE,
        "Matched {} recovery entries across {} devices",
        matched_total,
        devices.len()
    );
}

//! Recovery image data models

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sizes arrive as numbers, occasionally as numeric strings
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Release track a recovery image belongs to
///
/// The feed labels the long-term-release track `lts` while the site reads
/// `ltr`; both parse to [`RecoveryChannel::Ltr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryChannel {
    Stable,
    Beta,
    Ltc,
    #[serde(alias = "lts")]
    Ltr,
}

impl RecoveryChannel {
    pub const ALL: [RecoveryChannel; 4] = [
        RecoveryChannel::Stable,
        RecoveryChannel::Beta,
        RecoveryChannel::Ltc,
        RecoveryChannel::Ltr,
    ];

    /// Parse a feed channel label, case-insensitively
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "stable" => Some(RecoveryChannel::Stable),
            "beta" => Some(RecoveryChannel::Beta),
            "ltc" => Some(RecoveryChannel::Ltc),
            "ltr" | "lts" => Some(RecoveryChannel::Ltr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryChannel::Stable => "stable",
            RecoveryChannel::Beta => "beta",
            RecoveryChannel::Ltc => "ltc",
            RecoveryChannel::Ltr => "ltr",
        }
    }
}

/// Raw recovery feed entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub chrome_version: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub zipfilesize: Option<u64>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
}

/// Recovery image attached to a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub channel: RecoveryChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipfilesize: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

impl RecoveryEntry {
    /// Entry for a feed record classified into `channel`
    pub fn from_record(record: &RecoveryRecord, channel: RecoveryChannel) -> Self {
        Self {
            version: record.version.clone(),
            chrome_version: record.chrome_version.clone(),
            url: record.url.clone(),
            channel,
            name: record.name.clone(),
            manufacturer: record.manufacturer.clone(),
            model: record.model.clone(),
            filesize: record.filesize,
            zipfilesize: record.zipfilesize,
            md5: record.md5.clone(),
            sha1: record.sha1.clone(),
        }
    }

    /// Stable-channel entry seeded from a legacy push recovery
    pub fn from_push_recovery(device_key: &str, version: &str, url: &str) -> Self {
        Self {
            version: Some(version.to_string()),
            chrome_version: Some(version.to_string()),
            url: Some(url.to_string()),
            channel: RecoveryChannel::Stable,
            name: Some(format!("{} Recovery", device_key)),
            manufacturer: None,
            model: None,
            filesize: None,
            zipfilesize: None,
            md5: None,
            sha1: None,
        }
    }

    /// Identity used for deduplication: chrome version (or version) and URL
    pub fn dedup_key(&self) -> (Option<&str>, Option<&str>) {
        let version = self
            .chrome_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(self.version.as_deref().filter(|v| !v.is_empty()));
        (version, self.url.as_deref())
    }
}

/// Per-channel recovery lists of one device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryBuckets {
    #[serde(default)]
    pub stable: Vec<RecoveryEntry>,
    #[serde(default)]
    pub beta: Vec<RecoveryEntry>,
    #[serde(default)]
    pub ltc: Vec<RecoveryEntry>,
    #[serde(default, alias = "lts")]
    pub ltr: Vec<RecoveryEntry>,
}

impl RecoveryBuckets {
    pub fn get(&self, channel: RecoveryChannel) -> &Vec<RecoveryEntry> {
        match channel {
            RecoveryChannel::Stable => &self.stable,
            RecoveryChannel::Beta => &self.beta,
            RecoveryChannel::Ltc => &self.ltc,
            RecoveryChannel::Ltr => &self.ltr,
        }
    }

    pub fn get_mut(&mut self, channel: RecoveryChannel) -> &mut Vec<RecoveryEntry> {
        match channel {
            RecoveryChannel::Stable => &mut self.stable,
            RecoveryChannel::Beta => &mut self.beta,
            RecoveryChannel::Ltc => &mut self.ltc,
            RecoveryChannel::Ltr => &mut self.ltr,
        }
    }

    pub fn total(&self) -> usize {
        RecoveryChannel::ALL.iter().map(|c| self.get(*c).len()).sum()
    }
}

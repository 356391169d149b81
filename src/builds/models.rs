//! Board and device data models
//!
//! Raw serving-builds records as sent by the upstream dashboard, and the
//! canonical device/board records produced from them.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::recovery::RecoveryBuckets;

/// Devices keyed by model key, in discovery order
pub type DeviceMap = IndexMap<String, Device>;
/// Boards keyed by board key
pub type BoardMap = IndexMap<String, Board>;

/// Accept strings, numbers and booleans as text; anything else is absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A serving channel is present only as a JSON object; anything else is absent
fn lenient_serving<'de, D>(deserializer: D) -> Result<Option<ServingVersion>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// String items of an array; other items and non-arrays are dropped
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Version -> URL pairs whose URL is a string
fn lenient_url_map<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => entries
            .into_iter()
            .filter_map(|(version, url)| match url {
                Value::String(url) => Some((version, url)),
                _ => None,
            })
            .collect(),
        _ => IndexMap::new(),
    })
}

/// Booleans as-is, `"true"` and non-zero numbers as true, anything else false
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    })
}

/// Model entries of a board; a non-object `models` counts as absent
fn lenient_models<'de, D>(deserializer: D) -> Result<Option<IndexMap<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(models)) => Some(models.into_iter().collect()),
        _ => None,
    })
}

/// Version currently served on one channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingVersion {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub chrome_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub compared_to_most_common: Option<String>,
}

/// Wire shape of the stable and long-term channels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StableAndLongTerm {
    #[serde(
        default,
        deserialize_with = "lenient_serving",
        skip_serializing_if = "Option::is_none"
    )]
    pub serving_stable: Option<ServingVersion>,
    #[serde(
        default,
        deserialize_with = "lenient_serving",
        skip_serializing_if = "Option::is_none"
    )]
    pub serving_ltc: Option<ServingVersion>,
    #[serde(
        default,
        deserialize_with = "lenient_serving",
        skip_serializing_if = "Option::is_none"
    )]
    pub serving_ltr: Option<ServingVersion>,
}

/// Which release tracks a device is served on
///
/// Decided once while parsing from the presence of `servingStable`,
/// `servingLtc` and `servingLtr`, and written back in the same fields. A
/// channel that is `null` or not an object counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StableAndLongTerm", into = "StableAndLongTerm")]
pub enum ChannelAvailability {
    /// Served on stable, possibly also on long-term channels
    Standard {
        stable: ServingVersion,
        ltc: Option<ServingVersion>,
        ltr: Option<ServingVersion>,
    },
    /// No stable channel, at least one of LTC/LTR
    ExtendedUpdatesOnly {
        ltc: Option<ServingVersion>,
        ltr: Option<ServingVersion>,
    },
    /// Neither stable nor long-term channels
    #[default]
    Unserved,
}

impl From<StableAndLongTerm> for ChannelAvailability {
    fn from(fields: StableAndLongTerm) -> Self {
        match (fields.serving_stable, fields.serving_ltc, fields.serving_ltr) {
            (Some(stable), ltc, ltr) => ChannelAvailability::Standard { stable, ltc, ltr },
            (None, None, None) => ChannelAvailability::Unserved,
            (None, ltc, ltr) => ChannelAvailability::ExtendedUpdatesOnly { ltc, ltr },
        }
    }
}

impl From<ChannelAvailability> for StableAndLongTerm {
    fn from(availability: ChannelAvailability) -> Self {
        match availability {
            ChannelAvailability::Standard { stable, ltc, ltr } => StableAndLongTerm {
                serving_stable: Some(stable),
                serving_ltc: ltc,
                serving_ltr: ltr,
            },
            ChannelAvailability::ExtendedUpdatesOnly { ltc, ltr } => StableAndLongTerm {
                serving_stable: None,
                serving_ltc: ltc,
                serving_ltr: ltr,
            },
            ChannelAvailability::Unserved => StableAndLongTerm::default(),
        }
    }
}

impl ChannelAvailability {
    pub fn stable(&self) -> Option<&ServingVersion> {
        match self {
            ChannelAvailability::Standard { stable, .. } => Some(stable),
            _ => None,
        }
    }

    pub fn ltc(&self) -> Option<&ServingVersion> {
        match self {
            ChannelAvailability::Standard { ltc, .. }
            | ChannelAvailability::ExtendedUpdatesOnly { ltc, .. } => ltc.as_ref(),
            ChannelAvailability::Unserved => None,
        }
    }

    pub fn ltr(&self) -> Option<&ServingVersion> {
        match self {
            ChannelAvailability::Standard { ltr, .. }
            | ChannelAvailability::ExtendedUpdatesOnly { ltr, .. } => ltr.as_ref(),
            ChannelAvailability::Unserved => None,
        }
    }

    pub fn is_extended_updates_only(&self) -> bool {
        matches!(self, ChannelAvailability::ExtendedUpdatesOnly { .. })
    }
}

/// All serving channels of a board or device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingChannels {
    #[serde(flatten)]
    pub availability: ChannelAvailability,
    #[serde(
        default,
        deserialize_with = "lenient_serving",
        skip_serializing_if = "Option::is_none"
    )]
    pub serving_beta: Option<ServingVersion>,
    #[serde(
        default,
        deserialize_with = "lenient_serving",
        skip_serializing_if = "Option::is_none"
    )]
    pub serving_dev: Option<ServingVersion>,
    #[serde(
        default,
        deserialize_with = "lenient_serving",
        skip_serializing_if = "Option::is_none"
    )]
    pub serving_canary: Option<ServingVersion>,
}

/// Raw per-device fields, either on a board entry or on one of its models
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeviceRecord {
    #[serde(flatten)]
    pub serving: ServingChannels,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub brand_names: Vec<String>,
    #[serde(default, deserialize_with = "lenient_url_map")]
    pub push_recoveries: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_aue: bool,
}

/// Raw board entry from `builds`
///
/// Every field is parsed leniently: a mistyped value is treated as absent
/// instead of rejecting the board. Models are kept as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBoardRecord {
    #[serde(flatten)]
    pub device: RawDeviceRecord,
    #[serde(default, deserialize_with = "lenient_models")]
    pub models: Option<IndexMap<String, Value>>,
}

/// Canonical device record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub main_board: String,
    pub is_extended_updates: bool,
    #[serde(default)]
    pub is_aue: bool,
    #[serde(default)]
    pub brand_names: Vec<String>,
    #[serde(flatten)]
    pub serving: ServingChannels,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub push_recoveries: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recoveries: Option<RecoveryBuckets>,
}

impl Device {
    /// Build a device owned by `main_board` from its raw record
    pub fn from_raw(main_board: &str, raw: RawDeviceRecord) -> Self {
        let is_extended_updates = !raw.is_aue && raw.serving.availability.is_extended_updates_only();
        Self {
            main_board: main_board.to_string(),
            is_extended_updates,
            is_aue: raw.is_aue,
            brand_names: raw.brand_names,
            serving: raw.serving,
            push_recoveries: raw.push_recoveries,
            recoveries: None,
        }
    }
}

/// Canonical board record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub board: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brand_names: Vec<String>,
    #[serde(default)]
    pub is_aue: bool,
    #[serde(flatten)]
    pub serving: ServingChannels,
    pub devices: DeviceMap,
}

impl Board {
    /// Board with the board-level fields of `raw` and no devices yet
    pub fn from_raw(board_key: &str, raw: &RawDeviceRecord) -> Self {
        Self {
            board: board_key.to_string(),
            brand_names: raw.brand_names.clone(),
            is_aue: raw.is_aue,
            serving: raw.serving.clone(),
            devices: DeviceMap::new(),
        }
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

/// Devices and boards produced by the normalizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub devices: DeviceMap,
    pub boards: BoardMap,
}

/// Canonical data model handed to the site templates
///
/// `boards` holds only boards with more than one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosData {
    pub devices: DeviceMap,
    pub boards: BoardMap,
    pub single_device_boards: BoardMap,
}

impl CrosData {
    /// Empty model used when the primary source is unavailable
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.boards.is_empty() && self.single_device_boards.is_empty()
    }
}

//! Read-only views over the canonical data for the site templates

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::models::{CrosData, ServingVersion};

/// Permanent redirect from a single-device board page to its device page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub from: String,
    pub to: String,
}

impl std::fmt::Display for Redirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} 301", self.from, self.to)
    }
}

/// Redirects for every single-device board that has exactly one device
pub fn single_device_redirects(data: &CrosData) -> Vec<Redirect> {
    data.single_device_boards
        .iter()
        .filter(|(_, board)| board.devices.len() == 1)
        .filter_map(|(board_key, board)| {
            board.devices.keys().next().map(|device_key| Redirect {
                from: format!("/board/{}", board_key),
                to: format!("/device/{}", device_key),
            })
        })
        .collect()
}

/// Device key a single-device board page should redirect to
pub fn resolve_board_redirect<'a>(data: &'a CrosData, board: &str) -> Option<&'a str> {
    data.single_device_boards
        .get(board)
        .and_then(|b| b.devices.keys().next())
        .map(String::as_str)
}

/// Chrome and platform version of one channel, null when not served
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVersions {
    pub chrome_version: Option<String>,
    pub platform_version: Option<String>,
}

impl From<Option<&ServingVersion>> for ChannelVersions {
    fn from(serving: Option<&ServingVersion>) -> Self {
        Self {
            chrome_version: serving.and_then(|s| s.chrome_version.clone()),
            platform_version: serving.and_then(|s| s.version.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceVersions {
    pub stable: ChannelVersions,
    pub beta: ChannelVersions,
    pub dev: ChannelVersions,
    pub canary: ChannelVersions,
}

/// Compact per-device record for client-side search and pinning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub key: String,
    pub brand_names: Vec<String>,
    pub main_board: String,
    pub is_aue: bool,
    pub versions: DeviceVersions,
}

/// Summaries of every device, keyed like `data.devices`
pub fn device_index(data: &CrosData) -> IndexMap<String, DeviceSummary> {
    data.devices
        .iter()
        .map(|(key, device)| {
            let serving = &device.serving;
            let summary = DeviceSummary {
                key: key.clone(),
                brand_names: device.brand_names.clone(),
                main_board: device.main_board.clone(),
                is_aue: device.is_aue,
                versions: DeviceVersions {
                    stable: serving.availability.stable().into(),
                    beta: serving.serving_beta.as_ref().into(),
                    dev: serving.serving_dev.as_ref().into(),
                    canary: serving.serving_canary.as_ref().into(),
                },
            };
            (key.clone(), summary)
        })
        .collect()
}

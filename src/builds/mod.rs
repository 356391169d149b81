//! Serving builds module
//!
//! Handles parsing the serving-builds payload into canonical devices and
//! boards, and the board views the site templates read.

mod categorize;
mod models;
mod normalize;
mod views;

pub use categorize::{categorize_boards, CategorizedBoards};
pub use models::{
    Board, BoardMap, Catalog, ChannelAvailability, CrosData, Device, DeviceMap, RawBoardRecord,
    RawDeviceRecord, ServingChannels, ServingVersion,
};
pub use normalize::{link_board_devices, process_boards_and_devices};
pub use views::{
    device_index, resolve_board_redirect, single_device_redirects, ChannelVersions, DeviceSummary,
    DeviceVersions, Redirect,
};

use serde_json::{Map, Value};

/// The `builds` object of a serving-builds response, if present
pub fn extract_builds(serving_builds: &Value) -> Option<&Map<String, Value>> {
    serving_builds.get("builds").and_then(Value::as_object)
}

/// Board keys of a serving-builds response, in upstream order
pub fn board_keys(serving_builds: &Value) -> Vec<String> {
    extract_builds(serving_builds)
        .map(|builds| builds.keys().cloned().collect())
        .unwrap_or_default()
}

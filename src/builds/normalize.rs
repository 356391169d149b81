//! Board/device normalization
//!
//! Expands the upstream `builds` map into a flat device map and a board map.

use serde_json::{Map, Value};

use crate::{log_debug, log_warn};

use super::models::{Board, BoardMap, Catalog, Device, DeviceMap, RawBoardRecord, RawDeviceRecord};

const MODULE: &str = "builds::normalize";

/// Parse one board entry, `None` (with a warning) when it is unusable
fn parse_board(board_key: &str, value: &Value) -> Option<RawBoardRecord> {
    if !value.is_object() {
        log_warn!(MODULE, "Skipping undefined value for board: {}", board_key);
        return None;
    }

    match serde_json::from_value::<RawBoardRecord>(value.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            log_warn!(MODULE, "Skipping malformed board {}: {}", board_key, e);
            None
        }
    }
}

fn parse_model(board_key: &str, model_key: &str, value: &Value) -> Option<RawDeviceRecord> {
    if !value.is_object() {
        log_warn!(
            MODULE,
            "Skipping undefined value for model: {} (board {})",
            model_key,
            board_key
        );
        return None;
    }

    match serde_json::from_value::<RawDeviceRecord>(value.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            log_warn!(
                MODULE,
                "Skipping malformed model {} (board {}): {}",
                model_key,
                board_key,
                e
            );
            None
        }
    }
}

fn insert_device(devices: &mut DeviceMap, board: &mut Board, device_key: &str, device: Device) {
    if let Some(previous) = devices.insert(device_key.to_string(), device.clone()) {
        if previous.main_board != device.main_board {
            log_debug!(
                MODULE,
                "Device key {} on board {} replaces the one from board {}",
                device_key,
                device.main_board,
                previous.main_board
            );
        }
    }
    board.devices.insert(device_key.to_string(), device);
}

/// Build the device and board maps from the upstream `builds` object
///
/// A board with `models` contributes one device per model; any other board
/// is itself a single device keyed by the board key. Device keys are assumed
/// unique across boards, a collision keeps the last one in `devices`.
pub fn process_boards_and_devices(builds: &Map<String, Value>) -> Catalog {
    let mut devices = DeviceMap::new();
    let mut boards = BoardMap::new();

    for (board_key, value) in builds {
        let Some(record) = parse_board(board_key, value) else {
            continue;
        };

        let mut board = Board::from_raw(board_key, &record.device);

        match record.models {
            Some(models) => {
                for (model_key, model_value) in &models {
                    let Some(model) = parse_model(board_key, model_key, model_value) else {
                        continue;
                    };
                    let device = Device::from_raw(board_key, model);
                    insert_device(&mut devices, &mut board, model_key, device);
                }
            }
            None => {
                let device = Device::from_raw(board_key, record.device);
                insert_device(&mut devices, &mut board, board_key, device);
            }
        }

        boards.insert(board_key.clone(), board);
    }

    log_debug!(
        MODULE,
        "Normalized {} boards into {} devices",
        boards.len(),
        devices.len()
    );

    Catalog { devices, boards }
}

/// Refresh each board's device entries from the global device map
///
/// Only entries still owned by the board (`mainBoard` equal to the board key)
/// are replaced, so a cross-board key collision does not move a device.
pub fn link_board_devices(boards: &mut BoardMap, devices: &DeviceMap) {
    for (board_key, board) in boards.iter_mut() {
        for (device_key, entry) in board.devices.iter_mut() {
            if let Some(device) = devices.get(device_key) {
                if &device.main_board == board_key {
                    *entry = device.clone();
                }
            }
        }
    }
}

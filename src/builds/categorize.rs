//! Board categorization
//!
//! Splits boards into multi-device and single-device sets in stable key order.

use super::models::{Board, BoardMap};

/// Boards partitioned by device count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedBoards {
    pub multi_device_boards: BoardMap,
    pub single_device_boards: BoardMap,
}

/// Partition `boards` by device count, iterating keys lexicographically
///
/// A board with more than one device is multi-device; every other board,
/// including one with no devices, is single-device.
pub fn categorize_boards(boards: BoardMap) -> CategorizedBoards {
    let mut sorted: Vec<(String, Board)> = boards.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut categorized = CategorizedBoards::default();
    for (key, board) in sorted {
        if board.device_count() > 1 {
            categorized.multi_device_boards.insert(key, board);
        } else {
            categorized.single_device_boards.insert(key, board);
        }
    }
    categorized
}

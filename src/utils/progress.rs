//! Progress tracking utility
//!
//! Counts completed items for batched network work (enhanced metadata
//! fetches) and logs throughput at a fixed item interval.

use std::time::Instant;

use crate::{log_debug, log_info};

/// Progress tracker for batched operations with rate calculation
pub struct ProgressTracker {
    /// Operation name for logging (e.g., "Enhanced metadata")
    operation_name: String,
    /// Module name for logging
    module_name: String,
    /// Total items to process
    total_items: usize,
    /// Items processed so far
    processed_items: usize,
    /// Items that produced a result
    succeeded_items: usize,
    /// Start time of the operation
    start_time: Instant,
    /// Items processed at the last log
    last_log_items: usize,
    /// Interval in items between progress logs
    log_interval: usize,
}

/// Progress update data
#[derive(Debug)]
pub struct ProgressUpdate {
    pub processed: usize,
    pub total: usize,
    pub percent: f64,
}

/// Final summary data
#[derive(Debug)]
pub struct ProgressSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub elapsed_secs: f64,
    pub items_per_sec: f64,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `operation` - Name of the operation
    /// * `module` - Module name for logging
    /// * `total_items` - Total items to process (0 if unknown)
    /// * `log_interval` - Interval in items between progress logs
    pub fn new(operation: &str, module: &str, total_items: usize, log_interval: usize) -> Self {
        Self {
            operation_name: operation.to_string(),
            module_name: module.to_string(),
            total_items,
            processed_items: 0,
            succeeded_items: 0,
            start_time: Instant::now(),
            last_log_items: 0,
            log_interval,
        }
    }

    /// Record a finished batch and log if an interval boundary was crossed
    ///
    /// Returns Some(ProgressUpdate) if it's time to log, None otherwise
    pub fn update(&mut self, processed: usize, succeeded: usize) -> Option<ProgressUpdate> {
        self.processed_items += processed;
        self.succeeded_items += succeeded;

        if self.log_interval == 0 {
            return None;
        }

        let current_interval = self.processed_items / self.log_interval;
        let last_interval = self.last_log_items / self.log_interval;
        if current_interval <= last_interval {
            return None;
        }

        self.last_log_items = self.processed_items;
        let update = ProgressUpdate {
            processed: self.processed_items,
            total: self.total_items,
            percent: if self.total_items > 0 {
                (self.processed_items as f64 / self.total_items as f64) * 100.0
            } else {
                0.0
            },
        };

        log_debug!(
            &self.module_name,
            "{} progress: {} / {} ({:.1}%)",
            self.operation_name,
            update.processed,
            update.total,
            update.percent
        );

        Some(update)
    }

    /// Get final summary and log completion
    pub fn finish(&self) -> ProgressSummary {
        let elapsed_secs = self.start_time.elapsed().as_secs_f64();
        let summary = ProgressSummary {
            processed: self.processed_items,
            succeeded: self.succeeded_items,
            elapsed_secs,
            items_per_sec: if elapsed_secs > 0.0 {
                self.processed_items as f64 / elapsed_secs
            } else {
                0.0
            },
        };

        log_info!(
            &self.module_name,
            "{} complete: {} of {} succeeded in {:.1}s ({:.1}/s)",
            self.operation_name,
            summary.succeeded,
            summary.processed,
            summary.elapsed_secs,
            summary.items_per_sec
        );

        summary
    }
}

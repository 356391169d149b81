//! Chrome OS update data ingestion
//!
//! Fetches the serving-builds and recovery feeds, normalizes them into a
//! device/board catalog with per-channel recovery images, and loads the
//! supplemental per-board metadata shown on the device pages.

pub mod builds;
pub mod cache;
pub mod commands;
pub mod config;
pub mod enhanced;
pub mod fetcher;
pub mod flex;
pub mod logging;
pub mod pipeline;
pub mod recovery;
pub mod utils;

#[cfg(test)]
mod test_support;

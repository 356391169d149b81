//! Utility functions shared across the application
//!
//! This module contains common helpers for number/version parsing,
//! path management, and progress tracking.

mod format;
mod path;
mod progress;

pub use format::*;
pub use path::*;
pub use progress::*;

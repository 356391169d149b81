//! Command implementations driven by the CLI

mod operations;

pub use operations::{build_catalog, load_enhanced, load_flex_data, lookup_redirect, run_all};

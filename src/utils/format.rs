//! Parsing and formatting utilities
//!
//! Lenient number parsing for upstream version strings and human-readable
//! durations for log output.

/// Parse the leading decimal number of a string, ignoring whatever follows
///
/// `"15474.70.0"` parses as `15474.7`, `"115"` as `115.0`. Strings without a
/// leading number yield `None`.
pub fn parse_leading_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric sort key for a version string, missing or non-numeric is 0
pub fn version_sort_key(version: Option<&str>) -> f64 {
    version.and_then(parse_leading_float).unwrap_or(0.0)
}

/// Strip build suffixes from a kernel version (`"5.15.0-abc123"` -> `"5.15.0"`)
pub fn normalize_kernel_version(full: &str) -> &str {
    full.split('-').next().unwrap_or(full)
}

/// Format a millisecond age as a short string (e.g. "3h", "12m", "45s")
pub fn format_age(age_ms: i64) -> String {
    let secs = age_ms.max(0) / 1000;
    if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

//! Enhanced board metadata models

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::normalize_kernel_version;

/// Supplemental capability data for one board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancedMetadata {
    pub android_app_support: bool,
    pub android_version: Option<String>,
    pub is_chromebook_plus_device: bool,
    pub kernel_version: Option<String>,
    pub eol_reached: bool,
    pub hardware_id: Option<String>,
    pub architecture: Option<String>,
}

/// Truthiness of an optional JSON value; missing or null is false
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

/// Non-empty text of an optional JSON scalar
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl EnhancedMetadata {
    /// Extract the metadata fields from a board's `data.json`
    ///
    /// The kernel version is the first listed kernel, cut at its first `-`.
    pub fn from_board_data(data: &Value) -> Self {
        let kernel_version = data
            .get("linux_kernel_versions")
            .and_then(Value::as_array)
            .and_then(|versions| versions.first())
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(|v| normalize_kernel_version(v).to_string());

        Self {
            android_app_support: truthy(data.get("android_app_support")),
            android_version: text(data.get("android_version")),
            is_chromebook_plus_device: truthy(data.get("is_chromebook_plus_device")),
            kernel_version,
            eol_reached: truthy(data.get("eol_reached")),
            hardware_id: text(data.get("sample_hwid")),
            architecture: text(data.get("architecture")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_board_data() {
        let metadata = EnhancedMetadata::from_board_data(&json!({
            "linux_kernel_versions": ["5.15.0-abcdef1234-r1", "4.19.0"],
            "android_app_support": true,
            "android_version": "11",
            "is_chromebook_plus_device": false,
            "eol_reached": false,
            "sample_hwid": "EVE D6A-A5B",
            "architecture": "x86_64"
        }));

        assert_eq!(metadata.kernel_version.as_deref(), Some("5.15.0"));
        assert!(metadata.android_app_support);
        assert_eq!(metadata.android_version.as_deref(), Some("11"));
        assert!(!metadata.is_chromebook_plus_device);
        assert_eq!(metadata.hardware_id.as_deref(), Some("EVE D6A-A5B"));
        assert_eq!(metadata.architecture.as_deref(), Some("x86_64"));
    }

    #[test]
    fn test_missing_fields_default() {
        let metadata = EnhancedMetadata::from_board_data(&json!({}));
        assert_eq!(metadata, EnhancedMetadata::default());

        let metadata = EnhancedMetadata::from_board_data(&json!({
            "linux_kernel_versions": [],
            "android_version": 9,
            "eol_reached": null
        }));
        assert_eq!(metadata.kernel_version, None);
        assert_eq!(metadata.android_version.as_deref(), Some("9"));
        assert!(!metadata.eol_reached);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(EnhancedMetadata::default()).unwrap();
        for key in [
            "android_app_support",
            "android_version",
            "is_chromebook_plus_device",
            "kernel_version",
            "eol_reached",
            "hardware_id",
            "architecture",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}

//! Core operations module
//!
//! Runs the loaders and writes their output files.

use std::path::Path;

use crate::builds::{device_index, resolve_board_redirect, single_device_redirects, CrosData};
use crate::cache::DataCache;
use crate::config::{self, Settings};
use crate::enhanced::EnhancedMetadataLoader;
use crate::fetcher::Fetcher;
use crate::flex::load_flex;
use crate::pipeline::Pipeline;
use crate::utils::{write_json_pretty, write_text};
use crate::{log_debug, log_error, log_info};

const MODULE: &str = "operations";

/// Render redirect rules, one per line
fn redirects_file(data: &CrosData) -> String {
    single_device_redirects(data)
        .iter()
        .map(|redirect| format!("{}\n", redirect))
        .collect()
}

/// Build the catalog and write it with its derived views
pub async fn build_catalog(
    fetcher: &Fetcher,
    settings: &Settings,
    out_dir: &Path,
) -> Result<CrosData, String> {
    log_info!(MODULE, "Building device catalog into {}", out_dir.display());

    let data = Pipeline::new(fetcher.clone(), settings).run().await;
    if data.is_empty() {
        log_error!(MODULE, "Device catalog is empty, writing empty outputs");
    }

    write_json_pretty(&out_dir.join(config::output::CROS_BUILDS), &data)?;
    write_json_pretty(
        &out_dir.join(config::output::DEVICE_INDEX),
        &device_index(&data),
    )?;
    write_text(
        &out_dir.join(config::output::REDIRECTS),
        &redirects_file(&data),
    )?;

    log_info!(
        MODULE,
        "Wrote {} devices, {} boards, {} single-device boards",
        data.devices.len(),
        data.boards.len(),
        data.single_device_boards.len()
    );
    Ok(data)
}

/// Load enhanced metadata and write it; returns the board count
pub async fn load_enhanced(
    fetcher: &Fetcher,
    settings: &Settings,
    out_dir: &Path,
) -> Result<usize, String> {
    let data = EnhancedMetadataLoader::new(fetcher.clone(), settings)
        .load()
        .await;
    write_json_pretty(&out_dir.join(config::output::ENHANCED), &data)?;
    log_info!(MODULE, "Wrote enhanced metadata for {} boards", data.len());
    Ok(data.len())
}

/// Load Flex data and write it; returns the device count
pub async fn load_flex_data(
    fetcher: &Fetcher,
    settings: &Settings,
    out_dir: &Path,
) -> Result<usize, String> {
    let data = load_flex(fetcher, settings).await;
    if let Some(latest) = data.latest_recovery() {
        log_debug!(
            MODULE,
            "Latest Flex recovery: {}",
            latest.version.as_deref().unwrap_or("unknown")
        );
    }
    write_json_pretty(&out_dir.join(config::output::FLEX), &data)?;
    Ok(data.devices.len())
}

/// Run every loader; the first write failure is returned
pub async fn run_all(fetcher: &Fetcher, settings: &Settings, out_dir: &Path) -> Result<(), String> {
    let (catalog, enhanced, flex) = tokio::join!(
        build_catalog(fetcher, settings, out_dir),
        load_enhanced(fetcher, settings, out_dir),
        load_flex_data(fetcher, settings, out_dir),
    );
    catalog?;
    enhanced?;
    flex?;
    Ok(())
}

/// Device a single-device board redirects to, read from the data cache
pub fn lookup_redirect(settings: &Settings, board: &str) -> Option<String> {
    let cache = DataCache::new(settings.data_cache_path());
    let Some(envelope) = cache.load() else {
        log_error!(
            MODULE,
            "No cached data at {}, run build first",
            cache.path().display()
        );
        return None;
    };

    let target = resolve_board_redirect(&envelope.data, board).map(str::to_string);
    match &target {
        Some(device) => log_debug!(MODULE, "Board {} redirects to {}", board, device),
        None => log_info!(MODULE, "Board {} has no single-device redirect", board),
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEnvelope;
    use crate::test_support::serve;
    use serde_json::{json, Value};

    fn local_settings(base: &str, cache_dir: &Path) -> Settings {
        Settings {
            serving_builds_url: format!("{}/builds", base),
            recovery_feed_url: format!("{}/recovery", base),
            flex_serving_builds_url: format!("{}/flex-builds", base),
            flex_recovery_feed_url: format!("{}/flex-recovery", base),
            board_updates_base_url: format!("{}/updates", base),
            cache_dir: cache_dir.to_path_buf(),
            enhanced_batch_delay_ms: 0,
            ..Settings::default()
        }
    }

    async fn upstream() -> String {
        serve(|path| match path {
            "/builds" => (
                200,
                json!({"builds": {
                    "eve": {"servingStable": {"chromeVersion": "120.0.0.0", "version": "15662.76.0"}},
                    "hatch": {"models": {"kohaku": {}, "helios": {}}}
                }})
                .to_string(),
            ),
            "/recovery" => (200, "[]".to_string()),
            "/flex-builds" => (200, r#"{"builds": {"reven": {}}}"#.to_string()),
            "/flex-recovery" => (200, r#"[{"file": "reven.bin", "version": "15662.0.0"}]"#.to_string()),
            "/updates/eve/stable/data.json" => (200, r#"{"architecture": "x86_64"}"#.to_string()),
            _ => (404, "{}".to_string()),
        })
        .await
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_run_all_writes_every_output() {
        let base = upstream().await;
        let cache = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let settings = local_settings(&base, cache.path());

        run_all(&Fetcher::new().unwrap(), &settings, out.path())
            .await
            .unwrap();

        let builds = read_json(&out.path().join(config::output::CROS_BUILDS));
        assert!(builds["devices"]["kohaku"].is_object());
        assert!(builds["singleDeviceBoards"]["eve"].is_object());

        let index = read_json(&out.path().join(config::output::DEVICE_INDEX));
        assert_eq!(
            index["eve"]["versions"]["stable"]["chromeVersion"],
            json!("120.0.0.0")
        );

        let redirects =
            std::fs::read_to_string(out.path().join(config::output::REDIRECTS)).unwrap();
        assert_eq!(redirects, "/board/eve /device/eve 301\n");

        let enhanced = read_json(&out.path().join(config::output::ENHANCED));
        assert_eq!(enhanced["eve"]["architecture"], json!("x86_64"));
        assert!(enhanced.get("hatch").is_none());

        let flex = read_json(&out.path().join(config::output::FLEX));
        assert!(flex["devices"]["reven"].is_object());
        assert_eq!(flex["recoveries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_build_fails_when_output_unwritable() {
        let base = upstream().await;
        let cache = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let blocker = out.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let result = build_catalog(
            &Fetcher::new().unwrap(),
            &local_settings(&base, cache.path()),
            &blocker,
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_lookup_redirect_from_cache() {
        let cache_dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            cache_dir: cache_dir.path().to_path_buf(),
            ..Settings::default()
        };
        assert_eq!(lookup_redirect(&settings, "eve"), None);

        let data = Pipeline::new(Fetcher::new().unwrap(), &settings).build(
            &json!({"builds": {"eve": {}, "hatch": {"models": {"kohaku": {}, "helios": {}}}}}),
            None,
        );
        DataCache::new(settings.data_cache_path())
            .save(&CacheEnvelope::new("h".to_string(), data, 0));

        assert_eq!(lookup_redirect(&settings, "eve").as_deref(), Some("eve"));
        assert_eq!(lookup_redirect(&settings, "hatch"), None);
        assert_eq!(lookup_redirect(&settings, "nope"), None);
    }
}

//! Remote fetcher
//!
//! Single-attempt JSON GETs against the upstream endpoints. Failures are
//! logged under the caller's label and surface as `None`, never as a panic.

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;

use crate::config;
use crate::{log_debug, log_error};

const MODULE: &str = "fetcher";

/// Shared HTTP client for upstream JSON endpoints
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(config::app::USER_AGENT)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;
        Ok(Self { client })
    }

    /// Fetch and parse JSON, returning the failure description on error
    pub async fn get_json(&self, url: &str) -> Result<Value, String> {
        log_debug!(MODULE, "GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(response.status().as_u16().to_string());
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("invalid JSON: {}", e))
    }

    /// Fetch JSON from `url`, logging `error_label` and returning `None` on
    /// any HTTP, network or parse failure
    pub async fn fetch_json(&self, url: &str, error_label: &str) -> Option<Value> {
        match self.get_json(url).await {
            Ok(json) => Some(json),
            Err(e) => {
                log_error!(MODULE, "{}: {}", error_label, e);
                None
            }
        }
    }
}

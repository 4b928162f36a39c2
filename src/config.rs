// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::services::view::ExplorerPaths;
use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// WordPress REST API root (e.g. `https://doorcountylandtrust.org/wp-json`)
    pub wp_api_url: String,
    /// Preserve collection endpoint, relative to the API root
    pub preserves_endpoint: String,
    /// Filter taxonomy endpoint, relative to the API root
    pub taxonomy_endpoint: String,
    /// Analytics sink; events are dropped when unset
    pub analytics_url: Option<String>,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Path of the discovery explorer page
    pub explorer_path: String,
    /// Path prefix of individual preserve pages
    pub preserve_path_prefix: String,
    /// Maximum concurrent layer file fetches
    pub layer_fetch_concurrency: usize,
    /// Per-request timeout for WordPress calls
    pub http_timeout_secs: u64,
    /// Periodic catalog refresh; `None` disables it
    pub catalog_refresh_secs: Option<u64>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            wp_api_url: "http://localhost:8081/wp-json".to_string(),
            preserves_endpoint: "/wp/v2/preserve?per_page=100".to_string(),
            taxonomy_endpoint: "/dclt/v1/filter-options".to_string(),
            analytics_url: None,
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            explorer_path: "/preserve-explorer/".to_string(),
            preserve_path_prefix: "/preserves/".to_string(),
            layer_fetch_concurrency: 12,
            http_timeout_secs: 30,
            catalog_refresh_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            wp_api_url: env::var("WP_API_URL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WP_API_URL"))?,
            preserves_endpoint: env::var("PRESERVES_ENDPOINT")
                .unwrap_or(defaults.preserves_endpoint),
            taxonomy_endpoint: env::var("TAXONOMY_ENDPOINT").unwrap_or(defaults.taxonomy_endpoint),
            analytics_url: env::var("ANALYTICS_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            explorer_path: env::var("EXPLORER_PATH").unwrap_or(defaults.explorer_path),
            preserve_path_prefix: env::var("PRESERVE_PATH_PREFIX")
                .unwrap_or(defaults.preserve_path_prefix),
            layer_fetch_concurrency: parse_var("LAYER_FETCH_CONCURRENCY")?
                .unwrap_or(defaults.layer_fetch_concurrency),
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS")?
                .unwrap_or(defaults.http_timeout_secs),
            catalog_refresh_secs: parse_var("CATALOG_REFRESH_SECS")?.filter(|secs| *secs > 0),
        })
    }

    pub fn explorer_paths(&self) -> ExplorerPaths {
        ExplorerPaths {
            explorer_path: self.explorer_path.clone(),
            preserve_path_prefix: self.preserve_path_prefix.clone(),
        }
    }
}

/// Read an optional variable and parse it.
fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        _ => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WordPress REST client for preserves, the filter taxonomy and layer files.
//!
//! Handles:
//! - Preserve collection and single-slug lookups
//! - Filter taxonomy (partitioned or flat)
//! - Per-preserve GeoJSON layer files, fetched concurrently with
//!   all-settled semantics

use crate::config::Config;
use crate::models::layer::{LayerType, NormalizedGeoLayer};
use crate::models::preserve::{Preserve, WpPreserve};
use crate::models::taxonomy::FilterTaxonomy;
use crate::services::geojson::normalize;
use crate::services::layers::{LayerDiagnostic, LayerFailure, LayerLoadReport};
use futures_util::{stream, StreamExt};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Errors talking to the WordPress REST API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// WordPress REST API client.
#[derive(Clone)]
pub struct WordPressClient {
    http: reqwest::Client,
    base_url: String,
    preserves_endpoint: String,
    taxonomy_endpoint: String,
    layer_fetch_concurrency: usize,
}

impl WordPressClient {
    /// Create a client for the site configured in `config`.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!("preserve-explorer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Request {
                url: config.wp_api_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.wp_api_url.trim_end_matches('/').to_string(),
            preserves_endpoint: config.preserves_endpoint.clone(),
            taxonomy_endpoint: config.taxonomy_endpoint.clone(),
            layer_fetch_concurrency: config.layer_fetch_concurrency.max(1),
        })
    }

    /// Fetch the full preserve collection.
    ///
    /// Records that do not decode (e.g. missing `id`) are skipped with a warning.
    pub async fn fetch_preserves(&self) -> Result<Vec<Preserve>, FetchError> {
        let url = self.endpoint_url(&self.preserves_endpoint);
        let records: Vec<Value> = self.get_json(&url).await?;
        let preserves = decode_preserves(records);
        tracing::info!(count = preserves.len(), "Fetched preserves");
        Ok(preserves)
    }

    /// Look up a single preserve by slug.
    pub async fn fetch_preserve_by_slug(&self, slug: &str) -> Result<Option<Preserve>, FetchError> {
        let endpoint = &self.preserves_endpoint;
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}slug={}",
            self.endpoint_url(endpoint),
            separator,
            urlencoding::encode(slug)
        );
        let records: Vec<Value> = self.get_json(&url).await?;
        Ok(decode_preserves(records).into_iter().find(|p| p.slug == slug))
    }

    /// Fetch the filter taxonomy.
    pub async fn fetch_taxonomy(&self) -> Result<FilterTaxonomy, FetchError> {
        let url = self.endpoint_url(&self.taxonomy_endpoint);
        let value: Value = self.get_json(&url).await?;
        let taxonomy = FilterTaxonomy::from_json(value).map_err(|e| FetchError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        tracing::info!(
            primary = taxonomy.primary.len(),
            secondary = taxonomy.secondary.len(),
            "Fetched filter taxonomy"
        );
        Ok(taxonomy)
    }

    /// Fetch one layer file as raw JSON. Relative URLs resolve against the API root.
    pub async fn fetch_layer(&self, url: &str) -> Result<Value, FetchError> {
        let resolved = self.resolve(url)?;
        self.get_json(resolved.as_str()).await
    }

    /// Fetch and normalize every layer file of every preserve.
    ///
    /// Each fetch settles independently; failures are reported as
    /// diagnostics and never abort the others.
    pub async fn load_layers(&self, preserves: &[Preserve]) -> LayerLoadReport {
        let jobs: Vec<(u64, String, LayerType, String)> = preserves
            .iter()
            .flat_map(|p| {
                p.layer_file_urls
                    .iter()
                    .map(move |(t, url)| (p.id, p.title.clone(), *t, url.clone()))
            })
            .collect();

        tracing::debug!(count = jobs.len(), "Fetching layer files");

        let outcomes = stream::iter(jobs)
            .map(|(preserve_id, preserve_title, layer_type, url)| async move {
                let failure = match self.fetch_layer(&url).await {
                    Ok(value) => match normalize(&value) {
                        Ok(geometry) => {
                            return Ok(NormalizedGeoLayer {
                                preserve_id,
                                preserve_title,
                                layer_type,
                                geometry,
                            })
                        }
                        Err(e) => LayerFailure::Normalize(e),
                    },
                    Err(e) => LayerFailure::Fetch(e.to_string()),
                };

                tracing::warn!(
                    preserve_id,
                    layer = %layer_type,
                    url = %url,
                    failure = ?failure,
                    "Dropping layer file"
                );
                Err(LayerDiagnostic {
                    preserve_id,
                    layer_type,
                    url,
                    failure,
                })
            })
            .buffer_unordered(self.layer_fetch_concurrency)
            .collect::<Vec<Result<NormalizedGeoLayer, LayerDiagnostic>>>()
            .await;

        let mut report = LayerLoadReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(layer) => report.loaded.push(layer),
                Err(diagnostic) => report.diagnostics.push(diagnostic),
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            dropped = report.diagnostics.len(),
            "Layer files settled"
        );
        report
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        Url::parse(&format!("{}/", self.base_url))
            .and_then(|base| base.join(url))
            .map_err(|e| FetchError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// GET a URL and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Layer files are often served as text/plain or
        // application/octet-stream, so decode the body ourselves.
        let body = response.bytes().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn decode_preserves(records: Vec<Value>) -> Vec<Preserve> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<WpPreserve>(record) {
            Ok(wp) => Some(Preserve::from_wp(wp)),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable preserve record");
                None
            }
        })
        .collect()
}

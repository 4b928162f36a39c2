// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory catalog of preserves, taxonomy and normalized layers.
//!
//! The preserve list and taxonomy are fetched concurrently and tracked
//! independently, so a failed taxonomy never blocks the preserve list.
//! Layer files load after the preserve list, and `layers_loading` stays set
//! until every fetch has settled.

use crate::models::layer::NormalizedGeoLayer;
use crate::models::preserve::Preserve;
use crate::models::taxonomy::FilterTaxonomy;
use crate::services::layers::{LayerCache, LayerDiagnostic, LayerLoadReport};
use crate::services::wordpress::WordPressClient;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Progress of a blocking fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

/// Status of each fetch, without the payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStatus {
    pub preserves: FetchStatus,
    pub taxonomy: FetchStatus,
    pub layers_loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum FetchStatus {
    Loading,
    Ready,
    Failed(String),
}

impl<T> From<&FetchState<T>> for FetchStatus {
    fn from(state: &FetchState<T>) -> Self {
        match state {
            FetchState::Loading => FetchStatus::Loading,
            FetchState::Ready(_) => FetchStatus::Ready,
            FetchState::Failed(e) => FetchStatus::Failed(e.clone()),
        }
    }
}

/// Read snapshot handed to request handlers.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub preserves: FetchState<Arc<Vec<Preserve>>>,
    pub taxonomy: FetchState<Arc<FilterTaxonomy>>,
    pub layers: Vec<Arc<NormalizedGeoLayer>>,
    pub layers_loading: bool,
}

impl CatalogSnapshot {
    pub fn status(&self) -> CatalogStatus {
        CatalogStatus {
            preserves: (&self.preserves).into(),
            taxonomy: (&self.taxonomy).into(),
            layers_loading: self.layers_loading,
        }
    }
}

struct CatalogState {
    preserves: FetchState<Arc<Vec<Preserve>>>,
    taxonomy: FetchState<Arc<FilterTaxonomy>>,
    layers_loading: bool,
    diagnostics: Vec<LayerDiagnostic>,
}

/// Shared catalog; cheap to clone.
#[derive(Clone)]
pub struct Catalog {
    state: Arc<RwLock<CatalogState>>,
    layers: LayerCache,
    generation: Arc<AtomicU64>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Empty catalog with both fetches pending.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState {
                preserves: FetchState::Loading,
                taxonomy: FetchState::Loading,
                layers_loading: false,
                diagnostics: Vec::new(),
            })),
            layers: LayerCache::new(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Catalog pre-populated with data (tests, fixtures).
    pub async fn with_data(
        preserves: Vec<Preserve>,
        taxonomy: Option<FilterTaxonomy>,
        layers: Vec<NormalizedGeoLayer>,
    ) -> Self {
        let catalog = Self::new();
        let generation = catalog.begin_refresh();
        let taxonomy = taxonomy.ok_or_else(|| "taxonomy unavailable".to_string());
        catalog.apply_fetch(generation, Ok(preserves), taxonomy).await;
        let report = LayerLoadReport {
            loaded: layers,
            diagnostics: Vec::new(),
        };
        catalog.apply_layers(generation, report).await;
        catalog
    }

    /// Refetch everything from WordPress.
    ///
    /// The latest refresh wins: every result of a superseded refresh is
    /// discarded, whenever it arrives.
    pub async fn refresh(&self, client: &WordPressClient) {
        let generation = self.begin_refresh();
        tracing::info!(generation, "Refreshing preserve catalog");

        let (preserves, taxonomy) =
            tokio::join!(client.fetch_preserves(), client.fetch_taxonomy());

        if let Err(e) = &taxonomy {
            tracing::error!(error = %e, "Failed to fetch filter taxonomy");
        }
        if let Err(e) = &preserves {
            tracing::error!(error = %e, "Failed to fetch preserves");
        }

        let Some(preserves) = self
            .apply_fetch(
                generation,
                preserves.map_err(|e| e.to_string()),
                taxonomy.map_err(|e| e.to_string()),
            )
            .await
        else {
            return;
        };

        let report = client.load_layers(&preserves).await;
        self.apply_layers(generation, report).await;
    }

    fn begin_refresh(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Record the preserve and taxonomy fetches of `generation`.
    ///
    /// Returns the list whose layers should be loaded, or `None` when the
    /// preserve fetch failed or a newer refresh has started. A new list
    /// invalidates the layer cache and marks layers as loading in the same
    /// write.
    async fn apply_fetch(
        &self,
        generation: u64,
        preserves: Result<Vec<Preserve>, String>,
        taxonomy: Result<FilterTaxonomy, String>,
    ) -> Option<Arc<Vec<Preserve>>> {
        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            tracing::info!(generation, "Discarding fetch from superseded refresh");
            return None;
        }

        state.taxonomy = match taxonomy {
            Ok(taxonomy) => FetchState::Ready(Arc::new(taxonomy)),
            Err(e) => FetchState::Failed(e),
        };

        match preserves {
            Ok(preserves) => {
                let preserves = Arc::new(preserves);
                self.layers.invalidate();
                state.diagnostics.clear();
                state.preserves = FetchState::Ready(Arc::clone(&preserves));
                state.layers_loading = true;
                Some(preserves)
            }
            Err(e) => {
                state.preserves = FetchState::Failed(e);
                // An older refresh may have left this set.
                state.layers_loading = false;
                None
            }
        }
    }

    /// Record the layer load of `generation` unless it has been superseded.
    async fn apply_layers(&self, generation: u64, report: LayerLoadReport) {
        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            tracing::info!(generation, "Discarding layers from superseded refresh");
            return;
        }
        for layer in report.loaded {
            self.layers.insert(layer);
        }
        state.diagnostics = report.diagnostics;
        state.layers_loading = false;
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read().await;
        CatalogSnapshot {
            preserves: state.preserves.clone(),
            taxonomy: state.taxonomy.clone(),
            layers: self.layers.snapshot(),
            layers_loading: state.layers_loading,
        }
    }

    /// Diagnostics from the most recent layer load.
    pub async fn diagnostics(&self) -> Vec<LayerDiagnostic> {
        self.state.read().await.diagnostics.clone()
    }

    pub fn layers(&self) -> &LayerCache {
        &self.layers
    }
}

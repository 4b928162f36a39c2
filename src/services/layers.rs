// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Layer visibility and the per-preserve layer cache.

use crate::models::layer::{LayerToggles, LayerType, NormalizedGeoLayer};
use crate::models::preserve::Preserve;
use crate::services::filter::{matches, FilterSelections};
use crate::services::geojson::NormalizeError;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Layers that should be drawn: the owning preserve passes the filters and
/// the layer type's switch is on. Layers of unknown preserves are dropped.
pub fn visible_layers<'a, I>(
    layers: I,
    toggles: &LayerToggles,
    preserves: &[Preserve],
    selections: &FilterSelections,
) -> Vec<&'a NormalizedGeoLayer>
where
    I: IntoIterator<Item = &'a NormalizedGeoLayer>,
{
    let included: HashMap<u64, bool> = preserves
        .iter()
        .map(|p| (p.id, matches(p, selections)))
        .collect();

    layers
        .into_iter()
        .filter(|layer| {
            toggles.is_visible(layer.layer_type)
                && included.get(&layer.preserve_id).copied().unwrap_or(false)
        })
        .collect()
}

/// Why a single layer file was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LayerFailure {
    Fetch(String),
    Normalize(NormalizeError),
}

/// Structured diagnostic for a dropped layer. Never surfaced to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerDiagnostic {
    pub preserve_id: u64,
    pub layer_type: LayerType,
    pub url: String,
    pub failure: LayerFailure,
}

/// Outcome of loading every layer file for a preserve list.
#[derive(Debug, Default)]
pub struct LayerLoadReport {
    pub loaded: Vec<NormalizedGeoLayer>,
    pub diagnostics: Vec<LayerDiagnostic>,
}

impl LayerLoadReport {
    pub fn attempted(&self) -> usize {
        self.loaded.len() + self.diagnostics.len()
    }
}

/// Normalized layers keyed by (preserve id, layer type).
///
/// Entries are keyed by preserve identity, so the cache must be
/// invalidated whenever the preserve list is refetched.
#[derive(Debug, Default, Clone)]
pub struct LayerCache {
    entries: Arc<DashMap<(u64, LayerType), Arc<NormalizedGeoLayer>>>,
}

impl LayerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, layer: NormalizedGeoLayer) {
        self.entries
            .insert((layer.preserve_id, layer.layer_type), Arc::new(layer));
    }

    pub fn get(&self, preserve_id: u64, layer_type: LayerType) -> Option<Arc<NormalizedGeoLayer>> {
        self.entries
            .get(&(preserve_id, layer_type))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// All cached layers ordered by preserve id, then draw order.
    pub fn snapshot(&self) -> Vec<Arc<NormalizedGeoLayer>> {
        let mut layers: Vec<_> = self
            .entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        layers.sort_by_key(|l| (l.preserve_id, l.layer_type));
        layers
    }

    pub fn invalidate(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Explorer controller: the single owner of view, filter and layer state.
//!
//! Views read [`ExplorerSnapshot`]s and request mutations through the
//! controller's methods; every mutation is announced on a broadcast channel
//! so URL sync and other observers can follow along.

use crate::models::layer::{LayerToggles, LayerType, NormalizedGeoLayer};
use crate::models::preserve::{Preserve, PreserveSummary};
use crate::models::taxonomy::FilterTaxonomy;
use crate::models::view::{PageContext, UrlParams, UrlUpdate, ViewMode, ViewState};
use crate::services::filter::{
    self, active_filter_count, compute_stats, CategoryStats, FilterSelections,
};
use crate::services::focus::{fit_preserves, focus_on_preserve, MapFocus};
use crate::services::layers::visible_layers;
use crate::services::view::{self, ExplorerPaths, Resolution, Transition};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Announced after every state mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerChange {
    FiltersChanged,
    LayersChanged,
    /// The view changed; `url` is the history operation to apply, if any.
    ViewChanged { url: Option<UrlUpdate> },
    CatalogReplaced,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExplorerError {
    #[error("Unknown preserve: {0}")]
    UnknownPreserve(u64),
}

/// Data the controller works over.
#[derive(Debug, Clone, Default)]
pub struct ExplorerData {
    pub preserves: Arc<Vec<Preserve>>,
    pub taxonomy: Option<Arc<FilterTaxonomy>>,
    pub layers: Vec<Arc<NormalizedGeoLayer>>,
}

/// A preserve marker; only preserves with valid coordinates get one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreserveMarker {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything a view needs to render the explorer.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorerSnapshot {
    pub view: ViewState,
    pub resolution: Resolution,
    pub selected: Option<Preserve>,
    pub preserves: Vec<PreserveSummary>,
    pub markers: Vec<PreserveMarker>,
    /// Filter chips; absent while focused on one preserve or without a taxonomy.
    pub filters: Option<Vec<CategoryStats>>,
    pub selections: FilterSelections,
    pub active_filter_count: usize,
    pub layer_toggles: BTreeMap<LayerType, bool>,
    pub layers: Vec<NormalizedGeoLayer>,
    pub focus: Option<MapFocus>,
}

pub struct ExplorerController {
    paths: ExplorerPaths,
    data: ExplorerData,
    view: ViewState,
    /// Preserve shown in preserve-focused mode (may come from the inline payload).
    focused: Option<Preserve>,
    resolution: Resolution,
    selections: FilterSelections,
    toggles: LayerToggles,
    changes: broadcast::Sender<ExplorerChange>,
}

impl ExplorerController {
    /// Build the controller for a page load.
    pub fn new(ctx: &PageContext, url: &UrlParams, data: ExplorerData, paths: ExplorerPaths) -> Self {
        let initial = view::resolve_initial(ctx, url, &data.preserves);
        let focused = if initial.state.is_discovery() {
            None
        } else {
            initial.preserve
        };
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            paths,
            data,
            view: initial.state,
            focused,
            resolution: initial.resolution,
            selections: FilterSelections::new(),
            toggles: LayerToggles::new(),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExplorerChange> {
        self.changes.subscribe()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn selections(&self) -> &FilterSelections {
        &self.selections
    }

    pub fn toggles(&self) -> &LayerToggles {
        &self.toggles
    }

    // ─── Filters ─────────────────────────────────────────────────

    pub fn set_filter_option(&mut self, category: &str, option: &str, checked: bool) {
        let next = filter::set_option(&self.selections, category, option, checked);
        self.replace_selections(next);
    }

    pub fn clear_filters(&mut self) {
        self.replace_selections(filter::clear_filters());
    }

    /// Replace all selections at once (e.g. from request parameters).
    pub fn replace_selections(&mut self, selections: FilterSelections) {
        if selections != self.selections {
            self.selections = selections;
            self.emit(ExplorerChange::FiltersChanged);
        }
    }

    // ─── Layers ──────────────────────────────────────────────────

    pub fn set_layer_toggle(&mut self, layer_type: LayerType, visible: bool) {
        let next = self.toggles.with(layer_type, visible);
        self.replace_toggles(next);
    }

    pub fn replace_toggles(&mut self, toggles: LayerToggles) {
        if toggles != self.toggles {
            self.toggles = toggles;
            self.emit(ExplorerChange::LayersChanged);
        }
    }

    // ─── View ────────────────────────────────────────────────────

    /// Select a preserve from a marker popup or list item.
    pub fn select_preserve(&mut self, preserve_id: u64) -> Result<Option<UrlUpdate>, ExplorerError> {
        let preserve = self.find(preserve_id)?.clone();
        let transition = view::select_preserve(&self.view, &preserve, &self.paths);
        if !self.view.is_discovery() {
            self.focused = Some(preserve);
            self.resolution = Resolution::Fetched;
        }
        Ok(self.apply(transition))
    }

    pub fn close_detail(&mut self) -> Option<UrlUpdate> {
        let transition = view::close_detail(&self.view, &self.paths);
        self.apply(transition)
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        let transition = view::set_view_mode(&self.view, view_mode);
        self.apply(transition);
    }

    pub fn set_more_filters(&mut self, open: bool) -> Option<UrlUpdate> {
        let slug = self.selected_preserve().map(|p| p.slug.clone());
        let transition = view::set_more_filters(&self.view, open, slug.as_deref(), &self.paths);
        self.apply(transition)
    }

    /// Leave preserve-focused mode for the default discovery view.
    pub fn back_to_explorer(&mut self) -> Option<UrlUpdate> {
        self.focused = None;
        self.resolution = Resolution::Discovery;
        let transition = view::back_to_explorer(&self.paths);
        self.apply(transition)
    }

    /// Switch to the preserve-focused view of `preserve_id`.
    pub fn view_full_details(&mut self, preserve_id: u64) -> Result<Option<UrlUpdate>, ExplorerError> {
        let preserve = self.find(preserve_id)?.clone();
        let transition = view::view_full_details(&preserve, &self.paths);
        self.focused = Some(preserve);
        self.resolution = Resolution::Fetched;
        Ok(self.apply(transition))
    }

    // ─── Catalog ─────────────────────────────────────────────────

    /// Swap in a refetched catalog. Layers are keyed by preserve identity,
    /// so the old layer set is dropped wholesale; a discovery selection that
    /// no longer exists is cleared.
    pub fn replace_catalog(&mut self, data: ExplorerData) {
        self.data = data;

        if self.view.is_discovery() {
            if let Some(id) = self.view.selected_preserve_id {
                if self.find(id).is_err() {
                    tracing::debug!(preserve_id = id, "Selected preserve vanished after refresh");
                    self.view.selected_preserve_id = None;
                    self.view.detail_panel_open = false;
                }
            }
        } else if let Some(focused) = &self.focused {
            if let Some(fresh) = self.data.preserves.iter().find(|p| p.id == focused.id) {
                self.focused = Some(fresh.clone());
            }
        }

        self.emit(ExplorerChange::CatalogReplaced);
    }

    // ─── Derived state ───────────────────────────────────────────

    /// The preserve whose details are shown, if any.
    pub fn selected_preserve(&self) -> Option<&Preserve> {
        if !self.view.is_discovery() {
            return self.focused.as_ref();
        }
        let id = self.view.selected_preserve_id?;
        self.data.preserves.iter().find(|p| p.id == id)
    }

    /// Preserves currently shown. Filters are suppressed while focused.
    pub fn visible_preserves(&self) -> Vec<&Preserve> {
        if self.view.is_discovery() {
            filter::filter_preserves(&self.data.preserves, &self.selections)
        } else {
            self.focused.iter().collect()
        }
    }

    pub fn visible_layers(&self) -> Vec<&NormalizedGeoLayer> {
        let layers = self.data.layers.iter().map(Arc::as_ref);
        if self.view.is_discovery() {
            visible_layers(layers, &self.toggles, &self.data.preserves, &self.selections)
        } else {
            let focused: Vec<Preserve> = self.focused.iter().cloned().collect();
            visible_layers(layers, &self.toggles, &focused, &FilterSelections::new())
        }
    }

    pub fn focus(&self) -> Option<MapFocus> {
        if self.view.is_discovery() {
            return fit_preserves(self.visible_preserves());
        }
        let preserve = self.focused.as_ref()?;
        let boundary = self
            .data
            .layers
            .iter()
            .find(|l| l.preserve_id == preserve.id && l.layer_type == LayerType::Boundary);
        focus_on_preserve(preserve, boundary.map(Arc::as_ref))
    }

    pub fn snapshot(&self) -> ExplorerSnapshot {
        let visible = self.visible_preserves();
        let markers = visible
            .iter()
            .filter_map(|p| {
                let (latitude, longitude) = p.coordinates()?;
                Some(PreserveMarker {
                    id: p.id,
                    title: p.title.clone(),
                    slug: p.slug.clone(),
                    latitude,
                    longitude,
                })
            })
            .collect();

        let filters = match (&self.data.taxonomy, self.view.is_discovery()) {
            (Some(taxonomy), true) => Some(compute_stats(
                &self.data.preserves,
                taxonomy,
                &self.selections,
            )),
            _ => None,
        };

        ExplorerSnapshot {
            view: self.view.clone(),
            resolution: self.resolution,
            selected: self.selected_preserve().cloned(),
            preserves: visible.iter().map(|p| PreserveSummary::from(*p)).collect(),
            markers,
            filters,
            selections: self.selections.clone(),
            active_filter_count: active_filter_count(&self.selections),
            layer_toggles: self.toggles.resolved(),
            layers: self.visible_layers().into_iter().cloned().collect(),
            focus: self.focus(),
        }
    }

    fn find(&self, preserve_id: u64) -> Result<&Preserve, ExplorerError> {
        self.data
            .preserves
            .iter()
            .find(|p| p.id == preserve_id)
            .ok_or(ExplorerError::UnknownPreserve(preserve_id))
    }

    fn apply(&mut self, transition: Transition) -> Option<UrlUpdate> {
        let changed = transition.state != self.view || transition.url.is_some();
        self.view = transition.state;
        if changed {
            self.emit(ExplorerChange::ViewChanged {
                url: transition.url.clone(),
            });
        }
        transition.url
    }

    fn emit(&self, change: ExplorerChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

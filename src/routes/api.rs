// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Explorer API routes.

use crate::error::{AppError, Result};
use crate::models::layer::{LayerToggles, LayerType};
use crate::models::preserve::{Preserve, PreserveSummary};
use crate::models::taxonomy::FilterTaxonomy;
use crate::models::view::{PageContext, UrlParams, ViewMode};
use crate::services::catalog::{CatalogSnapshot, CatalogStatus, FetchState};
use crate::services::explorer::{ExplorerController, ExplorerData, ExplorerSnapshot};
use crate::services::filter::{compute_stats, filter_preserves, CategoryStats, FilterSelections};
use crate::services::layers::LayerDiagnostic;
use crate::services::AnalyticsEvent;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const FILTER_PARAM_PREFIX: &str = "filter.";
const LAYER_PARAM_PREFIX: &str = "layer.";
const MAX_SLUG_LEN: usize = 200;
const MAX_KEY_LEN: usize = 64;
const MAX_EVENT_NAME_LEN: usize = 100;

/// Explorer API routes (public).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/taxonomy", get(get_taxonomy))
        .route("/api/preserves", get(get_preserves))
        .route("/api/filters", get(get_filters))
        .route("/api/explorer", get(get_explorer))
        .route("/api/explorer/preserves/{slug}", get(get_preserve_explorer))
        .route("/api/diagnostics", get(get_diagnostics))
        .route("/api/events", post(post_event))
}

// ─── Query parsing ───────────────────────────────────────────

/// Explorer state carried in the query string.
#[derive(Debug, Default)]
struct ExplorerQuery {
    url: UrlParams,
    view_mode: Option<ViewMode>,
    selections: FilterSelections,
    toggles: LayerToggles,
}

/// Parse `preserve`, `more`, `view`, `filter.<category>=a,b` and
/// `layer.<type>=on|off` parameters. Unknown parameters are ignored.
fn parse_explorer_query(query: &HashMap<String, String>) -> Result<ExplorerQuery> {
    let url = UrlParams::from_query(query);
    if url.preserve.as_ref().is_some_and(|s| s.len() > MAX_SLUG_LEN) {
        return Err(AppError::BadRequest(format!(
            "'preserve' must be at most {MAX_SLUG_LEN} characters"
        )));
    }

    let view_mode = query
        .get("view")
        .map(|v| v.parse::<ViewMode>())
        .transpose()
        .map_err(AppError::BadRequest)?;

    let mut filters: Vec<(String, Vec<String>)> = Vec::new();
    let mut toggles: Vec<(LayerType, bool)> = Vec::new();

    for (key, value) in query {
        if let Some(category) = key.strip_prefix(FILTER_PARAM_PREFIX) {
            if category.is_empty() || category.len() > MAX_KEY_LEN {
                return Err(AppError::BadRequest(format!(
                    "Invalid filter category: {category:?}"
                )));
            }
            let options = value
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
            filters.push((category.to_string(), options));
        } else if let Some(layer) = key.strip_prefix(LAYER_PARAM_PREFIX) {
            let layer_type = layer
                .parse::<LayerType>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            toggles.push((layer_type, parse_switch(key, value)?));
        }
    }

    Ok(ExplorerQuery {
        url,
        view_mode,
        selections: filters.into_iter().collect(),
        toggles: toggles.into_iter().collect(),
    })
}

fn parse_switch(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        other => Err(AppError::BadRequest(format!(
            "Invalid value for '{key}': {other:?} (expected on/off)"
        ))),
    }
}

// ─── Catalog helpers ─────────────────────────────────────────

/// The preserve list, or the blocking loading/error state.
fn require_preserves(snapshot: &CatalogSnapshot) -> Result<Arc<Vec<Preserve>>> {
    ready_or_unavailable(&snapshot.preserves, "preserves")
}

fn require_taxonomy(snapshot: &CatalogSnapshot) -> Result<Arc<FilterTaxonomy>> {
    ready_or_unavailable(&snapshot.taxonomy, "filter taxonomy")
}

fn ready_or_unavailable<T: Clone>(state: &FetchState<T>, what: &str) -> Result<T> {
    match state {
        FetchState::Ready(value) => Ok(value.clone()),
        FetchState::Loading => Err(AppError::Unavailable(AppError::LOADING.to_string())),
        FetchState::Failed(e) => Err(AppError::Unavailable(format!(
            "Failed to load {what}: {e}"
        ))),
    }
}

fn explorer_data(snapshot: &CatalogSnapshot, preserves: Arc<Vec<Preserve>>) -> ExplorerData {
    ExplorerData {
        preserves,
        taxonomy: snapshot.taxonomy.ready().cloned(),
        layers: snapshot.layers.clone(),
    }
}

// ─── Taxonomy ────────────────────────────────────────────────

async fn get_taxonomy(State(state): State<Arc<AppState>>) -> Result<Json<FilterTaxonomy>> {
    let snapshot = state.catalog.snapshot().await;
    let taxonomy = require_taxonomy(&snapshot)?;
    Ok(Json(taxonomy.as_ref().clone()))
}

// ─── Preserves ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PreservesResponse {
    pub preserves: Vec<PreserveSummary>,
    /// Preserves passing the filters.
    pub matched: u32,
    /// Preserves in the catalog.
    pub total: u32,
}

/// Filtered preserve list.
async fn get_preserves(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<PreservesResponse>> {
    let params = parse_explorer_query(&query)?;
    let snapshot = state.catalog.snapshot().await;
    let preserves = require_preserves(&snapshot)?;

    let matching: Vec<PreserveSummary> = filter_preserves(&preserves, &params.selections)
        .into_iter()
        .map(PreserveSummary::from)
        .collect();

    tracing::debug!(
        filters = ?params.selections,
        matched = matching.len(),
        "Filtered preserves"
    );

    Ok(Json(PreservesResponse {
        matched: matching.len() as u32,
        total: preserves.len() as u32,
        preserves: matching,
    }))
}

// ─── Filter stats ────────────────────────────────────────────

/// Option counts and availability for the filter chips.
async fn get_filters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<CategoryStats>>> {
    let params = parse_explorer_query(&query)?;
    let snapshot = state.catalog.snapshot().await;
    let taxonomy = require_taxonomy(&snapshot)?;
    let preserves = require_preserves(&snapshot)?;

    Ok(Json(compute_stats(&preserves, &taxonomy, &params.selections)))
}

// ─── Explorer ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ExplorerResponse {
    pub status: CatalogStatus,
    #[serde(flatten)]
    pub explorer: ExplorerSnapshot,
}

/// Discovery view: filtered preserves, markers, filters and layers.
async fn get_explorer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ExplorerResponse>> {
    let params = parse_explorer_query(&query)?;
    let snapshot = state.catalog.snapshot().await;
    let preserves = require_preserves(&snapshot)?;

    let mut controller = ExplorerController::new(
        &PageContext::discovery(),
        &params.url,
        explorer_data(&snapshot, preserves),
        state.config.explorer_paths(),
    );
    if let Some(view_mode) = params.view_mode {
        controller.set_view_mode(view_mode);
    }
    controller.replace_selections(params.selections);
    controller.replace_toggles(params.toggles);

    Ok(Json(ExplorerResponse {
        status: snapshot.status(),
        explorer: controller.snapshot(),
    }))
}

/// Preserve-focused view for a dedicated preserve page.
///
/// A slug missing from the catalog is looked up directly in WordPress
/// before falling back to an empty "not found" view.
async fn get_preserve_explorer(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ExplorerResponse>> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(AppError::BadRequest(format!(
            "Slug must be 1-{MAX_SLUG_LEN} characters"
        )));
    }
    let params = parse_explorer_query(&query)?;
    let snapshot = state.catalog.snapshot().await;
    let preserves = require_preserves(&snapshot)?;

    let mut ctx = PageContext::preserve_page(slug.as_str());
    if !preserves.iter().any(|p| p.slug == slug) {
        let inline = match state.wordpress.fetch_preserve_by_slug(&slug).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(slug = %slug, error = %e, "Direct preserve lookup failed");
                None
            }
        };
        ctx = ctx.with_inline_preserve(inline);
    }

    let mut controller = ExplorerController::new(
        &ctx,
        &params.url,
        explorer_data(&snapshot, preserves),
        state.config.explorer_paths(),
    );
    controller.replace_toggles(params.toggles);

    Ok(Json(ExplorerResponse {
        status: snapshot.status(),
        explorer: controller.snapshot(),
    }))
}

// ─── Diagnostics ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct DiagnosticsResponse {
    pub status: CatalogStatus,
    pub cached_layers: usize,
    pub dropped_layers: Vec<LayerDiagnostic>,
}

/// Layer files dropped by the most recent load.
async fn get_diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    let snapshot = state.catalog.snapshot().await;
    Json(DiagnosticsResponse {
        status: snapshot.status(),
        cached_layers: state.catalog.layers().len(),
        dropped_layers: state.catalog.diagnostics().await,
    })
}

// ─── Analytics ───────────────────────────────────────────────

/// Forward an explorer event to the analytics sink without waiting.
async fn post_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AnalyticsEvent>,
) -> Result<StatusCode> {
    let name = event.event.trim();
    if name.is_empty() || name.len() > MAX_EVENT_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Event name must be 1-{MAX_EVENT_NAME_LEN} characters"
        )));
    }

    tracing::debug!(event = %name, preserve = ?event.preserve_name, "Tracking event");
    state.analytics.track(event);
    Ok(StatusCode::ACCEPTED)
}

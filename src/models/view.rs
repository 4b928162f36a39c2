// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View and selection state types.

use crate::models::preserve::Preserve;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Query parameter carrying the slug of the preserve whose detail modal is open.
pub const PRESERVE_PARAM: &str = "preserve";
/// Query parameter for the "More filters" overflow panel deep link.
pub const MORE_PARAM: &str = "more";

/// Top-level display mode, fixed at load except for explicit navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum DisplayMode {
    Discovery,
    PreserveFocused,
}

/// Map/list toggle (discovery only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ViewMode {
    #[default]
    Map,
    List,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "map" => Ok(ViewMode::Map),
            "list" => Ok(ViewMode::List),
            other => Err(format!("Unknown view mode: {other}")),
        }
    }
}

/// What the explorer is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ViewState {
    pub mode: DisplayMode,
    pub view_mode: ViewMode,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub selected_preserve_id: Option<u64>,
    pub detail_panel_open: bool,
    pub more_filters_open: bool,
}

impl ViewState {
    /// Default discovery view: map, nothing selected.
    pub fn discovery() -> Self {
        Self {
            mode: DisplayMode::Discovery,
            view_mode: ViewMode::Map,
            selected_preserve_id: None,
            detail_panel_open: false,
            more_filters_open: false,
        }
    }

    /// Preserve-focused view for `preserve_id` (or empty if not found).
    pub fn preserve_focused(preserve_id: Option<u64>) -> Self {
        Self {
            mode: DisplayMode::PreserveFocused,
            view_mode: ViewMode::Map,
            selected_preserve_id: preserve_id,
            detail_panel_open: preserve_id.is_some(),
            more_filters_open: false,
        }
    }

    pub fn is_discovery(&self) -> bool {
        self.mode == DisplayMode::Discovery
    }
}

/// Server-supplied initial context for the page the explorer runs on.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// This is a dedicated preserve URL rather than the general explorer.
    pub is_preserve_page: bool,
    pub preserve_slug: Option<String>,
    /// Server-rendered preserve payload, used when the fetched list lacks the slug.
    pub inline_preserve: Option<Preserve>,
}

impl PageContext {
    pub fn discovery() -> Self {
        Self::default()
    }

    pub fn preserve_page(slug: impl Into<String>) -> Self {
        Self {
            is_preserve_page: true,
            preserve_slug: Some(slug.into()),
            inline_preserve: None,
        }
    }

    pub fn with_inline_preserve(mut self, preserve: Option<Preserve>) -> Self {
        self.inline_preserve = preserve;
        self
    }
}

/// Deep-link parameters read from the page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    pub preserve: Option<String>,
    pub more: bool,
}

impl UrlParams {
    /// Read the deep-link parameters from decoded query pairs.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        Self {
            preserve: query
                .get(PRESERVE_PARAM)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            more: query
                .get(MORE_PARAM)
                .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes")),
        }
    }
}

/// Browser history operation accompanying a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum HistoryMethod {
    /// `pushState`: back-button navigable.
    Push,
    /// `replaceState`: same-mode detail changes.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UrlUpdate {
    pub history: HistoryMethod,
    pub url: String,
}

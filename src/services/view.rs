// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View/selection state machine.
//!
//! Every transition returns the next [`ViewState`] together with the browser
//! history operation that keeps the URL in sync:
//! - mode changes (`view_full_details`, `back_to_explorer`, selecting another
//!   preserve while focused) push a new history entry;
//! - same-mode detail changes (opening/closing the detail modal, the
//!   "More filters" panel) replace the current entry.

use crate::models::preserve::Preserve;
use crate::models::view::{
    DisplayMode, HistoryMethod, PageContext, UrlParams, UrlUpdate, ViewMode, ViewState, MORE_PARAM,
    PRESERVE_PARAM,
};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Where the explorer and individual preserve pages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerPaths {
    pub explorer_path: String,
    pub preserve_path_prefix: String,
}

impl Default for ExplorerPaths {
    fn default() -> Self {
        Self {
            explorer_path: "/preserve-explorer/".to_string(),
            preserve_path_prefix: "/preserves/".to_string(),
        }
    }
}

impl ExplorerPaths {
    /// `/preserves/<slug>/`
    pub fn preserve_url(&self, slug: &str) -> String {
        let prefix = self.preserve_path_prefix.trim_end_matches('/');
        format!("{}/{}/", prefix, urlencoding::encode(slug))
    }

    /// Explorer URL with the deep-link parameters for `state`.
    pub fn discovery_url(&self, selected_slug: Option<&str>, more: bool) -> String {
        let mut params = Vec::new();
        if let Some(slug) = selected_slug {
            params.push(format!("{}={}", PRESERVE_PARAM, urlencoding::encode(slug)));
        }
        if more {
            params.push(format!("{MORE_PARAM}=1"));
        }

        if params.is_empty() {
            self.explorer_path.clone()
        } else {
            format!("{}?{}", self.explorer_path, params.join("&"))
        }
    }
}

/// How the initial preserve of a preserve page was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Resolution {
    /// Discovery page, nothing to resolve.
    Discovery,
    /// Found in the fetched preserve list.
    Fetched,
    /// Fell back to the server-rendered inline payload.
    Inline,
    NotFound,
}

/// Initial view plus the preserve it is focused on, if any.
#[derive(Debug, Clone)]
pub struct InitialView {
    pub state: ViewState,
    pub preserve: Option<Preserve>,
    pub resolution: Resolution,
}

/// Result of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ViewState,
    pub url: Option<UrlUpdate>,
}

impl Transition {
    fn silent(state: ViewState) -> Self {
        Self { state, url: None }
    }

    fn with_url(state: ViewState, history: HistoryMethod, url: String) -> Self {
        Self {
            state,
            url: Some(UrlUpdate { history, url }),
        }
    }
}

/// Decide the initial view from the page context and URL.
///
/// Preserve pages look the slug up in the fetched list first, then in the
/// inline payload, and otherwise render an empty "not found" view.
pub fn resolve_initial(ctx: &PageContext, url: &UrlParams, preserves: &[Preserve]) -> InitialView {
    if ctx.is_preserve_page {
        // A missing slug matches nothing in the fetched list.
        let slug = ctx.preserve_slug.as_deref().filter(|s| !s.is_empty());

        if let Some(p) = slug.and_then(|slug| preserves.iter().find(|p| p.slug == slug)) {
            return InitialView {
                state: ViewState::preserve_focused(Some(p.id)),
                preserve: Some(p.clone()),
                resolution: Resolution::Fetched,
            };
        }

        if let Some(inline) = ctx
            .inline_preserve
            .as_ref()
            .filter(|p| slug.map_or(true, |slug| p.slug == slug))
        {
            tracing::debug!(slug = ?slug, "Preserve not in fetched list; using inline payload");
            return InitialView {
                state: ViewState::preserve_focused(Some(inline.id)),
                preserve: Some(inline.clone()),
                resolution: Resolution::Inline,
            };
        }

        tracing::info!(slug = ?slug, "Preserve page slug not found");
        return InitialView {
            state: ViewState::preserve_focused(None),
            preserve: None,
            resolution: Resolution::NotFound,
        };
    }

    let mut state = ViewState::discovery();
    state.more_filters_open = url.more;

    let selected = url
        .preserve
        .as_deref()
        .and_then(|slug| preserves.iter().find(|p| p.slug == slug));
    match (selected, url.preserve.as_deref()) {
        (Some(p), _) => {
            state.selected_preserve_id = Some(p.id);
            state.detail_panel_open = true;
        }
        (None, Some(slug)) => {
            tracing::debug!(slug, "Deep-linked preserve not found; ignoring");
        }
        (None, None) => {}
    }

    InitialView {
        preserve: selected.cloned(),
        state,
        resolution: Resolution::Discovery,
    }
}

/// Select a preserve from a marker popup or list item.
pub fn select_preserve(state: &ViewState, preserve: &Preserve, paths: &ExplorerPaths) -> Transition {
    match state.mode {
        DisplayMode::Discovery => {
            let next = ViewState {
                selected_preserve_id: Some(preserve.id),
                detail_panel_open: true,
                ..state.clone()
            };
            let url = paths.discovery_url(Some(&preserve.slug), next.more_filters_open);
            Transition::with_url(next, HistoryMethod::Replace, url)
        }
        DisplayMode::PreserveFocused => {
            if state.selected_preserve_id == Some(preserve.id) {
                return Transition::silent(state.clone());
            }
            Transition::with_url(
                ViewState::preserve_focused(Some(preserve.id)),
                HistoryMethod::Push,
                paths.preserve_url(&preserve.slug),
            )
        }
    }
}

/// Close the detail modal and drop the preserve parameter.
pub fn close_detail(state: &ViewState, paths: &ExplorerPaths) -> Transition {
    match state.mode {
        DisplayMode::Discovery => {
            let next = ViewState {
                selected_preserve_id: None,
                detail_panel_open: false,
                ..state.clone()
            };
            let url = paths.discovery_url(None, next.more_filters_open);
            Transition::with_url(next, HistoryMethod::Replace, url)
        }
        // The focused preserve is authoritative; the panel just collapses.
        DisplayMode::PreserveFocused => Transition::silent(ViewState {
            detail_panel_open: false,
            ..state.clone()
        }),
    }
}

/// Toggle map/list. Independent of filters and selection; no URL change.
pub fn set_view_mode(state: &ViewState, view_mode: ViewMode) -> Transition {
    if !state.is_discovery() {
        return Transition::silent(state.clone());
    }
    Transition::silent(ViewState {
        view_mode,
        ..state.clone()
    })
}

/// Open or close the "More filters" panel, mirrored as `more=1`.
pub fn set_more_filters(
    state: &ViewState,
    open: bool,
    selected_slug: Option<&str>,
    paths: &ExplorerPaths,
) -> Transition {
    if !state.is_discovery() || state.more_filters_open == open {
        return Transition::silent(state.clone());
    }
    let next = ViewState {
        more_filters_open: open,
        ..state.clone()
    };
    let slug = if next.detail_panel_open {
        selected_slug
    } else {
        None
    };
    let url = paths.discovery_url(slug, open);
    Transition::with_url(next, HistoryMethod::Replace, url)
}

/// "Back to explorer": full replace with the default discovery state.
pub fn back_to_explorer(paths: &ExplorerPaths) -> Transition {
    Transition::with_url(
        ViewState::discovery(),
        HistoryMethod::Push,
        paths.discovery_url(None, false),
    )
}

/// "View full details": full replace with a preserve-focused state.
pub fn view_full_details(preserve: &Preserve, paths: &ExplorerPaths) -> Transition {
    Transition::with_url(
        ViewState::preserve_focused(Some(preserve.id)),
        HistoryMethod::Push,
        paths.preserve_url(&preserve.slug),
    )
}

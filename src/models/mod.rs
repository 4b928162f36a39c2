// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod layer;
pub mod preserve;
pub mod taxonomy;
pub mod view;

pub use layer::{LayerToggles, LayerType, NormalizedGeoLayer};
pub use preserve::{Preserve, PreserveSummary, WpPreserve};
pub use taxonomy::{FilterCategory, FilterOption, FilterTaxonomy, Partition};
pub use view::{DisplayMode, PageContext, UrlParams, UrlUpdate, ViewMode, ViewState};

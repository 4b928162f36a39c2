// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - filtering, layers, view state and collaborators.

pub mod analytics;
pub mod catalog;
pub mod explorer;
pub mod filter;
pub mod focus;
pub mod geojson;
pub mod layers;
pub mod view;
pub mod wordpress;

pub use analytics::{AnalyticsClient, AnalyticsEvent};
pub use catalog::{Catalog, CatalogSnapshot, FetchState};
pub use explorer::{ExplorerChange, ExplorerController, ExplorerData, ExplorerSnapshot};
pub use filter::FilterSelections;
pub use layers::LayerCache;
pub use view::ExplorerPaths;
pub use wordpress::{FetchError, WordPressClient};

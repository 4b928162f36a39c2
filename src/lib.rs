// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Preserve Explorer: discover Door County Land Trust preserves.
//!
//! This crate consumes the land trust's WordPress REST API (preserves,
//! filter taxonomy, per-preserve GeoJSON layers) and serves the derived
//! explorer state: filtered preserves, filter availability, visible map
//! layers and deep-linkable view state.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{AnalyticsClient, Catalog, WordPressClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub wordpress: WordPressClient,
    pub analytics: AnalyticsClient,
}

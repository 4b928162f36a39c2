// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Preserve Explorer API Server
//!
//! Serves filtered preserves, filter availability and map layers for the
//! Door County Land Trust Preserve Explorer.

use preserve_explorer::{
    config::Config,
    services::{AnalyticsClient, Catalog, WordPressClient},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        wp_api_url = %config.wp_api_url,
        "Starting Preserve Explorer API"
    );

    let wordpress = WordPressClient::new(&config)?;
    let analytics = AnalyticsClient::new(config.analytics_url.clone());
    if !analytics.is_enabled() {
        tracing::info!("ANALYTICS_URL not set; analytics events will be dropped");
    }

    // The server starts while the catalog loads; requests see loading states.
    let catalog = Catalog::new();
    spawn_catalog_refresh(
        catalog.clone(),
        wordpress.clone(),
        config.catalog_refresh_secs,
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        catalog,
        wordpress,
        analytics,
    });

    // Build router
    let app = preserve_explorer::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Load the catalog now, then again every `interval_secs` if configured.
fn spawn_catalog_refresh(catalog: Catalog, wordpress: WordPressClient, interval_secs: Option<u64>) {
    tokio::spawn(async move {
        catalog.refresh(&wordpress).await;

        let Some(secs) = interval_secs else {
            return;
        };
        tracing::info!(interval_secs = secs, "Periodic catalog refresh enabled");

        let mut interval = tokio::time::interval(Duration::from_secs(secs));
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            catalog.refresh(&wordpress).await;
        }
    });
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("preserve_explorer=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}

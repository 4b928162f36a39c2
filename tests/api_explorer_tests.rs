// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Explorer API routes.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use preserve_explorer::services::Catalog;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_health() {
    let (app, _) = common::create_loading_app();
    let (status, body) = common::get_json(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["catalog"]["preserves"]["status"], "loading");
}

#[tokio::test]
async fn test_explorer_filtered_by_region() {
    let (app, _) = common::create_test_app().await;
    let (status, body) = common::get_json(app, "/api/explorer?filter.region=northern_door").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["preserves"]["status"], "ready");
    assert_eq!(body["view"]["mode"], "discovery");
    assert_eq!(body["preserves"].as_array().unwrap().len(), 1);
    assert_eq!(body["preserves"][0]["slug"], "mink-river-estuary");
    assert_eq!(body["active_filter_count"], 1);
    assert_eq!(body["selections"], json!({ "region": ["northern_door"] }));

    // Counts still reflect the full list.
    let region = &body["filters"][0];
    assert_eq!(region["key"], "region");
    assert_eq!(region["options"][1]["key"], "central_door");
    assert_eq!(region["options"][1]["count"], 2);

    let layers = body["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0]["layer_type"], "boundary");
    assert_eq!(layers[0]["geometry"]["type"], "FeatureCollection");
}

#[tokio::test]
async fn test_explorer_layer_switches() {
    let (app, _) = common::create_test_app().await;
    let (status, body) = common::get_json(
        app,
        "/api/explorer?filter.region=northern_door&layer.parking=on&layer.boundary=off",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let layers = body["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0]["layer_type"], "parking");
    assert_eq!(body["layer_toggles"]["boundary"], false);
    assert_eq!(body["layer_toggles"]["trail"], true);
}

#[tokio::test]
async fn test_explorer_deep_link() {
    let (app, _) = common::create_test_app().await;
    let (status, body) =
        common::get_json(app, "/api/explorer?preserve=kangaroo-lake&more=1&view=list").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["selected_preserve_id"], 102);
    assert_eq!(body["view"]["detail_panel_open"], true);
    assert_eq!(body["view"]["more_filters_open"], true);
    assert_eq!(body["view"]["view_mode"], "list");
    assert_eq!(body["selected"]["title"], "Kangaroo Lake Nature Preserve");
}

#[tokio::test]
async fn test_explorer_rejects_bad_parameters() {
    for uri in [
        "/api/explorer?view=grid",
        "/api/explorer?layer.trails=on",
        "/api/explorer?layer.parking=maybe",
    ] {
        let (app, _) = common::create_test_app().await;
        let (status, body) = common::get_json(app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_deep_link_slug_too_long() {
    let (app, _) = common::create_test_app().await;
    let uri = format!("/api/explorer?preserve={}", "a".repeat(201));
    let (status, _) = common::get_json(app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preserve_page_focused() {
    let (app, _) = common::create_test_app().await;
    let (status, body) =
        common::get_json(app, "/api/explorer/preserves/mink-river-estuary?layer.parking=on").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["mode"], "preserve_focused");
    assert_eq!(body["resolution"], "fetched");
    assert_eq!(body["selected"]["id"], 101);
    assert_eq!(body["preserves"].as_array().unwrap().len(), 1);
    assert!(body["filters"].is_null());
    assert_eq!(body["layers"].as_array().unwrap().len(), 2);
    assert_eq!(body["focus"]["kind"], "center");
    assert_eq!(body["focus"]["latitude"], 45.221);
}

#[tokio::test]
async fn test_preserve_page_not_found() {
    let (app, _) = common::create_test_app().await;
    let (status, body) = common::get_json(app, "/api/explorer/preserves/no-such-preserve").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resolution"], "not_found");
    assert!(body["selected"].is_null());
    assert!(body["preserves"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_preserve_page_falls_back_to_slug_lookup() {
    let base = common::spawn_wordpress_stub(false).await;
    let config = preserve_explorer::config::Config {
        wp_api_url: base,
        ..common::offline_config()
    };
    let catalog = Catalog::with_data(
        common::fixture_preserves(),
        Some(common::fixture_taxonomy()),
        vec![],
    )
    .await;
    let (app, _) = common::build_app(config, catalog);

    let uri = format!("/api/explorer/preserves/{}", common::HIDDEN_SLUG);
    let (status, body) = common::get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resolution"], "inline");
    assert_eq!(body["selected"]["id"], 200);
    assert_eq!(body["markers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_loading_catalog_is_unavailable() {
    for uri in ["/api/explorer", "/api/preserves", "/api/taxonomy"] {
        let (app, _) = common::create_loading_app();
        let (status, body) = common::get_json(app, uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["details"], "loading");
    }
}

#[tokio::test]
async fn test_missing_taxonomy_does_not_block_explorer() {
    let catalog = Catalog::with_data(common::fixture_preserves(), None, vec![]).await;
    let (app, _) = common::build_app(common::offline_config(), catalog);

    let (status, body) = common::get_json(app.clone(), "/api/explorer").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["filters"].is_null());
    assert_eq!(body["status"]["taxonomy"]["status"], "failed");
    assert_eq!(body["preserves"].as_array().unwrap().len(), 4);

    let (status, _) = common::get_json(app, "/api/filters").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_preserves_endpoint() {
    let (app, _) = common::create_test_app().await;
    let (status, body) = common::get_json(app, "/api/preserves?filter.activity=birding").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], 2);
    assert_eq!(body["total"], 4);
    assert_eq!(body["preserves"][1]["slug"], "kangaroo-lake");
}

#[tokio::test]
async fn test_taxonomy_and_filters_endpoints() {
    let (app, _) = common::create_test_app().await;

    let (status, body) = common::get_json(app.clone(), "/api/taxonomy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["primary"].as_array().unwrap().len(), 4);
    assert_eq!(body["secondary"][0]["key"], "amenities");

    let (status, body) =
        common::get_json(app, "/api/filters?filter.activity=hiking,snowshoeing").await;
    assert_eq!(status, StatusCode::OK);
    let activity = &body[1];
    assert_eq!(activity["key"], "activity");
    assert_eq!(activity["options"][0]["key"], "hiking");
    assert_eq!(activity["options"][0]["count"], 3);
    assert_eq!(activity["options"][0]["selected"], true);
    assert_eq!(activity["options"][1]["selected"], false);
    assert_eq!(activity["options"][3]["selected"], true);
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let (app, _) = common::create_test_app().await;
    let (status, body) = common::get_json(app, "/api/preserve-list").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["details"], "/api/preserve-list");
}

#[tokio::test]
async fn test_diagnostics_endpoint() {
    let (app, _) = common::create_test_app().await;
    let (status, body) = common::get_json(app, "/api/diagnostics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached_layers"], 4);
    assert!(body["dropped_layers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_event_accepted() {
    let (app, _) = common::create_test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/events")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "event": "preserve_selected",
                        "data": { "source": "marker" },
                        "preserve_name": "Mink River Estuary"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_event_without_name_rejected() {
    let (app, _) = common::create_test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/events")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "event": "  " }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let (app, _) = common::create_test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/explorer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=60"
    );
}

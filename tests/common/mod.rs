// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::extract::{Path, Query};
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use preserve_explorer::config::Config;
use preserve_explorer::models::preserve::{slugify, Preserve, WpPreserve};
use preserve_explorer::models::{FilterTaxonomy, LayerType, NormalizedGeoLayer};
use preserve_explorer::routes::create_router;
use preserve_explorer::services::geojson::normalize;
use preserve_explorer::services::{AnalyticsClient, Catalog, WordPressClient};
use preserve_explorer::AppState;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tower::ServiceExt;

/// WordPress API root nothing listens on.
#[allow(dead_code)]
pub const UNREACHABLE_WP: &str = "http://127.0.0.1:1/wp-json";

const PRESERVES_FIXTURE: &str = include_str!("../fixtures/preserves.json");
const TAXONOMY_FIXTURE: &str = include_str!("../fixtures/filter_options.json");

/// Build a preserve directly from category -> options pairs.
#[allow(dead_code)]
pub fn preserve(id: u64, title: &str, selections: &[(&str, &[&str])]) -> Preserve {
    Preserve {
        id,
        title: title.to_string(),
        slug: slugify(title),
        content: String::new(),
        excerpt: String::new(),
        latitude: None,
        longitude: None,
        acres: None,
        trail_length_miles: None,
        filter_selections: selections
            .iter()
            .map(|(category, options)| {
                let set: BTreeSet<String> = options.iter().map(|o| o.to_string()).collect();
                (category.to_string(), set)
            })
            .filter(|(_, set)| !set.is_empty())
            .collect(),
        layer_file_urls: BTreeMap::new(),
    }
}

/// Same as [`preserve`], with marker coordinates.
#[allow(dead_code)]
pub fn located(mut p: Preserve, latitude: f64, longitude: f64) -> Preserve {
    p.latitude = Some(latitude);
    p.longitude = Some(longitude);
    p
}

/// The four decodable preserves of the WordPress fixture.
#[allow(dead_code)]
pub fn fixture_preserves() -> Vec<Preserve> {
    let records: Vec<Value> = serde_json::from_str(PRESERVES_FIXTURE).unwrap();
    records
        .into_iter()
        .filter_map(|r| serde_json::from_value::<WpPreserve>(r).ok())
        .map(Preserve::from_wp)
        .collect()
}

#[allow(dead_code)]
pub fn fixture_taxonomy() -> FilterTaxonomy {
    FilterTaxonomy::from_json(serde_json::from_str(TAXONOMY_FIXTURE).unwrap()).unwrap()
}

/// A normalized layer built from raw GeoJSON.
#[allow(dead_code)]
pub fn layer(preserve_id: u64, layer_type: LayerType, geojson: Value) -> NormalizedGeoLayer {
    NormalizedGeoLayer {
        preserve_id,
        preserve_title: format!("Preserve {preserve_id}"),
        layer_type,
        geometry: normalize(&geojson).unwrap(),
    }
}

#[allow(dead_code)]
pub fn square(lng: f64, lat: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [lng, lat], [lng + 0.01, lat], [lng + 0.01, lat + 0.01], [lng, lat + 0.01], [lng, lat]
        ]]
    })
}

/// Layers matching the fixture preserves' layer files.
#[allow(dead_code)]
pub fn fixture_layers() -> Vec<NormalizedGeoLayer> {
    vec![
        layer(101, LayerType::Boundary, square(-87.03, 45.22)),
        layer(
            101,
            LayerType::Parking,
            json!({ "type": "Point", "coordinates": [-87.0254, 45.2210] }),
        ),
        layer(102, LayerType::Boundary, square(-87.18, 45.00)),
        layer(
            102,
            LayerType::Structures,
            json!({ "type": "Point", "coordinates": [-87.1710, 45.0012] }),
        ),
    ]
}

/// Create a test app around `catalog` with offline collaborators.
#[allow(dead_code)]
pub fn build_app(config: Config, catalog: Catalog) -> (Router, Arc<AppState>) {
    let wordpress = WordPressClient::new(&config).expect("Failed to build WordPress client");
    let state = Arc::new(AppState {
        config,
        catalog,
        wordpress,
        analytics: AnalyticsClient::default(),
    });
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn offline_config() -> Config {
    Config {
        wp_api_url: UNREACHABLE_WP.to_string(),
        http_timeout_secs: 2,
        ..Config::default()
    }
}

/// Create a test app over the fixture catalog.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>) {
    let catalog = Catalog::with_data(
        fixture_preserves(),
        Some(fixture_taxonomy()),
        fixture_layers(),
    )
    .await;
    build_app(offline_config(), catalog)
}

/// Create a test app whose catalog has not loaded yet.
#[allow(dead_code)]
pub fn create_loading_app() -> (Router, Arc<AppState>) {
    build_app(offline_config(), Catalog::new())
}

/// GET `uri` and decode the JSON body.
#[allow(dead_code)]
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// ─── WordPress stub ──────────────────────────────────────────

/// Only reachable through a slug lookup, like a preserve past the first page.
#[allow(dead_code)]
pub const HIDDEN_SLUG: &str = "door-bluff-headlands";

/// Serve the fixtures on an ephemeral port; returns the API root.
///
/// Layer files: Mink River and Kangaroo Lake load, Logan Creek's trail is
/// a 404 and Clay Banks' boundary is not GeoJSON.
#[allow(dead_code)]
pub async fn spawn_wordpress_stub(taxonomy_fails: bool) -> String {
    let app = Router::new()
        .route("/wp-json/wp/v2/preserve", get(stub_preserves))
        .route(
            "/wp-json/dclt/v1/filter-options",
            get(move || async move {
                if taxonomy_fails {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "code": "internal_server_error" })),
                    )
                        .into_response()
                } else {
                    let taxonomy: Value = serde_json::from_str(TAXONOMY_FIXTURE).unwrap();
                    Json(taxonomy).into_response()
                }
            }),
        )
        .route("/wp-content/uploads/{file}", get(stub_layer_file));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/wp-json")
}

async fn stub_preserves(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let records: Vec<Value> = serde_json::from_str(PRESERVES_FIXTURE).unwrap();
    let Some(slug) = query.get("slug") else {
        return Json(Value::Array(records));
    };

    let hidden = json!({
        "id": 200,
        "slug": HIDDEN_SLUG,
        "title": { "rendered": "Door Bluff Headlands" },
        "meta": { "_preserve_lat": "45.2905", "_preserve_lng": "-87.0440" }
    });
    let found: Vec<Value> = records
        .into_iter()
        .chain(std::iter::once(hidden))
        .filter(|r| r.get("slug").and_then(Value::as_str) == Some(slug.as_str()))
        .collect();
    Json(Value::Array(found))
}

async fn stub_layer_file(Path(file): Path<String>) -> Response {
    let body = match file.as_str() {
        "mink-boundary.geojson" => square(-87.03, 45.22),
        "mink-trail.geojson" => json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-87.0254, 45.2210], [-87.0301, 45.2255]]
                },
                "properties": { "name": "Estuary Trail" }
            }]
        }),
        "mink-parking.geojson" => {
            // Served with a non-JSON content type, as uploads often are.
            let feature = json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-87.0254, 45.2210] },
                "properties": { "spaces": 12 }
            });
            return ([(header::CONTENT_TYPE, "text/plain")], feature.to_string()).into_response();
        }
        "kangaroo-boundary.geojson" => json!({
            "type": "MultiPolygon",
            "coordinates": [square(-87.18, 45.00)["coordinates"].clone()]
        }),
        "kangaroo-structures.geojson" => json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-87.1710, 45.0012] },
                    "properties": { "name": "Observation deck" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-87.1690, 45.0030] },
                    "properties": { "name": "Kiosk" }
                }
            ]
        }),
        "claybanks-boundary.geojson" => json!({ "foo": "bar" }),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(body).into_response()
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoJSON normalization: every layer file becomes a FeatureCollection.

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde::Serialize;
use serde_json::Value;

/// Bare geometry types accepted as layer files.
const ACCEPTED_GEOMETRY_TYPES: [&str; 4] = ["Point", "LineString", "Polygon", "MultiPolygon"];

/// Why an input could not be normalized. Callers treat this as "no layer".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum NormalizeError {
    #[error("GeoJSON input is not an object")]
    NotAnObject,

    #[error("GeoJSON object has no \"type\"")]
    MissingType,

    #[error("Unsupported GeoJSON type: {0}")]
    UnsupportedType(String),

    #[error("Malformed GeoJSON: {0}")]
    Malformed(String),
}

/// Normalize any accepted GeoJSON shape to a FeatureCollection.
///
/// - `FeatureCollection` is returned unchanged.
/// - `Feature` is wrapped in a one-element collection.
/// - `Point`, `LineString`, `Polygon` and `MultiPolygon` become a Feature
///   with empty properties inside a one-element collection.
pub fn normalize(input: &Value) -> Result<FeatureCollection, NormalizeError> {
    let Value::Object(obj) = input else {
        return Err(NormalizeError::NotAnObject);
    };
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingType)?;

    let recognized = kind == "FeatureCollection"
        || kind == "Feature"
        || ACCEPTED_GEOMETRY_TYPES.contains(&kind);
    if !recognized {
        return Err(NormalizeError::UnsupportedType(kind.to_string()));
    }

    let geojson = GeoJson::from_json_value(input.clone())
        .map_err(|e| NormalizeError::Malformed(e.to_string()))?;

    Ok(match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => single(feature),
        GeoJson::Geometry(geometry) => single(Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: Some(JsonObject::new()),
            foreign_members: None,
        }),
    })
}

/// Parse and normalize a raw document body.
pub fn normalize_str(body: &str) -> Result<FeatureCollection, NormalizeError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| NormalizeError::Malformed(e.to_string()))?;
    normalize(&value)
}

fn single(feature: Feature) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Where the map should look: a single preserve or the visible fleet.

use crate::models::layer::NormalizedGeoLayer;
use crate::models::preserve::Preserve;
use geo::{BoundingRect, Centroid, Geometry, GeometryCollection, MultiPoint, Point};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MapFocus {
    /// Recenter on one preserve.
    Center { latitude: f64, longitude: f64 },
    /// Fit the map to these bounds.
    Bounds {
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    },
}

/// Center for a focused preserve: its coordinates, else the centroid of
/// its boundary layer.
pub fn focus_on_preserve(
    preserve: &Preserve,
    boundary: Option<&NormalizedGeoLayer>,
) -> Option<MapFocus> {
    if let Some((latitude, longitude)) = preserve.coordinates() {
        return Some(MapFocus::Center {
            latitude,
            longitude,
        });
    }

    let centroid = boundary.and_then(layer_centroid)?;
    Some(MapFocus::Center {
        latitude: centroid.y(),
        longitude: centroid.x(),
    })
}

/// Bounds enclosing every preserve with valid coordinates.
pub fn fit_preserves<'a>(preserves: impl IntoIterator<Item = &'a Preserve>) -> Option<MapFocus> {
    let points: MultiPoint<f64> = preserves
        .into_iter()
        .filter_map(Preserve::coordinates)
        .map(|(lat, lng)| Point::new(lng, lat))
        .collect();

    let rect = points.bounding_rect()?;
    Some(MapFocus::Bounds {
        south: rect.min().y,
        west: rect.min().x,
        north: rect.max().y,
        east: rect.max().x,
    })
}

fn layer_centroid(layer: &NormalizedGeoLayer) -> Option<Point<f64>> {
    let geometries: Vec<Geometry<f64>> = layer
        .geometry
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .filter_map(|g| Geometry::<f64>::try_from(g.value.clone()).ok())
        .collect();

    GeometryCollection::from(geometries).centroid()
}

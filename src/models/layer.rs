// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Overlay layer types and the user's layer switches.

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A named GeoJSON overlay type attached to a preserve.
///
/// Declaration order is the draw order (boundary underneath).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum LayerType {
    Boundary,
    Trail,
    AccessibleTrails,
    Boardwalk,
    Structures,
    Parking,
}

impl LayerType {
    pub const ALL: [LayerType; 6] = [
        LayerType::Boundary,
        LayerType::Trail,
        LayerType::AccessibleTrails,
        LayerType::Boardwalk,
        LayerType::Structures,
        LayerType::Parking,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayerType::Boundary => "boundary",
            LayerType::Trail => "trail",
            LayerType::AccessibleTrails => "accessible_trails",
            LayerType::Boardwalk => "boardwalk",
            LayerType::Structures => "structures",
            LayerType::Parking => "parking",
        }
    }

    /// Visibility when the user has not touched this layer's switch.
    pub fn visible_by_default(self) -> bool {
        matches!(self, LayerType::Boundary | LayerType::Trail)
    }

    /// WordPress meta key holding this layer's file URL.
    pub fn meta_key(self) -> String {
        format!("_preserve_{}_file", self.as_str())
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown layer type: {0}")]
pub struct UnknownLayerType(pub String);

impl FromStr for LayerType {
    type Err = UnknownLayerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownLayerType(s.to_string()))
    }
}

/// The user's layer switches. Absent entries fall back to
/// [`LayerType::visible_by_default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerToggles(BTreeMap<LayerType, bool>);

impl LayerToggles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, layer_type: LayerType) -> bool {
        self.0
            .get(&layer_type)
            .copied()
            .unwrap_or_else(|| layer_type.visible_by_default())
    }

    /// Returns a copy with an explicit switch for `layer_type`.
    pub fn with(&self, layer_type: LayerType, visible: bool) -> Self {
        let mut next = self.clone();
        next.0.insert(layer_type, visible);
        next
    }

    /// Effective visibility of every layer type, for the layer panel.
    pub fn resolved(&self) -> BTreeMap<LayerType, bool> {
        LayerType::ALL
            .into_iter()
            .map(|t| (t, self.is_visible(t)))
            .collect()
    }
}

impl FromIterator<(LayerType, bool)> for LayerToggles {
    fn from_iter<I: IntoIterator<Item = (LayerType, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One preserve's overlay of one layer type, normalized to a FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedGeoLayer {
    pub preserve_id: u64,
    pub preserve_title: String,
    pub layer_type: LayerType,
    pub geometry: FeatureCollection,
}

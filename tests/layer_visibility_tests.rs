// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Layer visibility: toggles, filters and the layer cache.

use preserve_explorer::models::{LayerToggles, LayerType, NormalizedGeoLayer};
use preserve_explorer::services::layers::visible_layers;
use preserve_explorer::services::{FilterSelections, LayerCache};

mod common;

fn types(layers: &[&NormalizedGeoLayer]) -> Vec<(u64, LayerType)> {
    layers.iter().map(|l| (l.preserve_id, l.layer_type)).collect()
}

#[test]
fn test_default_toggles_hide_structures() {
    let preserves = vec![common::preserve(1, "Ridges", &[("region", &["northern_door"])])];
    let layers = vec![
        common::layer(1, LayerType::Boundary, common::square(-87.0, 45.0)),
        common::layer(1, LayerType::Structures, common::square(-87.0, 45.0)),
    ];

    let visible = visible_layers(
        &layers,
        &LayerToggles::new(),
        &preserves,
        &FilterSelections::new(),
    );
    assert_eq!(types(&visible), vec![(1, LayerType::Boundary)]);
}

#[test]
fn test_filtered_out_preserve_hides_its_layers() {
    let preserves = common::fixture_preserves();
    let layers = common::fixture_layers();
    let northern: FilterSelections = [("region", ["northern_door"])].into_iter().collect();

    let visible = visible_layers(&layers, &LayerToggles::new(), &preserves, &northern);
    assert_eq!(types(&visible), vec![(101, LayerType::Boundary)]);

    let toggles = LayerToggles::new().with(LayerType::Parking, true);
    let visible = visible_layers(&layers, &toggles, &preserves, &northern);
    assert_eq!(
        types(&visible),
        vec![(101, LayerType::Boundary), (101, LayerType::Parking)]
    );
}

#[test]
fn test_switching_boundary_off() {
    let preserves = common::fixture_preserves();
    let layers = common::fixture_layers();
    let toggles = LayerToggles::new()
        .with(LayerType::Boundary, false)
        .with(LayerType::Structures, true);

    let visible = visible_layers(&layers, &toggles, &preserves, &FilterSelections::new());
    assert_eq!(types(&visible), vec![(102, LayerType::Structures)]);
}

#[test]
fn test_layer_of_unknown_preserve_excluded() {
    let preserves = common::fixture_preserves();
    let layers = vec![common::layer(
        999,
        LayerType::Boundary,
        common::square(-87.0, 45.0),
    )];

    let visible = visible_layers(
        &layers,
        &LayerToggles::new(),
        &preserves,
        &FilterSelections::new(),
    );
    assert!(visible.is_empty());
}

#[test]
fn test_cache_snapshot_in_draw_order() {
    let cache = LayerCache::new();
    for layer in common::fixture_layers().into_iter().rev() {
        cache.insert(layer);
    }

    let order: Vec<(u64, LayerType)> = cache
        .snapshot()
        .iter()
        .map(|l| (l.preserve_id, l.layer_type))
        .collect();
    assert_eq!(
        order,
        vec![
            (101, LayerType::Boundary),
            (101, LayerType::Parking),
            (102, LayerType::Boundary),
            (102, LayerType::Structures),
        ]
    );

    let parking = cache.get(101, LayerType::Parking).unwrap();
    assert_eq!(parking.preserve_id, 101);
    assert!(cache.get(101, LayerType::Trail).is_none());
}

#[test]
fn test_cache_replaces_same_key_and_invalidates() {
    let cache = LayerCache::new();
    cache.insert(common::layer(1, LayerType::Trail, common::square(-87.0, 45.0)));
    cache.insert(common::layer(1, LayerType::Trail, common::square(-86.0, 44.0)));
    assert_eq!(cache.len(), 1);

    cache.invalidate();
    assert!(cache.is_empty());
    assert!(cache.get(1, LayerType::Trail).is_none());
}

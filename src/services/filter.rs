// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Filter match engine.
//!
//! Matching is AND across categories and OR within a category. Option
//! counts are always computed against the full preserve list so that the
//! UI can grey out zero-result options without hiding them.

use crate::models::preserve::Preserve;
use crate::models::taxonomy::{FilterTaxonomy, Partition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The user's current filter choices: category key -> selected option keys.
///
/// Empty option sets are never stored, so an empty mapping means no
/// filters are active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSelections(BTreeMap<String, BTreeSet<String>>);

impl FilterSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.0.get(category)
    }

    pub fn is_selected(&self, category: &str, option: &str) -> bool {
        self.0.get(category).is_some_and(|set| set.contains(option))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.0.iter()
    }
}

impl<C, O, I> FromIterator<(C, I)> for FilterSelections
where
    C: Into<String>,
    O: Into<String>,
    I: IntoIterator<Item = O>,
{
    fn from_iter<T: IntoIterator<Item = (C, I)>>(iter: T) -> Self {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (category, options) in iter {
            let options: BTreeSet<String> = options.into_iter().map(Into::into).collect();
            if !options.is_empty() {
                map.entry(category.into()).or_default().extend(options);
            }
        }
        Self(map)
    }
}

/// Whether `preserve` passes every active category in `selections`.
pub fn matches(preserve: &Preserve, selections: &FilterSelections) -> bool {
    selections.iter().all(|(category, wanted)| {
        wanted.is_empty()
            || preserve
                .options(category)
                .is_some_and(|have| !have.is_disjoint(wanted))
    })
}

/// The preserves that pass `selections`, in input order.
pub fn filter_preserves<'a>(
    preserves: &'a [Preserve],
    selections: &FilterSelections,
) -> Vec<&'a Preserve> {
    preserves.iter().filter(|p| matches(p, selections)).collect()
}

/// Returns a new selection mapping with `option` added or removed.
pub fn set_option(
    selections: &FilterSelections,
    category: &str,
    option: &str,
    checked: bool,
) -> FilterSelections {
    let mut next = selections.clone();
    if checked {
        next.0
            .entry(category.to_string())
            .or_default()
            .insert(option.to_string());
    } else if let Some(set) = next.0.get_mut(category) {
        set.remove(option);
        if set.is_empty() {
            next.0.remove(category);
        }
    }
    next
}

/// Reset every category.
pub fn clear_filters() -> FilterSelections {
    FilterSelections::new()
}

/// Number of selected options across all categories.
pub fn active_filter_count(selections: &FilterSelections) -> usize {
    selections.iter().map(|(_, set)| set.len()).sum()
}

/// Per-option counts for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryStats {
    pub key: String,
    pub label: String,
    pub icon: String,
    pub description: Option<String>,
    pub partition: Partition,
    pub options: Vec<OptionStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OptionStats {
    pub key: String,
    pub label: String,
    /// Preserves in the full list having this option.
    pub count: u32,
    pub available: bool,
    pub selected: bool,
}

/// Count, availability and selection state for every taxonomy option.
///
/// Counts ignore `selections`; only the `selected` flags depend on them.
/// Categories in `selections` that the taxonomy does not know are skipped.
pub fn compute_stats(
    preserves: &[Preserve],
    taxonomy: &FilterTaxonomy,
    selections: &FilterSelections,
) -> Vec<CategoryStats> {
    taxonomy
        .categories()
        .map(|(partition, category)| {
            let options = category
                .options
                .iter()
                .map(|option| {
                    let count = preserves
                        .iter()
                        .filter(|p| {
                            p.options(&category.key)
                                .is_some_and(|set| set.contains(&option.key))
                        })
                        .count() as u32;
                    OptionStats {
                        key: option.key.clone(),
                        label: option.label.clone(),
                        count,
                        available: count > 0,
                        selected: selections.is_selected(&category.key, &option.key),
                    }
                })
                .collect();

            CategoryStats {
                key: category.key.clone(),
                label: category.label.clone(),
                icon: category.icon.clone(),
                description: category.description.clone(),
                partition,
                options,
            }
        })
        .collect()
}

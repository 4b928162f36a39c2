// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Filter taxonomy model: the facet categories shown as chips and in the
//! "More filters" panel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Category keys rendered as always-visible chips when the taxonomy
/// endpoint returns a flat mapping.
pub const PRIMARY_CATEGORY_KEYS: [&str; 4] = ["region", "activity", "accessibility", "difficulty"];

/// A single selectable option within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FilterOption {
    pub key: String,
    pub label: String,
}

/// A named facet (e.g. "accessibility") with its ordered option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FilterCategory {
    pub key: String,
    pub label: String,
    pub icon: String,
    pub description: Option<String>,
    pub options: Vec<FilterOption>,
}

/// Which panel a category is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Partition {
    Primary,
    Secondary,
}

/// All filter categories, split into primary chips and the overflow panel.
///
/// A category key appears in exactly one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTaxonomy {
    pub primary: Vec<FilterCategory>,
    pub secondary: Vec<FilterCategory>,
}

impl FilterTaxonomy {
    /// Build a taxonomy from explicit partitions, dropping any key already
    /// seen (primary is checked first).
    pub fn new(primary: Vec<FilterCategory>, secondary: Vec<FilterCategory>) -> Self {
        let mut seen = HashSet::new();
        let mut dedup = |cats: Vec<FilterCategory>| -> Vec<FilterCategory> {
            cats.into_iter()
                .filter(|c| {
                    let fresh = seen.insert(c.key.clone());
                    if !fresh {
                        tracing::warn!(category = %c.key, "Duplicate filter category dropped");
                    }
                    fresh
                })
                .collect()
        };
        let primary = dedup(primary);
        let secondary = dedup(secondary);
        Self { primary, secondary }
    }

    /// Partition a flat category list with [`PRIMARY_CATEGORY_KEYS`].
    pub fn partition(categories: Vec<FilterCategory>) -> Self {
        let (primary, secondary): (Vec<_>, Vec<_>) = categories
            .into_iter()
            .partition(|c| PRIMARY_CATEGORY_KEYS.contains(&c.key.as_str()));
        Self::new(primary, secondary)
    }

    /// Decode the taxonomy endpoint payload.
    ///
    /// A payload with a `primary` member is already partitioned; anything
    /// else is a flat category map.
    pub fn from_json(value: Value) -> Result<Self, TaxonomyError> {
        let Value::Object(mut obj) = value else {
            return Err(TaxonomyError::Decode("expected a JSON object".to_string()));
        };

        if obj.contains_key("primary") {
            let primary = object_or_empty(obj.remove("primary"));
            let secondary = object_or_empty(obj.remove("secondary"));
            return Ok(Self::new(
                convert_categories(primary),
                convert_categories(secondary),
            ));
        }

        tracing::debug!(count = obj.len(), "Taxonomy is flat; partitioning locally");
        Ok(Self::partition(convert_categories(obj)))
    }

    /// Iterate all categories with their partition, primary first.
    pub fn categories(&self) -> impl Iterator<Item = (Partition, &FilterCategory)> {
        self.primary
            .iter()
            .map(|c| (Partition::Primary, c))
            .chain(self.secondary.iter().map(|c| (Partition::Secondary, c)))
    }
}

/// Errors decoding the taxonomy payload.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("Failed to decode filter taxonomy: {0}")]
    Decode(String),
}

// ─── Wire format ─────────────────────────────────────────────

/// PHP encodes an empty partition as `[]`.
fn object_or_empty(value: Option<Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[derive(Deserialize, Default)]
struct RawCategory {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    options: Option<Map<String, Value>>,
}

fn convert_categories(raw: Map<String, Value>) -> Vec<FilterCategory> {
    raw.into_iter()
        .filter_map(|(key, value)| convert_category(key, value))
        .collect()
}

fn convert_category(key: String, value: Value) -> Option<FilterCategory> {
    let Value::Object(obj) = value else {
        tracing::warn!(category = %key, "Filter category is not an object; skipping");
        return None;
    };

    // Entries without an `options` member are bare option maps.
    let (raw, options) = if obj.contains_key("options") {
        let mut raw: RawCategory = serde_json::from_value(Value::Object(obj)).unwrap_or_default();
        let options = raw.options.take().unwrap_or_default();
        (raw, options)
    } else {
        (RawCategory::default(), obj)
    };

    let options = options
        .into_iter()
        .map(|(option_key, label)| {
            let label = option_label(&option_key, &label);
            FilterOption {
                key: option_key,
                label,
            }
        })
        .collect();

    Some(FilterCategory {
        label: raw
            .label
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| title_case(&key)),
        icon: raw.icon.unwrap_or_default(),
        description: raw.description.filter(|d| !d.is_empty()),
        options,
        key,
    })
}

fn option_label(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Object(o) => o
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| title_case(key)),
        _ => title_case(key),
    }
}

/// "trail_type" -> "Trail Type"
fn title_case(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

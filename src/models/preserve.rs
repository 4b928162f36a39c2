// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Preserve record model and ingestion from the WordPress REST shape.
//!
//! All coercion of the loosely-typed `meta` object happens here, once, so the
//! rest of the crate can rely on typed fields: filter values are always sets,
//! numbers are either valid or absent.

use crate::models::layer::LayerType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Meta key prefix for filter selections (`_preserve_filter_<category>`).
pub const FILTER_META_PREFIX: &str = "_preserve_filter_";

/// A nature preserve with its location, descriptive metadata and facets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preserve {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub acres: Option<f64>,
    pub trail_length_miles: Option<f64>,
    /// Category key -> selected option keys. Never holds empty sets.
    pub filter_selections: BTreeMap<String, BTreeSet<String>>,
    pub layer_file_urls: BTreeMap<LayerType, String>,
}

impl Preserve {
    /// Marker position as (lat, lng), if both coordinates are valid.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Options selected for `category` (empty if the preserve lacks it).
    pub fn options(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.filter_selections.get(category)
    }

    /// Build a preserve from a WordPress REST record.
    pub fn from_wp(record: WpPreserve) -> Self {
        let title = record.title.rendered;
        let slug = record
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slugify(&title));
        let meta = record.meta;

        let latitude = meta_number(&meta, "_preserve_lat").filter(|v| (-90.0..=90.0).contains(v));
        let longitude =
            meta_number(&meta, "_preserve_lng").filter(|v| (-180.0..=180.0).contains(v));

        let filter_selections = meta
            .iter()
            .filter_map(|(key, value)| {
                let category = key.strip_prefix(FILTER_META_PREFIX)?;
                let options = coerce_option_set(value);
                (!category.is_empty() && !options.is_empty())
                    .then(|| (category.to_string(), options))
            })
            .collect();

        let layer_file_urls = LayerType::ALL
            .into_iter()
            .filter_map(|t| {
                let url = meta.get(&t.meta_key())?.as_str()?.trim();
                (!url.is_empty()).then(|| (t, url.to_string()))
            })
            .collect();

        Self {
            id: record.id,
            slug,
            content: record.content.rendered,
            excerpt: record.excerpt.rendered,
            latitude,
            longitude,
            acres: meta_number(&meta, "_preserve_acres").filter(|v| *v >= 0.0),
            trail_length_miles: meta_number(&meta, "_preserve_trail_length").filter(|v| *v >= 0.0),
            filter_selections,
            layer_file_urls,
            title,
        }
    }
}

/// Preserve record as returned by `GET /wp/v2/preserve`.
#[derive(Debug, Clone, Deserialize)]
pub struct WpPreserve {
    pub id: u64,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub slug: Option<String>,
    /// WordPress sends `[]` instead of `{}` for empty meta.
    #[serde(default, deserialize_with = "deserialize_meta")]
    pub meta: Map<String, Value>,
}

/// `{ "rendered": "..." }` wrapper used by WordPress for text fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

fn deserialize_meta<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

/// Summary of a preserve for list/marker API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PreserveSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub acres: Option<f64>,
    pub trail_length_miles: Option<f64>,
    pub filter_selections: BTreeMap<String, BTreeSet<String>>,
}

impl From<&Preserve> for PreserveSummary {
    fn from(p: &Preserve) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            slug: p.slug.clone(),
            excerpt: p.excerpt.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            acres: p.acres,
            trail_length_miles: p.trail_length_miles,
            filter_selections: p.filter_selections.clone(),
        }
    }
}

/// Read a numeric meta field; numbers and numeric strings are accepted.
fn meta_number(meta: &Map<String, Value>, key: &str) -> Option<f64> {
    number_value(meta.get(key)?)
}

fn number_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        // Single-element arrays come from `register_meta` without `single`.
        Value::Array(items) if items.len() == 1 => number_value(&items[0]),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Coerce a filter meta value into a set: arrays, scalars, or nothing.
fn coerce_option_set(value: &Value) -> BTreeSet<String> {
    fn scalar(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    match value {
        Value::Array(items) => items.iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
    }
}

/// Derive a URL-safe slug from a (rendered) title.
pub fn slugify(title: &str) -> String {
    let decoded = decode_entities(title);
    let mut slug = String::with_capacity(decoded.len());
    let mut pending_dash = false;

    for ch in decoded.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch != '\'' && ch != '\u{2019}' {
            pending_dash = true;
        }
    }
    slug
}

/// Decode the handful of HTML entities WordPress emits in rendered titles.
fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&#038;", "&")
        .replace("&#8217;", "\u{2019}")
        .replace("&#8216;", "\u{2018}")
        .replace("&#8211;", "-")
        .replace("&#8212;", "-")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&nbsp;", " ")
}

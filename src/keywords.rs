//! Keyword derivation for photo-search queries
//!
//! Two pure functions drive the explore page: [`style_queries`] turns the
//! visitor's chosen styles into gender-prefixed search queries, and
//! [`accessory_keywords`] maps the current weather description to a curated
//! accessory keyword list. Both are total and deterministic; no input ever
//! produces an error.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Fallback keywords used when a weather description is not in the table
const GENERAL_KEYWORDS: [&str; 2] = ["accessory", "clothing"];

/// Fixed mapping from weather-provider condition descriptions to accessory
/// keywords. Lookup is exact and case-sensitive: descriptions arrive verbatim
/// from the provider and unknown phrases take the fallback path instead of
/// being normalized.
const ACCESSORY_ENTRIES: &[(&str, &[&str])] = &[
    ("clear sky", &["sunglasses", "hat"]),
    ("few clouds", &["light jacket", "cap"]),
    ("scattered clouds", &["light jacket", "cap"]),
    ("broken clouds", &["jacket", "cap"]),
    ("moderate rain", &["umbrella", "raincoat"]),
    ("light rain", &["umbrella", "raincoat"]),
    ("shower rain", &["umbrella", "raincoat"]),
    ("rain", &["umbrella", "raincoat"]),
    ("thunderstorm", &["umbrella", "raincoat"]),
    ("snow", &["gloves", "scarf", "boots"]),
    ("mist", &["scarf", "hat"]),
    ("smoke", &["mask", "beanie"]),
    ("haze", &["mask", "beanie"]),
    ("dust", &["mask", "hat"]),
    ("fog", &["scarf", "hat"]),
    ("sand", &["mask", "hat"]),
    ("ash", &["mask", "hat"]),
    ("squall", &["windbreaker", "hat"]),
    ("tornado", &["windbreaker", "hat"]),
    ("overcast clouds", &["jacket", "scarf"]),
];

static ACCESSORY_TABLE: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| ACCESSORY_ENTRIES.iter().copied().collect());

/// Build one photo-search query per chosen style, preserving input order.
///
/// Each query is the gender and the style name joined by a single space. An
/// empty gender is concatenated as-is, leaving a leading space in the query;
/// the photo provider tolerates it, so the artifact is kept rather than
/// special-cased.
#[must_use]
pub fn style_queries(gender: &str, styles: &[String]) -> Vec<String> {
    styles
        .iter()
        .map(|style| format!("{gender} {style}"))
        .collect()
}

/// Derive accessory keywords for a weather description.
///
/// Known descriptions resolve through [`ACCESSORY_TABLE`]; anything else
/// falls back to the raw description plus the generic keyword pair. The
/// gender leads the list when present and is skipped entirely when empty.
#[must_use]
pub fn accessory_keywords(description: &str, gender: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    if !gender.is_empty() {
        keywords.push(gender.to_string());
    }

    match ACCESSORY_TABLE.get(description) {
        Some(entries) => keywords.extend(entries.iter().map(|entry| (*entry).to_string())),
        None => {
            keywords.push(description.to_string());
            keywords.extend(GENERAL_KEYWORDS.iter().map(|entry| (*entry).to_string()));
        }
    }

    keywords
}

//! Brand-name canonicalization across a result set.
//!
//! AI answers spell the same brand several ways ("Condé Nast Traveler" vs
//! "Conde Nast Traveler", "National Geographic" vs "National Geographic
//! Traveler"). [`build_normalization_map`] picks one canonical spelling per
//! group and [`apply_brand_normalization`] rewrites mention lists and
//! sentiment maps to use it.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use aivis_core::{RunResult, Sentiment};

use crate::text::{count_non_ascii, fold};

/// Prefix merging only considers multi-word names at least this long, so short
/// generic words never swallow longer brands.
const PREFIX_MERGE_MIN_CHARS: usize = 10;

/// `variant → canonical` spelling map.
///
/// Never contains identity entries, and every target is itself unmapped, so
/// resolving a name twice gives the same answer as resolving it once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandNormalizationMap {
    map: BTreeMap<String, String>,
}

impl BrandNormalizationMap {
    /// The canonical spelling for `name`, or `name` itself when unmapped.
    #[must_use]
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map_or(name, String::as_str)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }
}

fn brand_names(result: &RunResult) -> impl Iterator<Item = &String> {
    result
        .competitors_mentioned
        .iter()
        .chain(result.all_brands_mentioned.iter().flatten())
        .chain(result.competitor_sentiments.keys())
        .chain(
            result
                .sources
                .iter()
                .flat_map(|source| source.brand_sentiments.keys()),
        )
}

/// Build the normalization map for a result set.
///
/// 1. Count every brand spelling in mention lists and sentiment keys.
/// 2. Group spellings by their case- and diacritic-folded form; the canonical
///    member is the most frequent, then the one with fewest non-ASCII chars,
///    then the shortest, then the lexicographically smallest.
/// 3. Merge multi-word canonical names into their shortest multi-word prefix
///    (`"National Geographic Traveler"` → `"National Geographic"`).
#[must_use]
pub fn build_normalization_map(results: &[RunResult]) -> BrandNormalizationMap {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for result in results {
        for name in brand_names(result) {
            if name.trim().is_empty() {
                continue;
            }
            *counts.entry(name.as_str()).or_default() += 1;
        }
    }

    let mut groups: BTreeMap<String, Vec<(&str, usize)>> = BTreeMap::new();
    for (&name, &count) in &counts {
        groups.entry(fold(name)).or_default().push((name, count));
    }

    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for variants in groups.values().filter(|v| v.len() >= 2) {
        let Some(&(canonical, _)) = variants.iter().min_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| count_non_ascii(a.0).cmp(&count_non_ascii(b.0)))
                .then_with(|| a.0.chars().count().cmp(&b.0.chars().count()))
                .then_with(|| a.0.cmp(b.0))
        }) else {
            continue;
        };
        for &(variant, _) in variants {
            if variant != canonical {
                map.insert(variant.to_string(), canonical.to_string());
            }
        }
    }

    merge_prefixes(&counts, &mut map);

    map.retain(|variant, canonical| variant != canonical);

    tracing::debug!(
        spellings = counts.len(),
        merged = map.len(),
        "built brand normalization map"
    );

    BrandNormalizationMap { map }
}

fn merge_prefixes(counts: &BTreeMap<&str, usize>, map: &mut BTreeMap<String, String>) {
    let canonical: BTreeSet<String> = counts
        .keys()
        .map(|name| map.get(*name).cloned().unwrap_or_else(|| (*name).to_string()))
        .collect();

    let mut candidates: Vec<(String, String)> = canonical
        .into_iter()
        .filter(|name| name.chars().count() >= PREFIX_MERGE_MIN_CHARS && name.contains(' '))
        .map(|name| {
            let folded = fold(&name);
            (name, folded)
        })
        .collect();
    candidates.sort_by(|a, b| {
        a.0.chars()
            .count()
            .cmp(&b.0.chars().count())
            .then_with(|| a.0.cmp(&b.0))
    });

    for (i, (longer, longer_folded)) in candidates.iter().enumerate() {
        // Sorted by length, so the first hit is the shortest prefix. A
        // shortest prefix has no prefix of its own, which keeps the map acyclic.
        let shorter = candidates[..i].iter().find(|(shorter, shorter_folded)| {
            shorter.chars().count() < longer.chars().count()
                && longer_folded.starts_with(&format!("{shorter_folded} "))
        });
        let Some((shorter, _)) = shorter else {
            continue;
        };

        for target in map.values_mut() {
            if target == longer {
                target.clone_from(shorter);
            }
        }
        map.insert(longer.clone(), shorter.clone());
    }
}

/// Rewrite results to canonical brand spellings.
///
/// Mention lists are deduplicated preserving first occurrence; colliding
/// sentiment keys keep the higher-priority sentiment ([`Sentiment::merge`]).
/// Returns the input slice untouched when no result references a mapped name.
#[must_use]
pub fn apply_brand_normalization<'a>(
    results: &'a [RunResult],
    map: &BrandNormalizationMap,
) -> Cow<'a, [RunResult]> {
    if map.is_empty() || !results.iter().any(|r| references_mapped_name(r, map)) {
        return Cow::Borrowed(results);
    }

    Cow::Owned(
        results
            .iter()
            .map(|result| {
                if references_mapped_name(result, map) {
                    normalize_result(result, map)
                } else {
                    result.clone()
                }
            })
            .collect(),
    )
}

fn references_mapped_name(result: &RunResult, map: &BrandNormalizationMap) -> bool {
    brand_names(result).any(|name| map.contains(name))
}

fn normalize_result(result: &RunResult, map: &BrandNormalizationMap) -> RunResult {
    let mut normalized = result.clone();
    normalized.competitors_mentioned = normalize_list(&result.competitors_mentioned, map);
    normalized.all_brands_mentioned = result
        .all_brands_mentioned
        .as_ref()
        .map(|list| normalize_list(list, map));
    normalized.competitor_sentiments = normalize_sentiments(&result.competitor_sentiments, map);
    for source in &mut normalized.sources {
        source.brand_sentiments = normalize_sentiments(&source.brand_sentiments, map);
    }
    normalized
}

fn normalize_list(list: &[String], map: &BrandNormalizationMap) -> Vec<String> {
    let mut seen = HashSet::new();
    list.iter()
        .map(|name| map.resolve(name))
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

fn normalize_sentiments(
    sentiments: &BTreeMap<String, Sentiment>,
    map: &BrandNormalizationMap,
) -> BTreeMap<String, Sentiment> {
    let mut merged: BTreeMap<String, Sentiment> = BTreeMap::new();
    for (name, &sentiment) in sentiments {
        merged
            .entry(map.resolve(name).to_string())
            .and_modify(|existing| *existing = existing.merge(sentiment))
            .or_insert(sentiment);
    }
    merged
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

//! Base filtering: the brand/prompt/provider universes of a run, mention-flag
//! repair, and the global dashboard filters.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};

use aivis_core::{ExcludedBrands, GlobalFilters, RunResult, RunStatusResponse};

use crate::text::{eq_ignore_case, fold};

/// Providers in display order, most widely used first.
pub const PROVIDER_ORDER: &[&str] = &[
    "openai",
    "ai_overviews",
    "gemini",
    "anthropic",
    "perplexity",
    "grok",
    "llama",
];

/// Human-readable provider name for tables and insights.
#[must_use]
pub fn provider_label(provider: &str) -> String {
    match provider {
        "openai" => "ChatGPT".to_string(),
        "ai_overviews" | "google_ai_overview" => "Google AI Overviews".to_string(),
        "gemini" => "Gemini".to_string(),
        "anthropic" => "Claude".to_string(),
        "perplexity" => "Perplexity".to_string(),
        "grok" => "Grok".to_string(),
        "llama" => "Llama".to_string(),
        other => other.to_string(),
    }
}

fn valid(results: &[RunResult]) -> impl Iterator<Item = &RunResult> {
    results.iter().filter(|r| !r.is_errored())
}

/// Distinct prompts of non-errored results, in first-seen order.
#[must_use]
pub fn available_prompts(results: &[RunResult]) -> Vec<String> {
    let mut seen = HashSet::new();
    valid(results)
        .filter(|r| seen.insert(r.prompt.as_str()))
        .map(|r| r.prompt.clone())
        .collect()
}

/// Distinct providers of non-errored results: known providers in
/// [`PROVIDER_ORDER`], then unknown ones alphabetically.
#[must_use]
pub fn available_providers(results: &[RunResult]) -> Vec<String> {
    sort_providers(valid(results).map(|r| r.provider.as_str()))
}

pub(crate) fn sort_providers<'a>(present: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present: BTreeSet<&str> = present.into_iter().collect();
    let mut ordered: Vec<String> = PROVIDER_ORDER
        .iter()
        .filter(|p| present.contains(**p))
        .map(|p| (*p).to_string())
        .collect();
    ordered.extend(
        present
            .iter()
            .filter(|p| !PROVIDER_ORDER.contains(p))
            .map(|p| (*p).to_string()),
    );
    ordered
}

/// Brand universe of a run minus excluded brands.
///
/// Non-category searches list the subject first; every other name follows in
/// first-seen order. Names are compared case-insensitively.
#[must_use]
pub fn available_brands(run: &RunStatusResponse, excluded: &ExcludedBrands) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut brands = Vec::new();

    if !run.search_type.is_category() && !run.brand.trim().is_empty() {
        seen.insert(run.brand.to_lowercase());
        if !excluded.contains(&run.brand) {
            brands.push(run.brand.clone());
        }
    }

    for result in valid(&run.results) {
        for name in result.mention_list() {
            if name.trim().is_empty() || !seen.insert(name.to_lowercase()) {
                continue;
            }
            if !excluded.contains(name) {
                brands.push(name.clone());
            }
        }
    }

    brands
}

/// Flip `brand_mentioned` on results whose text contains the subject but whose
/// flag is not set. Upstream extraction misses mentions in supplemental
/// sections, most often in AI Overview captures.
///
/// Category searches are left alone: their subject is not a brand.
#[must_use]
pub fn corrected_results(run: &RunStatusResponse) -> Cow<'_, [RunResult]> {
    let subject = fold(run.brand.trim());
    if run.search_type.is_category() || subject.is_empty() {
        return Cow::Borrowed(&run.results);
    }

    let needs_fix = |r: &RunResult| {
        !r.is_errored() && !r.is_brand_mentioned() && fold(r.text()).contains(&subject)
    };

    if !run.results.iter().any(needs_fix) {
        return Cow::Borrowed(&run.results);
    }

    let mut fixed = 0usize;
    let corrected = run
        .results
        .iter()
        .map(|r| {
            if needs_fix(r) {
                fixed += 1;
                RunResult {
                    brand_mentioned: Some(true),
                    ..r.clone()
                }
            } else {
                r.clone()
            }
        })
        .collect();

    tracing::debug!(brand = %run.brand, fixed, "corrected missed brand mentions");
    Cow::Owned(corrected)
}

/// `true` when `brand` is the mentioned subject or appears in the result's
/// mention list.
#[must_use]
pub fn result_mentions(result: &RunResult, brand: &str, subject: &str) -> bool {
    if result.is_brand_mentioned() && fold(brand) == fold(subject) {
        return true;
    }
    result
        .mention_list()
        .iter()
        .any(|name| eq_ignore_case(name, brand))
}

/// Apply provider / prompt / brand filters and drop errored results.
#[must_use]
pub fn globally_filtered_results<'a>(
    results: &'a [RunResult],
    filters: &GlobalFilters,
    subject: &str,
) -> Vec<&'a RunResult> {
    results
        .iter()
        .filter(|r| passes_global_filters(r, filters, subject))
        .collect()
}

/// Single-result form of [`globally_filtered_results`].
#[must_use]
pub fn passes_global_filters(result: &RunResult, filters: &GlobalFilters, subject: &str) -> bool {
    !result.is_errored()
        && filters
            .provider
            .as_ref()
            .is_none_or(|p| &result.provider == p)
        && filters.prompt.as_ref().is_none_or(|p| &result.prompt == p)
        && filters
            .brand
            .as_ref()
            .is_none_or(|b| result_mentions(result, b, subject))
}

/// Lowercased subject plus every brand mentioned in a non-errored result.
///
/// Distinguishes tracked brands from names extracted incidentally, such as a
/// publisher in a citation title.
#[must_use]
pub fn tracked_brands(run: &RunStatusResponse) -> HashSet<String> {
    let mut tracked = HashSet::new();
    if !run.brand.trim().is_empty() {
        tracked.insert(run.brand.to_lowercase());
    }
    for result in valid(&run.results) {
        for name in result
            .competitors_mentioned
            .iter()
            .chain(result.all_brands_mentioned.iter().flatten())
        {
            if !name.trim().is_empty() {
                tracked.insert(name.to_lowercase());
            }
        }
    }
    tracked
}

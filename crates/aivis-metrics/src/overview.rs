//! Overview tab: headline visibility numbers for the selected brand.

use std::collections::BTreeSet;

use aivis_core::RunResult;
use serde::Serialize;

use crate::brand_metrics::{
    brand_stats, collect_brand_stats, BrandStats, FlatRate, VisibilityModel,
};
use crate::dataset::Dataset;
use crate::filters::{provider_label, result_mentions};
use crate::stats::{gini, percent, ratio, round1, score_1_to_10};
use crate::text::domain_from_url;

/// Fragmentation score when there are no competitors to compare.
pub const NEUTRAL_FRAGMENTATION: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderOverview {
    pub provider: String,
    pub label: String,
    pub total: usize,
    pub mentioned: usize,
    pub visibility: f64,
    pub avg_rank: Option<f64>,
    pub top1_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub brand: String,
    pub total_results: usize,
    pub mentioned_results: usize,
    /// Percentage of non-errored results mentioning the brand.
    pub overall_visibility: f64,
    /// Mean inferred rank over results that mention the brand.
    pub avg_rank: Option<f64>,
    /// The brand's mentions as a percentage of all tracked-brand mentions.
    pub share_of_voice: f64,
    pub unique_sources: usize,
    /// Percentage of all results, mentioned or not, where the brand is first.
    pub top1_rate: f64,
    pub avg_brands_per_query: f64,
    /// 1 (one competitor dominates) to 10 (mentions evenly spread).
    pub fragmentation_score: u8,
    pub providers: Vec<ProviderOverview>,
}

impl Default for OverviewMetrics {
    fn default() -> Self {
        Self {
            brand: String::new(),
            total_results: 0,
            mentioned_results: 0,
            overall_visibility: 0.0,
            avg_rank: None,
            share_of_voice: 0.0,
            unique_sources: 0,
            top1_rate: 0.0,
            avg_brands_per_query: 0.0,
            fragmentation_score: NEUTRAL_FRAGMENTATION,
            providers: Vec::new(),
        }
    }
}

/// Compute overview metrics for the dataset's selected brand.
#[must_use]
pub fn compute_overview_metrics(ds: &Dataset) -> OverviewMetrics {
    if ds.is_empty() || ds.selected_brand.is_empty() {
        return OverviewMetrics {
            brand: ds.selected_brand.clone(),
            ..OverviewMetrics::default()
        };
    }

    let results = ds.filtered();
    let subject = ds.subject_brand();
    let all_stats = collect_brand_stats(&results, &ds.brands, subject);

    let selected = all_stats
        .iter()
        .find(|s| s.brand == ds.selected_brand)
        .cloned()
        .unwrap_or_else(|| brand_stats(&results, &ds.selected_brand, subject));

    let total_events = ds.total_mention_events(&results);

    // Category searches have no subject, so every brand is a competitor.
    let competitor_mentions: Vec<usize> = all_stats
        .iter()
        .filter(|s| !ds.is_subject(&s.brand))
        .map(|s| s.overall.mentioned)
        .collect();

    OverviewMetrics {
        brand: ds.selected_brand.clone(),
        total_results: selected.overall.total,
        mentioned_results: selected.overall.mentioned,
        overall_visibility: round1(FlatRate.visibility(&selected)),
        avg_rank: selected.overall.avg_rank().map(round1),
        share_of_voice: round1(percent(selected.overall.mentioned, total_events)),
        unique_sources: unique_source_domains(&results),
        top1_rate: round1(selected.overall.first_position_rate()),
        avg_brands_per_query: round1(avg_brands_per_query(&results, &ds.brands, subject)),
        fragmentation_score: fragmentation_score(&competitor_mentions),
        providers: provider_breakdown(ds, &selected),
    }
}

/// Share of voice for every non-excluded brand, in dataset brand order.
///
/// Values sum to ~100 when no brand is excluded and at least one is mentioned.
/// Excluded brands still count toward the denominator.
#[must_use]
pub fn compute_share_of_voice(ds: &Dataset) -> Vec<(String, f64)> {
    if ds.is_empty() {
        return Vec::new();
    }
    let results = ds.filtered();
    let stats = collect_brand_stats(&results, &ds.brands, ds.subject_brand());
    let total = ds.total_mention_events(&results);
    stats
        .into_iter()
        .map(|s| {
            let share = percent(s.overall.mentioned, total);
            (s.brand, share)
        })
        .collect()
}

fn provider_breakdown(ds: &Dataset, stats: &BrandStats) -> Vec<ProviderOverview> {
    ds.providers
        .iter()
        .filter_map(|provider| {
            let tally = stats.by_provider.get(provider)?;
            Some(ProviderOverview {
                provider: provider.clone(),
                label: provider_label(provider),
                total: tally.total,
                mentioned: tally.mentioned,
                visibility: round1(tally.mention_rate()),
                avg_rank: tally.avg_rank().map(round1),
                top1_rate: round1(tally.first_position_rate()),
            })
        })
        .collect()
}

/// Distinct bare hostnames cited across `results`.
#[must_use]
pub fn unique_source_domains(results: &[&RunResult]) -> usize {
    results
        .iter()
        .flat_map(|r| r.sources.iter())
        .filter_map(|s| domain_from_url(&s.url))
        .collect::<BTreeSet<_>>()
        .len()
}

#[allow(clippy::cast_precision_loss)]
fn avg_brands_per_query(results: &[&RunResult], brands: &[String], subject: &str) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let surfaced: usize = results
        .iter()
        .map(|r| brands.iter().filter(|b| result_mentions(r, b, subject)).count())
        .sum();
    surfaced as f64 / results.len() as f64
}

/// Competitive Fragmentation Score from per-competitor mention counts.
///
/// Shares of total mentions → Gini coefficient → normalized by the maximum
/// Gini for `n` brands, `(n-1)/n` → inverted into a spread → raised to 1.1 to
/// compress the top of the range → mapped linearly onto 1..=10.
///
/// No competitors yields the neutral 5; a single competitor yields 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fragmentation_score(mention_counts: &[usize]) -> u8 {
    let counts: Vec<usize> = mention_counts.iter().copied().filter(|&c| c > 0).collect();
    match counts.len() {
        0 => NEUTRAL_FRAGMENTATION,
        1 => 1,
        n => {
            let total: usize = counts.iter().sum();
            let shares: Vec<f64> = counts.iter().map(|&c| ratio(c, total)).collect();
            let n = n as f64;
            let max_gini = (n - 1.0) / n;
            let normalized = (gini(&shares) / max_gini).clamp(0.0, 1.0);
            let spread = (1.0 - normalized).powf(1.1);
            score_1_to_10(1.0 + 9.0 * spread)
        }
    }
}

#[cfg(test)]
#[path = "overview_test.rs"]
mod tests;

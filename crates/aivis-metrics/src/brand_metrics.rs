//! Per-brand tallies shared by every dashboard tab.
//!
//! Overview, competitive, and source metrics all need the same counts
//! (mentions, ranks, first positions, sentiment) per brand and per provider.
//! [`collect_brand_stats`] gathers them in one pass; tab-specific formulas
//! are expressed as [`VisibilityModel`] implementations on top.

use std::collections::BTreeMap;

use aivis_core::{RunResult, Sentiment};

use crate::ranking::ResultPositions;
use crate::stats::{mean, percent};
use crate::text::{eq_ignore_case, fold};

/// Counts for one brand within one provider, or across all providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub total: usize,
    pub mentioned: usize,
    pub first_position: usize,
    pub rank_sum: u64,
    pub ranked: usize,
    pub sentiment_sum: u64,
    pub sentiment_count: usize,
}

impl Tally {
    fn record(&mut self, rank: u32, sentiment: Option<Sentiment>) {
        self.total += 1;
        if rank == 0 {
            return;
        }
        self.mentioned += 1;
        self.rank_sum += u64::from(rank);
        self.ranked += 1;
        if rank == 1 {
            self.first_position += 1;
        }
        if let Some(s) = sentiment.filter(|s| s.is_mentioned()) {
            self.sentiment_sum += u64::from(s.score());
            self.sentiment_count += 1;
        }
    }

    /// Percentage of results mentioning the brand.
    #[must_use]
    pub fn mention_rate(&self) -> f64 {
        percent(self.mentioned, self.total)
    }

    /// Mean rank over results that mention the brand.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_rank(&self) -> Option<f64> {
        (self.ranked > 0).then(|| self.rank_sum as f64 / self.ranked as f64)
    }

    /// Percentage of all results in which the brand comes first.
    #[must_use]
    pub fn first_position_rate(&self) -> f64 {
        percent(self.first_position, self.total)
    }

    /// Mean ordinal sentiment, ignoring `not_mentioned`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_sentiment(&self) -> Option<f64> {
        (self.sentiment_count > 0)
            .then(|| self.sentiment_sum as f64 / self.sentiment_count as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandStats {
    pub brand: String,
    pub overall: Tally,
    pub by_provider: BTreeMap<String, Tally>,
}

impl BrandStats {
    #[must_use]
    pub fn provider_rates(&self) -> BTreeMap<String, f64> {
        self.by_provider
            .iter()
            .map(|(provider, tally)| (provider.clone(), tally.mention_rate()))
            .collect()
    }
}

/// How a tab turns a brand's tallies into a single visibility percentage.
pub trait VisibilityModel {
    fn visibility(&self, stats: &BrandStats) -> f64;
}

/// Mentioned results over all results. Used on the overview tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRate;

impl VisibilityModel for FlatRate {
    fn visibility(&self, stats: &BrandStats) -> f64 {
        stats.overall.mention_rate()
    }
}

/// Unweighted mean of per-provider mention rates, so a provider with more
/// samples does not dominate. Used on the competitive tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderAveraged;

impl VisibilityModel for ProviderAveraged {
    fn visibility(&self, stats: &BrandStats) -> f64 {
        let rates: Vec<f64> = stats.by_provider.values().map(Tally::mention_rate).collect();
        mean(&rates).unwrap_or(0.0)
    }
}

/// Sentiment recorded for `brand` in `result`: the response-level brand
/// sentiment for the subject, the competitor map entry otherwise.
#[must_use]
pub fn sentiment_for(result: &RunResult, brand: &str, subject: &str) -> Option<Sentiment> {
    if !subject.is_empty() && fold(brand) == fold(subject) {
        return result.brand_sentiment;
    }
    if let Some(&s) = result.competitor_sentiments.get(brand) {
        return Some(s);
    }
    result
        .competitor_sentiments
        .iter()
        .find(|(name, _)| eq_ignore_case(name, brand))
        .map(|(_, &s)| s)
}

/// Gather tallies for each brand in `brands` over `results`.
///
/// Positions are inferred once per result and shared across brands. The
/// returned vector is in the same order as `brands`.
#[must_use]
pub fn collect_brand_stats(results: &[&RunResult], brands: &[String], subject: &str) -> Vec<BrandStats> {
    let mut stats: Vec<BrandStats> = brands
        .iter()
        .map(|brand| BrandStats {
            brand: brand.clone(),
            ..BrandStats::default()
        })
        .collect();

    for result in results {
        let positions = ResultPositions::new(result, subject);
        for entry in &mut stats {
            let rank = positions.rank_of(&entry.brand);
            let sentiment = sentiment_for(result, &entry.brand, subject);
            entry.overall.record(rank, sentiment);
            entry
                .by_provider
                .entry(result.provider.clone())
                .or_default()
                .record(rank, sentiment);
        }
    }

    stats
}

/// Tallies for a single brand.
#[must_use]
pub fn brand_stats(results: &[&RunResult], brand: &str, subject: &str) -> BrandStats {
    collect_brand_stats(results, &[brand.to_string()], subject)
        .pop()
        .unwrap_or_default()
}

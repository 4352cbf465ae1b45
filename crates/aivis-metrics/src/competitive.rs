//! Competitive tab: per-brand comparison table and co-occurrence counts.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::brand_metrics::{collect_brand_stats, ProviderAveraged, VisibilityModel};
use crate::dataset::Dataset;
use crate::filters::result_mentions;
use crate::ranking::ResultPositions;
use crate::stats::{percent, round1};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandBreakdownRow {
    pub brand: String,
    pub is_subject: bool,
    /// Unweighted mean of per-provider mention rates.
    pub visibility: f64,
    pub share_of_voice: f64,
    /// Share of responses mentioning any tracked brand in which this brand
    /// is named first.
    pub first_position_rate: f64,
    pub avg_rank: Option<f64>,
    pub avg_sentiment: Option<f64>,
    pub mentions: usize,
    pub provider_rates: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandPair {
    pub brand_a: String,
    pub brand_b: String,
    pub count: usize,
}

/// One row per non-excluded brand, sorted by visibility, then mentions, then
/// name.
#[must_use]
pub fn compute_brand_breakdown(ds: &Dataset) -> Vec<BrandBreakdownRow> {
    if ds.is_empty() {
        return Vec::new();
    }
    let results = ds.filtered();
    let subject = ds.subject_brand();
    let stats = collect_brand_stats(&results, &ds.brands, subject);
    let total_mentions = ds.total_mention_events(&results);

    // First positions are counted among non-excluded brands only.
    let mut firsts: HashMap<&str, usize> = HashMap::new();
    let mut responses_with_brand = 0usize;
    for result in &results {
        let positions = ResultPositions::new(result, subject);
        let include = |name: &str| !ds.excluded.contains(name);
        let ranks: Vec<(&str, u32)> = ds
            .brands
            .iter()
            .map(|b| (b.as_str(), positions.rank_among(b, include)))
            .filter(|(_, rank)| *rank > 0)
            .collect();
        if ranks.is_empty() {
            continue;
        }
        responses_with_brand += 1;
        if let Some(&(leader, _)) = ranks.iter().min_by_key(|(_, rank)| *rank) {
            *firsts.entry(leader).or_default() += 1;
        }
    }

    let mut rows: Vec<BrandBreakdownRow> = stats
        .iter()
        .map(|s| BrandBreakdownRow {
            brand: s.brand.clone(),
            is_subject: ds.is_subject(&s.brand),
            visibility: round1(ProviderAveraged.visibility(s)),
            share_of_voice: round1(percent(s.overall.mentioned, total_mentions)),
            first_position_rate: round1(percent(
                firsts.get(s.brand.as_str()).copied().unwrap_or(0),
                responses_with_brand,
            )),
            avg_rank: s.overall.avg_rank().map(round1),
            avg_sentiment: s.overall.avg_sentiment().map(round1),
            mentions: s.overall.mentioned,
            provider_rates: s
                .provider_rates()
                .into_iter()
                .map(|(p, r)| (p, round1(r)))
                .collect(),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.visibility
            .partial_cmp(&a.visibility)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.mentions.cmp(&a.mentions))
            .then_with(|| a.brand.cmp(&b.brand))
    });
    rows
}

/// Unordered pairs of brands named in the same response, most frequent first.
#[must_use]
pub fn compute_brand_cooccurrence(ds: &Dataset) -> Vec<BrandPair> {
    let subject = ds.subject_brand();
    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();

    for result in ds.filtered() {
        let present: Vec<usize> = ds
            .brands
            .iter()
            .enumerate()
            .filter(|(_, b)| result_mentions(result, b, subject))
            .map(|(i, _)| i)
            .collect();
        for (n, &a) in present.iter().enumerate() {
            for &b in &present[n + 1..] {
                *counts.entry((a, b)).or_default() += 1;
            }
        }
    }

    let mut pairs: Vec<BrandPair> = counts
        .into_iter()
        .map(|((a, b), count)| BrandPair {
            brand_a: ds.brands[a].clone(),
            brand_b: ds.brands[b].clone(),
            count,
        })
        .collect();
    pairs.sort_by(|x, y| {
        y.count
            .cmp(&x.count)
            .then_with(|| x.brand_a.cmp(&y.brand_a))
            .then_with(|| x.brand_b.cmp(&y.brand_b))
    });
    pairs
}

#[cfg(test)]
mod tests {
    use aivis_core::{DashboardState, RunResult, RunStatusResponse, Sentiment};

    use super::*;

    fn result(provider: &str, text: &str, brands: &[&str]) -> RunResult {
        RunResult {
            provider: provider.to_string(),
            prompt: "best running shoes".to_string(),
            response_text: Some(text.to_string()),
            brand_mentioned: Some(text.contains("Nike")),
            all_brands_mentioned: Some(brands.iter().map(|b| (*b).to_string()).collect()),
            competitors_mentioned: brands
                .iter()
                .filter(|b| **b != "Nike")
                .map(|b| (*b).to_string())
                .collect(),
            ..RunResult::default()
        }
    }

    fn dataset(results: Vec<RunResult>, state: &DashboardState) -> Dataset {
        let run = RunStatusResponse {
            brand: "Nike".to_string(),
            results,
            ..RunStatusResponse::default()
        };
        Dataset::from_run(&run, state)
    }

    #[test]
    fn breakdown_sorts_by_visibility_then_mentions() {
        let ds = dataset(
            vec![
                result("openai", "Adidas, Nike", &["Adidas", "Nike"]),
                result("openai", "Adidas, Puma", &["Adidas", "Puma"]),
                result("gemini", "Adidas", &["Adidas"]),
            ],
            &DashboardState::default(),
        );
        let rows = compute_brand_breakdown(&ds);
        let order: Vec<&str> = rows.iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(order, vec!["Adidas", "Nike", "Puma"]);
        assert!((rows[0].visibility - 100.0).abs() < 1e-9);
        // Nike: openai 50%, gemini 0% → 25%.
        assert!((rows[1].visibility - 25.0).abs() < 1e-9);
        assert!(rows[1].is_subject);
    }

    #[test]
    fn first_position_rates_sum_to_hundred() {
        let ds = dataset(
            vec![
                result("openai", "Nike then Adidas", &["Nike", "Adidas"]),
                result("openai", "Adidas then Nike", &["Adidas", "Nike"]),
                result("gemini", "Puma alone", &["Puma"]),
                result("gemini", "nothing relevant", &[]),
            ],
            &DashboardState::default(),
        );
        let rows = compute_brand_breakdown(&ds);
        let total: f64 = rows.iter().map(|r| r.first_position_rate).sum();
        assert!((total - 100.0).abs() < 0.2);
    }

    #[test]
    fn excluded_leader_hands_first_position_to_next_brand() {
        let mut state = DashboardState::default();
        state.excluded_brands.insert("Adidas");
        let ds = dataset(
            vec![result("openai", "Adidas, Nike, Puma", &["Adidas", "Nike", "Puma"])],
            &state,
        );
        let rows = compute_brand_breakdown(&ds);
        let nike = rows.iter().find(|r| r.brand == "Nike").map(|r| r.first_position_rate);
        assert_eq!(nike, Some(100.0));
        assert!(rows.iter().all(|r| r.brand != "Adidas"));
        // Adidas is hidden but its mention still counts toward the total.
        let nike_share = rows.iter().find(|r| r.brand == "Nike").map(|r| r.share_of_voice);
        assert_eq!(nike_share, Some(33.3));
    }

    #[test]
    fn average_sentiment_ignores_not_mentioned() {
        let mut a = result("openai", "Nike, Adidas", &["Nike", "Adidas"]);
        a.competitor_sentiments
            .insert("Adidas".to_string(), Sentiment::StrongEndorsement);
        let mut b = result("openai", "Nike, Adidas", &["Nike", "Adidas"]);
        b.competitor_sentiments
            .insert("Adidas".to_string(), Sentiment::NotMentioned);
        let ds = dataset(vec![a, b], &DashboardState::default());
        let rows = compute_brand_breakdown(&ds);
        let adidas = rows.iter().find(|r| r.brand == "Adidas");
        assert_eq!(adidas.and_then(|r| r.avg_sentiment), Some(5.0));
    }

    #[test]
    fn cooccurrence_counts_unordered_pairs() {
        let ds = dataset(
            vec![
                result("openai", "Nike, Adidas, Puma", &["Nike", "Adidas", "Puma"]),
                result("gemini", "Adidas and Nike", &["Adidas", "Nike"]),
            ],
            &DashboardState::default(),
        );
        let pairs = compute_brand_cooccurrence(&ds);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].count, 2);
        assert_eq!(pairs[0].brand_a, "Nike");
        assert_eq!(pairs[0].brand_b, "Adidas");
    }

    #[test]
    fn empty_dataset_has_no_rows() {
        let ds = Dataset::prepare(None, &DashboardState::default());
        assert!(compute_brand_breakdown(&ds).is_empty());
        assert!(compute_brand_cooccurrence(&ds).is_empty());
    }
}

//! Overview variant for public-figure searches.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::brand_metrics::collect_brand_stats;
use crate::dataset::Dataset;
use crate::stats::{mean, percent, round1, score_1_to_10, std_dev};

/// Agreement score when no provider has a sentiment reading.
pub const NEUTRAL_AGREEMENT: u8 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentSplit {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prominence {
    pub figure_rate: f64,
    pub competitor_mean_rate: Option<f64>,
    pub top_competitor: Option<String>,
    pub top_competitor_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicFigureMetrics {
    pub figure: String,
    pub total_results: usize,
    /// -100 (uniformly negative) to +100 (uniformly positive); `None` when no
    /// answer carried a sentiment.
    pub portrayal_score: Option<f64>,
    pub sentiment_split: SentimentSplit,
    pub prominence: Prominence,
    pub provider_sentiment: BTreeMap<String, f64>,
    /// 1..=10; higher when providers portray the figure alike.
    pub platform_agreement: u8,
}

#[must_use]
pub fn compute_public_figure_metrics(ds: &Dataset) -> PublicFigureMetrics {
    let results = ds.filtered();

    let mut scores = Vec::new();
    let mut by_provider: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for result in &results {
        let Some(sentiment) = result.brand_sentiment.filter(|s| s.is_mentioned()) else {
            continue;
        };
        let score = f64::from(sentiment.score());
        scores.push(sentiment.score());
        by_provider
            .entry(result.provider.clone())
            .or_default()
            .push(score);
    }

    let portrayal_score = mean(
        &scores
            .iter()
            .map(|&s| (f64::from(s) - 3.0) * 50.0)
            .collect::<Vec<_>>(),
    )
    .map(round1);

    let positive = scores.iter().filter(|&&s| s >= 4).count();
    let neutral = scores.iter().filter(|&&s| s == 3).count();
    let negative = scores.iter().filter(|&&s| s <= 2).count();
    let sentiment_split = SentimentSplit {
        positive: round1(percent(positive, scores.len())),
        neutral: round1(percent(neutral, scores.len())),
        negative: round1(percent(negative, scores.len())),
    };

    let provider_sentiment: BTreeMap<String, f64> = by_provider
        .iter()
        .filter_map(|(p, s)| Some((p.clone(), mean(s)?)))
        .collect();

    PublicFigureMetrics {
        figure: ds.subject.clone(),
        total_results: results.len(),
        portrayal_score,
        sentiment_split,
        prominence: prominence(ds),
        platform_agreement: platform_agreement(&provider_sentiment),
        provider_sentiment: provider_sentiment
            .into_iter()
            .map(|(p, s)| (p, round1(s)))
            .collect(),
    }
}

fn prominence(ds: &Dataset) -> Prominence {
    let results = ds.filtered();
    let stats = collect_brand_stats(&results, &ds.brands, ds.subject_brand());

    let figure_rate = stats
        .iter()
        .find(|s| ds.is_subject(&s.brand))
        .map_or(0.0, |s| s.overall.mention_rate());

    let competitors: Vec<(&str, f64)> = stats
        .iter()
        .filter(|s| !ds.is_subject(&s.brand))
        .map(|s| (s.brand.as_str(), s.overall.mention_rate()))
        .collect();
    let rates: Vec<f64> = competitors.iter().map(|(_, r)| *r).collect();
    let top = competitors
        .iter()
        .fold(None, |best: Option<(&str, f64)>, &(name, rate)| match best {
            Some((_, br)) if br >= rate => best,
            _ => Some((name, rate)),
        });

    Prominence {
        figure_rate: round1(figure_rate),
        competitor_mean_rate: mean(&rates).map(round1),
        top_competitor: top.map(|(name, _)| name.to_string()),
        top_competitor_rate: top.map(|(_, rate)| round1(rate)),
    }
}

/// `round(10 - 9·σ/2)` of per-provider mean sentiment. σ is at most 2 on the
/// 1..5 scale, so complete disagreement maps to 1.
fn platform_agreement(provider_sentiment: &BTreeMap<String, f64>) -> u8 {
    let means: Vec<f64> = provider_sentiment.values().copied().collect();
    match std_dev(&means) {
        Some(sigma) => score_1_to_10(10.0 - 9.0 * sigma / 2.0),
        None => NEUTRAL_AGREEMENT,
    }
}

#[cfg(test)]
mod tests {
    use aivis_core::{DashboardState, RunResult, RunStatusResponse, SearchType, Sentiment};

    use super::*;

    fn result(provider: &str, sentiment: Sentiment, others: &[&str]) -> RunResult {
        RunResult {
            provider: provider.to_string(),
            prompt: "who is the best senator".to_string(),
            response_text: Some(format!("Jane Doe, {}", others.join(", "))),
            brand_mentioned: Some(sentiment.is_mentioned()),
            brand_sentiment: Some(sentiment),
            competitors_mentioned: others.iter().map(|b| (*b).to_string()).collect(),
            ..RunResult::default()
        }
    }

    fn dataset(results: Vec<RunResult>) -> Dataset {
        let run = RunStatusResponse {
            brand: "Jane Doe".to_string(),
            search_type: SearchType::PublicFigure,
            results,
            ..RunStatusResponse::default()
        };
        Dataset::from_run(&run, &DashboardState::default())
    }

    #[test]
    fn portrayal_and_split() {
        let ds = dataset(vec![
            result("openai", Sentiment::StrongEndorsement, &[]),
            result("openai", Sentiment::NeutralMention, &[]),
            result("gemini", Sentiment::NegativeComparison, &[]),
            result("gemini", Sentiment::PositiveEndorsement, &[]),
        ]);
        let m = compute_public_figure_metrics(&ds);
        // Mean of (2, 0, -2, 1) * 50 = 12.5.
        assert_eq!(m.portrayal_score, Some(12.5));
        assert!((m.sentiment_split.positive - 50.0).abs() < 1e-9);
        assert!((m.sentiment_split.neutral - 25.0).abs() < 1e-9);
        assert!((m.sentiment_split.negative - 25.0).abs() < 1e-9);
    }

    #[test]
    fn identical_providers_agree_fully() {
        let ds = dataset(vec![
            result("openai", Sentiment::PositiveEndorsement, &[]),
            result("gemini", Sentiment::PositiveEndorsement, &[]),
        ]);
        assert_eq!(compute_public_figure_metrics(&ds).platform_agreement, 10);
    }

    #[test]
    fn opposite_providers_disagree() {
        let ds = dataset(vec![
            result("openai", Sentiment::StrongEndorsement, &[]),
            result("gemini", Sentiment::NegativeComparison, &[]),
        ]);
        // σ = 2 → 10 - 9 = 1.
        assert_eq!(compute_public_figure_metrics(&ds).platform_agreement, 1);
    }

    #[test]
    fn no_sentiment_is_neutral() {
        let ds = dataset(vec![result("openai", Sentiment::NotMentioned, &["John Roe"])]);
        let m = compute_public_figure_metrics(&ds);
        assert_eq!(m.portrayal_score, None);
        assert_eq!(m.platform_agreement, NEUTRAL_AGREEMENT);
    }

    #[test]
    fn prominence_compares_against_competitors() {
        let ds = dataset(vec![
            result("openai", Sentiment::NeutralMention, &["John Roe"]),
            result("openai", Sentiment::NotMentioned, &["John Roe", "Ann Poe"]),
        ]);
        let p = compute_public_figure_metrics(&ds).prominence;
        assert!((p.figure_rate - 100.0).abs() < 1e-9);
        assert_eq!(p.top_competitor.as_deref(), Some("John Roe"));
        assert_eq!(p.top_competitor_rate, Some(100.0));
        assert_eq!(p.competitor_mean_rate, Some(75.0));
    }
}

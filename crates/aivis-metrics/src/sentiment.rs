//! Sentiment tab.

use std::collections::BTreeMap;

use aivis_core::{RunResult, Sentiment};
use serde::Serialize;

use crate::brand_metrics::sentiment_for;
use crate::dataset::Dataset;
use crate::filters::{provider_label, result_mentions};
use crate::stats::{percent, round1};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentCount {
    pub sentiment: Sentiment,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentDistribution {
    pub brand: String,
    pub total: usize,
    pub counts: Vec<SentimentCount>,
    /// Mean ordinal score, `not_mentioned` ignored.
    pub avg_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSentiment {
    pub provider: String,
    pub label: String,
    pub distribution: SentimentDistribution,
}

/// Label counts per non-excluded brand over the responses that mention it.
#[must_use]
pub fn compute_sentiment_distribution(ds: &Dataset) -> Vec<SentimentDistribution> {
    let results = ds.filtered();
    ds.brands
        .iter()
        .map(|brand| distribution(&results, brand, ds.subject_brand()))
        .filter(|d| d.total > 0)
        .collect()
}

/// Per-provider label counts for the selected brand, in provider order.
#[must_use]
pub fn compute_provider_sentiment(ds: &Dataset) -> Vec<ProviderSentiment> {
    if ds.selected_brand.is_empty() {
        return Vec::new();
    }
    let results = ds.filtered();
    ds.providers
        .iter()
        .filter_map(|provider| {
            let scoped: Vec<&RunResult> = results
                .iter()
                .copied()
                .filter(|r| &r.provider == provider)
                .collect();
            let distribution = distribution(&scoped, &ds.selected_brand, ds.subject_brand());
            (distribution.total > 0).then(|| ProviderSentiment {
                provider: provider.clone(),
                label: provider_label(provider),
                distribution,
            })
        })
        .collect()
}

fn distribution(results: &[&RunResult], brand: &str, subject: &str) -> SentimentDistribution {
    let mut counts: BTreeMap<Sentiment, usize> = BTreeMap::new();
    for result in results {
        if !result_mentions(result, brand, subject) {
            continue;
        }
        let sentiment = sentiment_for(result, brand, subject).unwrap_or_default();
        *counts.entry(sentiment).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    let (score_sum, scored) = counts
        .iter()
        .filter(|(s, _)| s.is_mentioned())
        .fold((0usize, 0usize), |(sum, n), (s, &c)| {
            (sum + usize::from(s.score()) * c, n + c)
        });

    #[allow(clippy::cast_precision_loss)]
    let avg_score = (scored > 0).then(|| round1(score_sum as f64 / scored as f64));

    SentimentDistribution {
        brand: brand.to_string(),
        total,
        counts: Sentiment::ALL
            .iter()
            .map(|&sentiment| {
                let count = counts.get(&sentiment).copied().unwrap_or(0);
                SentimentCount {
                    sentiment,
                    count,
                    percentage: round1(percent(count, total)),
                }
            })
            .collect(),
        avg_score,
    }
}

//! Sources tab: cited domains, their influence, and where competitors are
//! cited more often or more favorably than the selected brand.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use aivis_core::{RunResult, Sentiment, Source};
use serde::Serialize;

use crate::brand_metrics::sentiment_for;
use crate::dataset::Dataset;
use crate::filters::{result_mentions, sort_providers};
use crate::stats::{mean, percent, ratio, round1};
use crate::text::{domain_from_url, eq_ignore_case};

/// Domains need at least this many citations to be judged for gaps.
pub const MIN_GAP_CITATIONS: usize = 2;

/// Provider count at which the diversity component of the importance score
/// saturates.
const DIVERSITY_SATURATION: f64 = 4.0;

/// Largest sentiment delta reported, in ordinal steps.
const MAX_SENTIMENT_DELTA: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDomain {
    pub domain: String,
    pub citations: usize,
    pub providers: Vec<String>,
    /// Percentage of citing responses that mention the selected brand.
    pub brand_mention_rate: f64,
    pub avg_sentiment: Option<f64>,
    /// 0..=100 blend of citation volume, provider diversity, and brand rate.
    pub importance: f64,
    pub sample_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub domain: String,
    pub total: usize,
    /// Citation counts aligned with [`DomainHeatmap::providers`].
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainHeatmap {
    pub providers: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceGap {
    pub domain: String,
    pub citations: usize,
    pub brand_rate: f64,
    pub top_competitor: String,
    pub competitor_rate: f64,
    /// Competitor rate minus brand rate, in percentage points. Always positive.
    pub gap: f64,
    pub opportunity_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GapMagnitude {
    Slight,
    Moderate,
    Strong,
}

impl GapMagnitude {
    #[must_use]
    pub fn from_delta(delta: f64) -> Self {
        let d = delta.abs();
        if d < 1.0 {
            GapMagnitude::Slight
        } else if d < 2.0 {
            GapMagnitude::Moderate
        } else {
            GapMagnitude::Strong
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSentimentGap {
    pub domain: String,
    pub brand_sentiment: f64,
    pub top_competitor: String,
    pub competitor_sentiment: f64,
    /// Brand average minus the best competitor average, clamped to ±3.
    pub delta: f64,
    pub magnitude: GapMagnitude,
}

/// One cited URL within one response. Repeats of a URL in the same response
/// are dropped.
struct Citation<'a> {
    response: usize,
    result: &'a RunResult,
    source: &'a Source,
}

fn group_citations<'a>(results: &[&'a RunResult]) -> BTreeMap<String, Vec<Citation<'a>>> {
    let mut by_domain: BTreeMap<String, Vec<Citation<'a>>> = BTreeMap::new();
    for (response, &result) in results.iter().enumerate() {
        let mut seen = HashSet::new();
        for source in &result.sources {
            let url = source.url.trim();
            if !seen.insert(url) {
                continue;
            }
            if let Some(domain) = domain_from_url(url) {
                by_domain.entry(domain).or_default().push(Citation {
                    response,
                    result,
                    source,
                });
            }
        }
    }
    by_domain
}

/// Percentage of the distinct responses in `citations` that mention `brand`.
fn mention_rate(citations: &[Citation<'_>], brand: &str, subject: &str) -> f64 {
    let mut responses = HashSet::new();
    let mut mentioning = HashSet::new();
    for c in citations {
        responses.insert(c.response);
        if result_mentions(c.result, brand, subject) {
            mentioning.insert(c.response);
        }
    }
    percent(mentioning.len(), responses.len())
}

/// Sentiment toward `brand` attached to one citation: the source's own
/// reading when present, else the response-level one for mentioned brands.
fn citation_sentiment(c: &Citation<'_>, brand: &str, subject: &str) -> Option<Sentiment> {
    let per_source = c
        .source
        .brand_sentiments
        .iter()
        .find(|(name, _)| eq_ignore_case(name, brand))
        .map(|(_, &s)| s)
        .filter(|s| s.is_mentioned());
    per_source.or_else(|| {
        result_mentions(c.result, brand, subject)
            .then(|| sentiment_for(c.result, brand, subject))
            .flatten()
            .filter(|s| s.is_mentioned())
    })
}

fn avg_sentiment(citations: &[Citation<'_>], brand: &str, subject: &str) -> Option<f64> {
    if brand.is_empty() {
        return None;
    }
    let scores: Vec<f64> = citations
        .iter()
        .filter_map(|c| citation_sentiment(c, brand, subject))
        .map(|s| f64::from(s.score()))
        .collect();
    mean(&scores)
}

/// Every cited domain, most cited first.
#[must_use]
pub fn compute_source_domains(ds: &Dataset) -> Vec<SourceDomain> {
    let results = ds.filtered();
    let subject = ds.subject_brand();
    let brand = ds.selected_brand.as_str();
    let grouped = group_citations(&results);
    let max_citations = grouped.values().map(Vec::len).max().unwrap_or(0);

    let mut domains: Vec<SourceDomain> = grouped
        .into_iter()
        .map(|(domain, citations)| {
            let providers: BTreeSet<&str> =
                citations.iter().map(|c| c.result.provider.as_str()).collect();
            let brand_mention_rate = if brand.is_empty() {
                0.0
            } else {
                mention_rate(&citations, brand, subject)
            };
            #[allow(clippy::cast_precision_loss)]
            let diversity = (providers.len() as f64 / DIVERSITY_SATURATION).min(1.0);
            let importance = 40.0 * ratio(citations.len(), max_citations)
                + 30.0 * diversity
                + 30.0 * brand_mention_rate / 100.0;

            SourceDomain {
                citations: citations.len(),
                providers: sort_providers(providers),
                brand_mention_rate: round1(brand_mention_rate),
                avg_sentiment: avg_sentiment(&citations, brand, subject).map(round1),
                importance: round1(importance),
                sample_title: citations
                    .iter()
                    .find_map(|c| c.source.title.clone().filter(|t| !t.trim().is_empty())),
                domain,
            }
        })
        .collect();

    domains.sort_by(|a, b| {
        b.citations
            .cmp(&a.citations)
            .then_with(|| a.domain.cmp(&b.domain))
    });
    domains
}

/// Citation counts for the `top_n` most cited domains across providers.
#[must_use]
pub fn compute_domain_heatmap(ds: &Dataset, top_n: usize) -> DomainHeatmap {
    let results = ds.filtered();
    let grouped = group_citations(&results);

    let mut rows: Vec<HeatmapRow> = grouped
        .into_iter()
        .map(|(domain, citations)| {
            let counts = ds
                .providers
                .iter()
                .map(|p| citations.iter().filter(|c| &c.result.provider == p).count())
                .collect();
            HeatmapRow {
                total: citations.len(),
                counts,
                domain,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.domain.cmp(&b.domain)));
    rows.truncate(top_n);

    DomainHeatmap {
        providers: ds.providers.clone(),
        rows,
    }
}

/// Domains where a competitor shows up alongside the citation more often
/// than the selected brand, best opportunity first.
#[must_use]
pub fn compute_source_gap_analysis(ds: &Dataset) -> Vec<SourceGap> {
    let brand = ds.selected_brand.as_str();
    if brand.is_empty() {
        return Vec::new();
    }
    let results = ds.filtered();
    let subject = ds.subject_brand();
    let competitors: Vec<&String> = ds.brands.iter().filter(|b| b.as_str() != brand).collect();

    let mut gaps: Vec<SourceGap> = group_citations(&results)
        .into_iter()
        .filter(|(_, citations)| citations.len() >= MIN_GAP_CITATIONS)
        .filter_map(|(domain, citations)| {
            let brand_rate = mention_rate(&citations, brand, subject);
            let (top_competitor, competitor_rate) = competitors
                .iter()
                .map(|c| (*c, mention_rate(&citations, c, subject)))
                .fold(None, |best: Option<(&String, f64)>, (c, rate)| match best {
                    Some((_, br)) if br >= rate => best,
                    _ => Some((c, rate)),
                })?;
            let gap = competitor_rate - brand_rate;
            if gap <= 0.0 {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let opportunity = (gap / 100.0) * ((citations.len() + 1) as f64).log10() * 100.0;
            Some(SourceGap {
                domain,
                citations: citations.len(),
                brand_rate: round1(brand_rate),
                top_competitor: top_competitor.clone(),
                competitor_rate: round1(competitor_rate),
                gap: round1(gap),
                opportunity_score: round1(opportunity),
            })
        })
        .collect();

    gaps.sort_by(|a, b| {
        b.opportunity_score
            .partial_cmp(&a.opportunity_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.domain.cmp(&b.domain))
    });
    gaps
}

/// Per domain, how the selected brand's average sentiment compares with the
/// most favorably treated competitor. Largest deltas first.
#[must_use]
pub fn compute_source_sentiment_gap(ds: &Dataset) -> Vec<SourceSentimentGap> {
    let brand = ds.selected_brand.as_str();
    if brand.is_empty() {
        return Vec::new();
    }
    let results = ds.filtered();
    let subject = ds.subject_brand();

    let mut gaps: Vec<SourceSentimentGap> = group_citations(&results)
        .into_iter()
        .filter_map(|(domain, citations)| {
            let own = avg_sentiment(&citations, brand, subject)?;
            let (top_competitor, best) = ds
                .brands
                .iter()
                .filter(|b| b.as_str() != brand)
                .filter_map(|c| Some((c, avg_sentiment(&citations, c, subject)?)))
                .fold(None, |best: Option<(&String, f64)>, (c, avg)| match best {
                    Some((_, b)) if b >= avg => best,
                    _ => Some((c, avg)),
                })?;
            let delta = (own - best).clamp(-MAX_SENTIMENT_DELTA, MAX_SENTIMENT_DELTA);
            Some(SourceSentimentGap {
                domain,
                brand_sentiment: round1(own),
                top_competitor: top_competitor.clone(),
                competitor_sentiment: round1(best),
                delta: round1(delta),
                magnitude: GapMagnitude::from_delta(delta),
            })
        })
        .collect();

    gaps.sort_by(|a, b| {
        b.delta
            .abs()
            .total_cmp(&a.delta.abs())
            .then_with(|| a.domain.cmp(&b.domain))
    });
    gaps
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;

//! Overview variant for issue searches.
//!
//! An issue run's `brand_sentiment` describes how each answer frames the
//! issue, and its mention lists hold related issues rather than competitors.

use std::collections::{BTreeMap, HashMap, HashSet};

use aivis_core::Sentiment;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::stats::{percent, round1, score_1_to_10};

/// Consensus score when no provider has a framing.
pub const NEUTRAL_CONSENSUS: u8 = 5;

/// Five-bucket relabeling of [`Sentiment`] for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    Supportive,
    Favorable,
    Balanced,
    Cautious,
    Critical,
}

impl Framing {
    pub const ALL: [Framing; 5] = [
        Framing::Supportive,
        Framing::Favorable,
        Framing::Balanced,
        Framing::Cautious,
        Framing::Critical,
    ];

    /// `None` for `not_mentioned`.
    #[must_use]
    pub fn from_sentiment(sentiment: Sentiment) -> Option<Self> {
        match sentiment {
            Sentiment::StrongEndorsement => Some(Framing::Supportive),
            Sentiment::PositiveEndorsement => Some(Framing::Favorable),
            Sentiment::NeutralMention => Some(Framing::Balanced),
            Sentiment::Conditional => Some(Framing::Cautious),
            Sentiment::NegativeComparison => Some(Framing::Critical),
            Sentiment::NotMentioned => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Framing::Supportive => "Supportive",
            Framing::Favorable => "Favorable",
            Framing::Balanced => "Balanced",
            Framing::Cautious => "Cautious",
            Framing::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramingShare {
    pub framing: Framing,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedIssue {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueMetrics {
    pub issue: String,
    pub total_results: usize,
    pub framed_results: usize,
    pub framing_distribution: Vec<FramingShare>,
    pub dominant_framing: Option<Framing>,
    /// 1..=10; how many providers share the overall dominant framing.
    pub platform_consensus: u8,
    pub provider_framings: BTreeMap<String, Framing>,
    pub related_issues: Vec<RelatedIssue>,
}

#[must_use]
pub fn compute_issue_metrics(ds: &Dataset) -> IssueMetrics {
    let results = ds.filtered();

    let mut overall: HashMap<Framing, usize> = HashMap::new();
    let mut by_provider: BTreeMap<String, HashMap<Framing, usize>> = BTreeMap::new();
    for result in &results {
        let Some(framing) = result.brand_sentiment.and_then(Framing::from_sentiment) else {
            continue;
        };
        *overall.entry(framing).or_default() += 1;
        *by_provider
            .entry(result.provider.clone())
            .or_default()
            .entry(framing)
            .or_default() += 1;
    }

    let framed: usize = overall.values().sum();
    let framing_distribution = Framing::ALL
        .iter()
        .map(|&framing| {
            let count = overall.get(&framing).copied().unwrap_or(0);
            FramingShare {
                framing,
                count,
                percentage: round1(percent(count, framed)),
            }
        })
        .collect();

    let dominant_framing = dominant(&overall);
    let provider_framings: BTreeMap<String, Framing> = by_provider
        .iter()
        .filter_map(|(provider, counts)| Some((provider.clone(), dominant(counts)?)))
        .collect();

    IssueMetrics {
        issue: ds.subject.clone(),
        total_results: results.len(),
        framed_results: framed,
        framing_distribution,
        dominant_framing,
        platform_consensus: platform_consensus(&provider_framings, dominant_framing),
        provider_framings,
        related_issues: related_issues(ds),
    }
}

/// Most frequent framing; ties go to the more supportive bucket.
fn dominant(counts: &HashMap<Framing, usize>) -> Option<Framing> {
    Framing::ALL
        .iter()
        .filter_map(|f| counts.get(f).filter(|&&c| c > 0).map(|&c| (*f, c)))
        .fold(None, |best: Option<(Framing, usize)>, (f, c)| match best {
            Some((_, bc)) if bc >= c => best,
            _ => Some((f, c)),
        })
        .map(|(f, _)| f)
}

#[allow(clippy::cast_precision_loss)]
fn platform_consensus(
    provider_framings: &BTreeMap<String, Framing>,
    dominant: Option<Framing>,
) -> u8 {
    let Some(dominant) = dominant else {
        return NEUTRAL_CONSENSUS;
    };
    if provider_framings.is_empty() {
        return NEUTRAL_CONSENSUS;
    }
    let agreeing = provider_framings.values().filter(|&&f| f == dominant).count();
    score_1_to_10(1.0 + 9.0 * agreeing as f64 / provider_framings.len() as f64)
}

/// Other issues raised alongside the subject, most frequent first.
fn related_issues(ds: &Dataset) -> Vec<RelatedIssue> {
    let results = ds.filtered();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for result in &results {
        let mut seen = HashSet::new();
        for name in result.mention_list() {
            if name.trim().is_empty() || ds.is_subject(name) || ds.excluded.contains(name) {
                continue;
            }
            if seen.insert(name.to_lowercase()) {
                *counts.entry(name.clone()).or_default() += 1;
            }
        }
    }

    let mut related: Vec<RelatedIssue> = counts
        .into_iter()
        .map(|(name, count)| RelatedIssue {
            percentage: round1(percent(count, results.len())),
            name,
            count,
        })
        .collect();
    // BTreeMap iteration already gives alphabetical order for ties.
    related.sort_by(|a, b| b.count.cmp(&a.count));
    related
}

#[cfg(test)]
mod tests {
    use aivis_core::{DashboardState, RunResult, RunStatusResponse, SearchType};

    use super::*;

    fn result(provider: &str, sentiment: Sentiment, related: &[&str]) -> RunResult {
        RunResult {
            provider: provider.to_string(),
            prompt: "is remote work good".to_string(),
            response_text: Some("text".to_string()),
            brand_mentioned: Some(true),
            brand_sentiment: Some(sentiment),
            competitors_mentioned: related.iter().map(|b| (*b).to_string()).collect(),
            ..RunResult::default()
        }
    }

    fn dataset(results: Vec<RunResult>) -> Dataset {
        let run = RunStatusResponse {
            brand: "Remote work".to_string(),
            search_type: SearchType::Issue,
            results,
            ..RunStatusResponse::default()
        };
        Dataset::from_run(&run, &DashboardState::default())
    }

    #[test]
    fn framing_buckets_follow_sentiment_scale() {
        assert_eq!(
            Framing::from_sentiment(Sentiment::StrongEndorsement),
            Some(Framing::Supportive)
        );
        assert_eq!(
            Framing::from_sentiment(Sentiment::NegativeComparison),
            Some(Framing::Critical)
        );
        assert_eq!(Framing::from_sentiment(Sentiment::NotMentioned), None);
    }

    #[test]
    fn distribution_dominant_and_consensus() {
        let ds = dataset(vec![
            result("openai", Sentiment::NeutralMention, &[]),
            result("openai", Sentiment::NeutralMention, &[]),
            result("gemini", Sentiment::NeutralMention, &[]),
            result("anthropic", Sentiment::Conditional, &[]),
            result("anthropic", Sentiment::NotMentioned, &[]),
        ]);
        let m = compute_issue_metrics(&ds);
        assert_eq!(m.framed_results, 4);
        assert_eq!(m.dominant_framing, Some(Framing::Balanced));
        let balanced = &m.framing_distribution[2];
        assert_eq!(balanced.count, 3);
        assert!((balanced.percentage - 75.0).abs() < 1e-9);
        // 2 of 3 providers agree: round(1 + 9 * 2/3) = 7.
        assert_eq!(m.platform_consensus, 7);
    }

    #[test]
    fn no_framings_gives_neutral_consensus() {
        let ds = dataset(vec![result("openai", Sentiment::NotMentioned, &[])]);
        let m = compute_issue_metrics(&ds);
        assert_eq!(m.dominant_framing, None);
        assert_eq!(m.platform_consensus, NEUTRAL_CONSENSUS);
    }

    #[test]
    fn related_issues_rank_by_frequency_then_name() {
        let ds = dataset(vec![
            result("openai", Sentiment::NeutralMention, &["Housing", "Commuting"]),
            result("gemini", Sentiment::NeutralMention, &["Commuting", "Burnout"]),
            result("anthropic", Sentiment::NeutralMention, &["Burnout"]),
        ]);
        let names: Vec<String> = compute_issue_metrics(&ds)
            .related_issues
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Burnout", "Commuting", "Housing"]);
    }
}

//! Recommendations tab: prioritized actions derived from the other tabs.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::overview::compute_overview_metrics;
use crate::sources::{compute_source_gap_analysis, compute_source_sentiment_gap, GapMagnitude};

/// Visibility below this is a high-priority problem.
const CRITICAL_VISIBILITY: f64 = 30.0;
/// Visibility below this is worth improving.
const WEAK_VISIBILITY: f64 = 60.0;
/// #1 rates below this suggest the brand is listed but rarely recommended.
const LOW_TOP1_RATE: f64 = 20.0;
/// Source-gap opportunities listed.
const MAX_SOURCE_OPPORTUNITIES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Visibility,
    Provider,
    SourceGap,
    Sentiment,
    Positioning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub kind: RecommendationKind,
    pub title: String,
    pub detail: String,
}

/// Actions for the selected brand, highest priority first.
#[must_use]
pub fn generate_recommendations(ds: &Dataset) -> Vec<Recommendation> {
    if ds.is_empty() || ds.selected_brand.is_empty() {
        return Vec::new();
    }
    let brand = ds.selected_brand.as_str();
    let overview = compute_overview_metrics(ds);
    let mut recs = Vec::new();

    if overview.overall_visibility < WEAK_VISIBILITY {
        let priority = if overview.overall_visibility < CRITICAL_VISIBILITY {
            Priority::High
        } else {
            Priority::Medium
        };
        recs.push(Recommendation {
            priority,
            kind: RecommendationKind::Visibility,
            title: format!("Raise {brand}'s overall AI visibility"),
            detail: format!(
                "{brand} appears in {:.1}% of AI answers ({} of {}). Publish content that answers the prompts where it is missing.",
                overview.overall_visibility, overview.mentioned_results, overview.total_results
            ),
        });
    }

    for provider in overview.providers.iter().filter(|p| p.total > 0 && p.mentioned == 0) {
        recs.push(Recommendation {
            priority: Priority::High,
            kind: RecommendationKind::Provider,
            title: format!("{brand} is invisible on {}", provider.label),
            detail: format!(
                "None of {} {} responses mention {brand}.",
                provider.total, provider.label
            ),
        });
    }

    for gap in compute_source_gap_analysis(ds)
        .into_iter()
        .take(MAX_SOURCE_OPPORTUNITIES)
    {
        recs.push(Recommendation {
            priority: Priority::Medium,
            kind: RecommendationKind::SourceGap,
            title: format!("Earn coverage on {}", gap.domain),
            detail: format!(
                "Answers citing {} mention {} {:.1}% of the time versus {:.1}% for {brand}.",
                gap.domain, gap.top_competitor, gap.competitor_rate, gap.brand_rate
            ),
        });
    }

    for gap in compute_source_sentiment_gap(ds)
        .into_iter()
        .filter(|g| g.magnitude == GapMagnitude::Strong && g.delta < 0.0)
    {
        recs.push(Recommendation {
            priority: Priority::High,
            kind: RecommendationKind::Sentiment,
            title: format!("Improve how {} portrays {brand}", gap.domain),
            detail: format!(
                "Sentiment toward {brand} averages {:.1} there, against {:.1} for {}.",
                gap.brand_sentiment, gap.competitor_sentiment, gap.top_competitor
            ),
        });
    }

    if overview.mentioned_results > 0 && overview.top1_rate < LOW_TOP1_RATE {
        recs.push(Recommendation {
            priority: Priority::Low,
            kind: RecommendationKind::Positioning,
            title: format!("Make {brand} the first recommendation"),
            detail: format!(
                "{brand} is named first in only {:.1}% of answers. Sharpen comparison content so it leads lists.",
                overview.top1_rate
            ),
        });
    }

    recs.sort_by_key(|r| r.priority);
    tracing::debug!(brand, count = recs.len(), "generated recommendations");
    recs
}

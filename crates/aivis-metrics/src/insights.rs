//! Templated observations shown above the competitive table.

use serde::Serialize;

use crate::competitive::{BrandBreakdownRow, BrandPair};
use crate::dataset::Dataset;
use crate::filters::provider_label;
use crate::stats::mean;

/// At most this many insights are returned.
pub const MAX_INSIGHTS: usize = 5;

/// Minimum best-to-worst provider spread, in percentage points, worth calling
/// out.
const PROVIDER_GAP_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    RankPosition,
    Sentiment,
    FirstPosition,
    ProviderSpread,
    CoOccurrence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
}

/// Observations about the selected brand. Each is skipped when it has
/// nothing to say.
#[must_use]
pub fn generate_competitive_insights(
    ds: &Dataset,
    breakdown: &[BrandBreakdownRow],
    pairs: &[BrandPair],
) -> Vec<Insight> {
    let brand = ds.selected_brand.as_str();
    let Some((position, row)) = breakdown
        .iter()
        .enumerate()
        .find(|(_, r)| r.brand == brand)
    else {
        return Vec::new();
    };

    [
        rank_position(breakdown, position, row),
        sentiment_comparison(breakdown, row),
        first_position_leader(breakdown, row),
        provider_spread(row),
        top_partner(pairs, brand),
    ]
    .into_iter()
    .flatten()
    .take(MAX_INSIGHTS)
    .collect()
}

fn rank_position(
    breakdown: &[BrandBreakdownRow],
    position: usize,
    row: &BrandBreakdownRow,
) -> Option<Insight> {
    if breakdown.len() < 2 {
        return None;
    }
    let text = if position == 0 {
        format!(
            "{} leads all {} brands in AI visibility at {:.1}%.",
            row.brand,
            breakdown.len(),
            row.visibility
        )
    } else {
        let leader = &breakdown[0];
        format!(
            "{} ranks #{} of {} brands in AI visibility ({:.1}%), behind {} ({:.1}%).",
            row.brand,
            position + 1,
            breakdown.len(),
            row.visibility,
            leader.brand,
            leader.visibility
        )
    };
    Some(Insight {
        kind: InsightKind::RankPosition,
        text,
    })
}

fn sentiment_comparison(breakdown: &[BrandBreakdownRow], row: &BrandBreakdownRow) -> Option<Insight> {
    let own = row.avg_sentiment?;
    let others: Vec<f64> = breakdown
        .iter()
        .filter(|r| r.brand != row.brand)
        .filter_map(|r| r.avg_sentiment)
        .collect();
    let competitors = mean(&others)?;
    let diff = own - competitors;
    let text = if diff.abs() < 0.1 {
        format!(
            "{} is described about as favorably as competitors ({own:.1} vs {competitors:.1}).",
            row.brand
        )
    } else if diff > 0.0 {
        format!(
            "{} is described more favorably than competitors ({own:.1} vs {competitors:.1} average sentiment).",
            row.brand
        )
    } else {
        format!(
            "{} is described less favorably than competitors ({own:.1} vs {competitors:.1} average sentiment).",
            row.brand
        )
    };
    Some(Insight {
        kind: InsightKind::Sentiment,
        text,
    })
}

fn first_position_leader(breakdown: &[BrandBreakdownRow], row: &BrandBreakdownRow) -> Option<Insight> {
    let leader = breakdown
        .iter()
        .filter(|r| r.first_position_rate > 0.0)
        .fold(None, |best: Option<&BrandBreakdownRow>, r| match best {
            Some(b) if b.first_position_rate >= r.first_position_rate => best,
            _ => Some(r),
        })?;
    let text = if leader.brand == row.brand {
        format!(
            "{} is named first more often than any other brand ({:.1}% of responses).",
            row.brand, row.first_position_rate
        )
    } else {
        format!(
            "{} is named first most often ({:.1}% of responses), compared with {:.1}% for {}.",
            leader.brand, leader.first_position_rate, row.first_position_rate, row.brand
        )
    };
    Some(Insight {
        kind: InsightKind::FirstPosition,
        text,
    })
}

fn provider_spread(row: &BrandBreakdownRow) -> Option<Insight> {
    let best = row
        .provider_rates
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    let worst = row
        .provider_rates
        .iter()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    if best.1 - worst.1 <= PROVIDER_GAP_THRESHOLD {
        return None;
    }
    Some(Insight {
        kind: InsightKind::ProviderSpread,
        text: format!(
            "{} performs best on {} ({:.1}%) and worst on {} ({:.1}%).",
            row.brand,
            provider_label(best.0),
            best.1,
            provider_label(worst.0),
            worst.1
        ),
    })
}

fn top_partner(pairs: &[BrandPair], brand: &str) -> Option<Insight> {
    // Pairs arrive sorted by count, so the first match is the top partner.
    let pair = pairs
        .iter()
        .find(|p| p.brand_a == brand || p.brand_b == brand)?;
    let partner = if pair.brand_a == brand {
        &pair.brand_b
    } else {
        &pair.brand_a
    };
    let noun = if pair.count == 1 { "response" } else { "responses" };
    Some(Insight {
        kind: InsightKind::CoOccurrence,
        text: format!(
            "{brand} is most often mentioned alongside {partner} ({} {noun}).",
            pair.count
        ),
    })
}

#[cfg(test)]
mod tests {
    use aivis_core::{DashboardState, RunResult, RunStatusResponse, Sentiment};

    use super::*;
    use crate::competitive::{compute_brand_breakdown, compute_brand_cooccurrence};

    fn result(provider: &str, text: &str, brands: &[&str]) -> RunResult {
        RunResult {
            provider: provider.to_string(),
            prompt: "best running shoes".to_string(),
            response_text: Some(text.to_string()),
            brand_mentioned: Some(text.contains("Nike")),
            competitors_mentioned: brands.iter().map(|b| (*b).to_string()).collect(),
            ..RunResult::default()
        }
    }

    fn insights(results: Vec<RunResult>) -> Vec<Insight> {
        let run = RunStatusResponse {
            brand: "Nike".to_string(),
            results,
            ..RunStatusResponse::default()
        };
        let ds = Dataset::from_run(&run, &DashboardState::default());
        let breakdown = compute_brand_breakdown(&ds);
        let pairs = compute_brand_cooccurrence(&ds);
        generate_competitive_insights(&ds, &breakdown, &pairs)
    }

    #[test]
    fn full_set_is_generated_in_order() {
        let mut a = result("openai", "Adidas then Nike", &["Adidas"]);
        a.brand_sentiment = Some(Sentiment::PositiveEndorsement);
        a.competitor_sentiments
            .insert("Adidas".to_string(), Sentiment::NeutralMention);
        let b = result("gemini", "Adidas only", &["Adidas"]);
        let out = insights(vec![a, b]);

        let kinds: Vec<InsightKind> = out.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                InsightKind::RankPosition,
                InsightKind::Sentiment,
                InsightKind::FirstPosition,
                InsightKind::ProviderSpread,
                InsightKind::CoOccurrence,
            ]
        );
        assert!(out[0].text.contains("ranks #2 of 2"));
        assert!(out[1].text.contains("more favorably"));
        assert!(out[3].text.contains("ChatGPT"));
        assert!(out[4].text.contains("alongside Adidas (1 response)"));
    }

    #[test]
    fn triggers_that_fail_are_skipped() {
        // Only the subject: no ranking, no sentiment, no spread, no partners.
        let out = insights(vec![result("openai", "Nike", &[])]);
        let kinds: Vec<InsightKind> = out.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![InsightKind::FirstPosition]);
    }

    #[test]
    fn missing_brand_yields_nothing() {
        let ds = Dataset::prepare(None, &DashboardState::default());
        assert!(generate_competitive_insights(&ds, &[], &[]).is_empty());
    }
}

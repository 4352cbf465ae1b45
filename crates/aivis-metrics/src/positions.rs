//! Rank spreads per brand and position buckets per provider.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::filters::provider_label;
use crate::ranking::ResultPositions;
use crate::stats::{percent, round1};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PositionBucket {
    #[serde(rename = "#1")]
    First,
    #[serde(rename = "#2-3")]
    TopThree,
    #[serde(rename = "#4-5")]
    TopFive,
    #[serde(rename = "#6+")]
    Lower,
    #[serde(rename = "not mentioned")]
    NotMentioned,
}

impl PositionBucket {
    pub const ALL: [PositionBucket; 5] = [
        PositionBucket::First,
        PositionBucket::TopThree,
        PositionBucket::TopFive,
        PositionBucket::Lower,
        PositionBucket::NotMentioned,
    ];

    #[must_use]
    pub fn from_rank(rank: u32) -> Self {
        match rank {
            0 => PositionBucket::NotMentioned,
            1 => PositionBucket::First,
            2 | 3 => PositionBucket::TopThree,
            4 | 5 => PositionBucket::TopFive,
            _ => PositionBucket::Lower,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PositionBucket::First => "#1",
            PositionBucket::TopThree => "#2-3",
            PositionBucket::TopFive => "#4-5",
            PositionBucket::Lower => "#6+",
            PositionBucket::NotMentioned => "not mentioned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankSample {
    pub provider: String,
    pub prompt: String,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRange {
    pub brand: String,
    pub min_rank: u32,
    pub max_rank: u32,
    pub avg_rank: f64,
    pub samples: Vec<RankSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub bucket: PositionBucket,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformPositions {
    pub provider: String,
    pub label: String,
    pub total: usize,
    pub buckets: Vec<BucketCount>,
}

/// Best, worst, and mean rank of every brand that was ranked at least once,
/// best average first.
#[must_use]
pub fn compute_rank_ranges(ds: &Dataset) -> Vec<RankRange> {
    let subject = ds.subject_brand();
    let mut samples: Vec<Vec<RankSample>> = vec![Vec::new(); ds.brands.len()];

    for result in ds.filtered() {
        let positions = ResultPositions::new(result, subject);
        for (i, brand) in ds.brands.iter().enumerate() {
            let rank = positions.rank_of(brand);
            if rank > 0 {
                samples[i].push(RankSample {
                    provider: result.provider.clone(),
                    prompt: result.prompt.clone(),
                    rank,
                });
            }
        }
    }

    let mut ranges: Vec<RankRange> = ds
        .brands
        .iter()
        .zip(samples)
        .filter_map(|(brand, samples)| {
            let min_rank = samples.iter().map(|s| s.rank).min()?;
            let max_rank = samples.iter().map(|s| s.rank).max()?;
            let sum: u32 = samples.iter().map(|s| s.rank).sum();
            #[allow(clippy::cast_precision_loss)]
            let avg_rank = round1(f64::from(sum) / samples.len() as f64);
            Some(RankRange {
                brand: brand.clone(),
                min_rank,
                max_rank,
                avg_rank,
                samples,
            })
        })
        .collect();

    ranges.sort_by(|a, b| a.avg_rank.total_cmp(&b.avg_rank));
    ranges
}

/// Bucketed positions of the selected brand on each provider.
#[must_use]
pub fn compute_position_by_platform(ds: &Dataset) -> Vec<PlatformPositions> {
    if ds.selected_brand.is_empty() {
        return Vec::new();
    }
    let subject = ds.subject_brand();
    let mut counts: BTreeMap<&str, BTreeMap<PositionBucket, usize>> = BTreeMap::new();

    for result in ds.filtered() {
        let rank = ResultPositions::new(result, subject).rank_of(&ds.selected_brand);
        *counts
            .entry(result.provider.as_str())
            .or_default()
            .entry(PositionBucket::from_rank(rank))
            .or_default() += 1;
    }

    ds.providers
        .iter()
        .filter_map(|provider| {
            let buckets = counts.get(provider.as_str())?;
            let total: usize = buckets.values().sum();
            Some(PlatformPositions {
                provider: provider.clone(),
                label: provider_label(provider),
                total,
                buckets: PositionBucket::ALL
                    .iter()
                    .map(|&bucket| {
                        let count = buckets.get(&bucket).copied().unwrap_or(0);
                        BucketCount {
                            bucket,
                            count,
                            percentage: round1(percent(count, total)),
                        }
                    })
                    .collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use aivis_core::{DashboardState, RunResult, RunStatusResponse};

    use super::*;

    fn result(provider: &str, text: &str, brands: &[&str]) -> RunResult {
        RunResult {
            provider: provider.to_string(),
            prompt: "best running shoes".to_string(),
            response_text: Some(text.to_string()),
            brand_mentioned: Some(text.contains("Nike")),
            all_brands_mentioned: Some(brands.iter().map(|b| (*b).to_string()).collect()),
            ..RunResult::default()
        }
    }

    fn dataset(results: Vec<RunResult>) -> Dataset {
        let run = RunStatusResponse {
            brand: "Nike".to_string(),
            results,
            ..RunStatusResponse::default()
        };
        Dataset::from_run(&run, &DashboardState::default())
    }

    #[test]
    fn buckets_from_rank() {
        assert_eq!(PositionBucket::from_rank(0), PositionBucket::NotMentioned);
        assert_eq!(PositionBucket::from_rank(1), PositionBucket::First);
        assert_eq!(PositionBucket::from_rank(3), PositionBucket::TopThree);
        assert_eq!(PositionBucket::from_rank(5), PositionBucket::TopFive);
        assert_eq!(PositionBucket::from_rank(9), PositionBucket::Lower);
        assert_eq!(PositionBucket::Lower.label(), "#6+");
    }

    #[test]
    fn rank_ranges_cover_min_max_and_mean() {
        let ds = dataset(vec![
            result("openai", "Nike, Adidas", &["Nike", "Adidas"]),
            result("gemini", "Adidas, Puma, Nike", &["Adidas", "Puma", "Nike"]),
        ]);
        let ranges = compute_rank_ranges(&ds);
        let nike = ranges.iter().find(|r| r.brand == "Nike");
        let nike = nike.map(|r| (r.min_rank, r.max_rank, r.avg_rank, r.samples.len()));
        assert_eq!(nike, Some((1, 3, 2.0, 2)));
        // Adidas averages 1.5, Nike 2.0, Puma 2.0.
        assert_eq!(ranges[0].brand, "Adidas");
    }

    #[test]
    fn position_by_platform_uses_provider_order() {
        let ds = dataset(vec![
            result("gemini", "Adidas, Puma, Nike", &["Adidas", "Puma", "Nike"]),
            result("openai", "Nike first", &["Nike"]),
            result("openai", "Adidas only", &["Adidas"]),
        ]);
        let platforms = compute_position_by_platform(&ds);
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms[0].label, "ChatGPT");
        let openai = &platforms[0].buckets;
        assert_eq!(openai[0].count, 1);
        assert_eq!(openai[4].count, 1);
        assert!((openai[0].percentage - 50.0).abs() < 1e-9);
        let gemini = &platforms[1].buckets;
        assert_eq!(gemini[1].count, 1);
    }
}

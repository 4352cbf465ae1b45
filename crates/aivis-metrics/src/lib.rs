//! Analytics pipeline over a run's results.
//!
//! Stages run in a fixed order: brand normalization, base filtering (mention
//! correction, global filters), then per-tab metric computation. The first two
//! stages are folded into [`Dataset::prepare`]; every `compute_*` function
//! takes the resulting [`Dataset`] and is pure.
//!
//! Missing data never fails. An empty dataset yields empty vectors, zeroes,
//! `None`, or neutral scores.

pub mod brand_metrics;
pub mod competitive;
pub mod dataset;
pub mod filters;
pub mod insights;
pub mod issue;
pub mod normalize;
pub mod overview;
pub mod positions;
pub mod public_figure;
pub mod ranking;
pub mod recommendations;
pub mod reference;
pub mod sentiment;
pub mod sources;
pub mod stats;
pub mod text;

pub use brand_metrics::{
    brand_stats, collect_brand_stats, BrandStats, FlatRate, ProviderAveraged, Tally,
    VisibilityModel,
};
pub use competitive::{
    compute_brand_breakdown, compute_brand_cooccurrence, BrandBreakdownRow, BrandPair,
};
pub use dataset::Dataset;
pub use filters::{
    available_brands, available_prompts, available_providers, corrected_results,
    globally_filtered_results, provider_label, tracked_brands, PROVIDER_ORDER,
};
pub use insights::{generate_competitive_insights, Insight, InsightKind};
pub use issue::{compute_issue_metrics, Framing, IssueMetrics};
pub use normalize::{apply_brand_normalization, build_normalization_map, BrandNormalizationMap};
pub use overview::{
    compute_overview_metrics, compute_share_of_voice, fragmentation_score, OverviewMetrics,
    ProviderOverview,
};
pub use positions::{
    compute_position_by_platform, compute_rank_ranges, PlatformPositions, PositionBucket,
    RankRange,
};
pub use public_figure::{compute_public_figure_metrics, PublicFigureMetrics};
pub use ranking::{rank_in_result, ResultPositions};
pub use recommendations::{generate_recommendations, Priority, Recommendation};
pub use reference::{compute_reference_rows, compute_run_summary, ReferenceRow, RunSummary};
pub use sentiment::{
    compute_provider_sentiment, compute_sentiment_distribution, ProviderSentiment,
    SentimentDistribution,
};
pub use sources::{
    compute_domain_heatmap, compute_source_domains, compute_source_gap_analysis,
    compute_source_sentiment_gap, DomainHeatmap, GapMagnitude, SourceDomain, SourceGap,
    SourceSentimentGap,
};

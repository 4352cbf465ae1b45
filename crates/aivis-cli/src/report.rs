//! `report` and `run` command handlers: build a [`Dataset`] from a run and the
//! saved dashboard state, compute the requested tabs, and print them as
//! Markdown or JSON.

use std::path::Path;

use aivis_client::BackendClient;
use aivis_core::{AppConfig, DashboardState, GlobalFilters, RunStatusResponse, SearchType};
use aivis_metrics::{
    compute_brand_breakdown, compute_brand_cooccurrence, compute_domain_heatmap,
    compute_issue_metrics, compute_overview_metrics, compute_position_by_platform,
    compute_provider_sentiment, compute_public_figure_metrics, compute_rank_ranges,
    compute_reference_rows, compute_run_summary, compute_sentiment_distribution,
    compute_share_of_voice, compute_source_domains, compute_source_gap_analysis,
    compute_source_sentiment_gap, generate_competitive_insights, generate_recommendations,
    BrandBreakdownRow, BrandPair, Dataset, DomainHeatmap, Insight, IssueMetrics, OverviewMetrics,
    PlatformPositions, ProviderSentiment, PublicFigureMetrics, RankRange, Recommendation,
    ReferenceRow, RunSummary, SentimentDistribution, SourceDomain, SourceGap, SourceSentimentGap,
};
use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::Serialize;

mod markdown;

pub use markdown::render_markdown;

/// Domains shown in the provider heatmap.
const HEATMAP_DOMAINS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Tab {
    #[default]
    All,
    Overview,
    Competitive,
    Sentiment,
    Sources,
    Reference,
    Recommendations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// Per-invocation overrides of the saved dashboard state, plus output shape.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Only include answers from this provider ("all" clears the filter)
    #[arg(long)]
    pub provider: Option<String>,
    /// Only include answers to this prompt ("all" clears the filter)
    #[arg(long)]
    pub prompt: Option<String>,
    /// Only include answers mentioning this brand ("all" clears the filter)
    #[arg(long)]
    pub brand: Option<String>,
    /// Hide a brand from every table (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
    /// Brand the per-brand metrics focus on ("all" resets to the run subject)
    #[arg(long)]
    pub select: Option<String>,
    #[arg(long, value_enum, default_value_t = Tab::All)]
    pub tab: Tab,
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}

impl ViewArgs {
    /// Applies the flags on top of `state`. Flags that were not given leave
    /// the saved value alone.
    pub fn apply(&self, state: &mut DashboardState) {
        if let Some(provider) = &self.provider {
            state.filters.provider = GlobalFilters::parse_selection(provider);
        }
        if let Some(prompt) = &self.prompt {
            state.filters.prompt = GlobalFilters::parse_selection(prompt);
        }
        if let Some(brand) = &self.brand {
            state.filters.brand = GlobalFilters::parse_selection(brand);
        }
        for brand in &self.exclude {
            state.excluded_brands.insert(brand);
        }
        if let Some(selected) = &self.select {
            state.selected_brand = GlobalFilters::parse_selection(selected);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OverviewSection {
    pub metrics: OverviewMetrics,
    pub share_of_voice: Vec<(String, f64)>,
}

#[derive(Debug, Serialize)]
pub struct CompetitiveSection {
    pub breakdown: Vec<BrandBreakdownRow>,
    pub cooccurrence: Vec<BrandPair>,
    pub insights: Vec<Insight>,
    pub rank_ranges: Vec<RankRange>,
    pub positions: Vec<PlatformPositions>,
}

#[derive(Debug, Serialize)]
pub struct SentimentSection {
    pub distribution: Vec<SentimentDistribution>,
    pub by_provider: Vec<ProviderSentiment>,
}

#[derive(Debug, Serialize)]
pub struct SourcesSection {
    pub domains: Vec<SourceDomain>,
    pub heatmap: DomainHeatmap,
    pub gaps: Vec<SourceGap>,
    pub sentiment_gaps: Vec<SourceSentimentGap>,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub selected_brand: String,
    pub summary: RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<OverviewSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_figure: Option<PublicFigureMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive: Option<CompetitiveSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourcesSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Vec<ReferenceRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
}

/// Report on a run saved as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the dashboard
/// state file is malformed.
pub(crate) fn run_report_file(
    config: &AppConfig,
    input: &Path,
    view: &ViewArgs,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read run file {}", input.display()))?;
    let run: RunStatusResponse = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a run-status payload", input.display()))?;
    emit(config, &run, view)
}

/// Fetch a run from the backend and report on it, polling until it reaches
/// a terminal status when `wait` is set.
///
/// # Errors
///
/// Returns an error if the backend client cannot be built, the run cannot be
/// fetched, or polling times out.
pub(crate) async fn run_report_remote(
    config: &AppConfig,
    run_id: &str,
    wait: bool,
    view: &ViewArgs,
) -> anyhow::Result<()> {
    let client = BackendClient::new(config).context("failed to build backend client")?;
    let run = if wait {
        client.poll_run(run_id).await?
    } else {
        client.get_run(run_id).await?
    };
    emit(config, &run, view)
}

fn emit(config: &AppConfig, run: &RunStatusResponse, view: &ViewArgs) -> anyhow::Result<()> {
    let mut state = aivis_core::load_dashboard_state(&config.state_path)?;
    view.apply(&mut state);

    let ds = Dataset::prepare(Some(run), &state);

    let report = build_report(&ds, view.tab);
    match view.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Markdown => print!("{}", render_markdown(&report)?),
    }
    Ok(())
}

/// Computes the sections `tab` asks for. The overview section depends on the
/// search type: issues and public figures get their own metrics.
#[must_use]
pub fn build_report(ds: &Dataset, tab: Tab) -> Report {
    let wants = |t: Tab| tab == Tab::All || tab == t;
    let mut report = Report {
        selected_brand: ds.selected_brand.clone(),
        summary: compute_run_summary(ds),
        ..Report::default()
    };

    if wants(Tab::Overview) {
        match ds.search_type {
            SearchType::Issue => report.issue = Some(compute_issue_metrics(ds)),
            SearchType::PublicFigure => {
                report.public_figure = Some(compute_public_figure_metrics(ds));
            }
            SearchType::Brand | SearchType::Category | SearchType::Local => {
                report.overview = Some(OverviewSection {
                    metrics: compute_overview_metrics(ds),
                    share_of_voice: compute_share_of_voice(ds),
                });
            }
        }
    }
    if wants(Tab::Competitive) {
        let breakdown = compute_brand_breakdown(ds);
        let cooccurrence = compute_brand_cooccurrence(ds);
        let insights = generate_competitive_insights(ds, &breakdown, &cooccurrence);
        report.competitive = Some(CompetitiveSection {
            breakdown,
            cooccurrence,
            insights,
            rank_ranges: compute_rank_ranges(ds),
            positions: compute_position_by_platform(ds),
        });
    }
    if wants(Tab::Sentiment) {
        report.sentiment = Some(SentimentSection {
            distribution: compute_sentiment_distribution(ds),
            by_provider: compute_provider_sentiment(ds),
        });
    }
    if wants(Tab::Sources) {
        report.sources = Some(SourcesSection {
            domains: compute_source_domains(ds),
            heatmap: compute_domain_heatmap(ds, HEATMAP_DOMAINS),
            gaps: compute_source_gap_analysis(ds),
            sentiment_gaps: compute_source_sentiment_gap(ds),
        });
    }
    if wants(Tab::Reference) {
        report.reference = Some(compute_reference_rows(ds));
    }
    if wants(Tab::Recommendations) {
        report.recommendations = Some(generate_recommendations(ds));
    }
    report
}

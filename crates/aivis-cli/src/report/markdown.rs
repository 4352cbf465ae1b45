//! Markdown rendering of a [`Report`], one section per computed tab.

use std::fmt::Write as _;

use aivis_metrics::{
    Framing, IssueMetrics, Priority, PublicFigureMetrics, Recommendation, ReferenceRow,
    SentimentDistribution,
};
use chrono::Utc;

use super::{CompetitiveSection, OverviewSection, Report, SentimentSection, SourcesSection};

const DASH: &str = "\u{2014}";

/// Renders a report as a Markdown document.
///
/// # Errors
///
/// Only if writing to the in-memory buffer fails.
pub fn render_markdown(report: &Report) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let summary = &report.summary;

    writeln!(out, "# AI Visibility Report: {}", summary.subject)?;
    writeln!(out)?;
    writeln!(out, "**Generated**: {}", Utc::now().format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(
        out,
        "**Search type**: {} | **Focus**: {} | **Results**: {} of {} ({} errored) | **Cost**: ${:.2}",
        summary.search_type,
        or_dash(&report.selected_brand),
        summary.filtered_results,
        summary.total_results,
        summary.errored_results,
        summary.total_cost
    )?;
    writeln!(
        out,
        "**Prompts**: {} | **Providers**: {}",
        summary.prompts,
        or_dash(&summary.providers.join(", "))
    )?;

    if let Some(overview) = &report.overview {
        write_overview(&mut out, overview)?;
    }
    if let Some(issue) = &report.issue {
        write_issue(&mut out, issue)?;
    }
    if let Some(figure) = &report.public_figure {
        write_public_figure(&mut out, figure)?;
    }
    if let Some(competitive) = &report.competitive {
        write_competitive(&mut out, competitive)?;
    }
    if let Some(sentiment) = &report.sentiment {
        write_sentiment(&mut out, sentiment)?;
    }
    if let Some(sources) = &report.sources {
        write_sources(&mut out, sources)?;
    }
    if let Some(rows) = &report.reference {
        write_reference(&mut out, rows)?;
    }
    if let Some(recommendations) = &report.recommendations {
        write_recommendations(&mut out, recommendations)?;
    }
    Ok(out)
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(out)?;
    writeln!(out, "## {title}")?;
    writeln!(out)
}

fn write_overview(out: &mut String, overview: &OverviewSection) -> std::fmt::Result {
    let m = &overview.metrics;
    section(out, &format!("Overview: {}", or_dash(&m.brand)))?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|--------|-------|")?;
    writeln!(out, "| Visibility | {} |", pct(m.overall_visibility))?;
    writeln!(out, "| Mentioned in | {} of {} answers |", m.mentioned_results, m.total_results)?;
    writeln!(out, "| Average rank | {} |", opt1(m.avg_rank))?;
    writeln!(out, "| #1 rate | {} |", pct(m.top1_rate))?;
    writeln!(out, "| Share of voice | {} |", pct(m.share_of_voice))?;
    writeln!(out, "| Brands per answer | {:.1} |", m.avg_brands_per_query)?;
    writeln!(out, "| Market fragmentation | {}/10 |", m.fragmentation_score)?;
    writeln!(out, "| Unique sources | {} |", m.unique_sources)?;

    if !m.providers.is_empty() {
        writeln!(out)?;
        writeln!(out, "### By provider")?;
        writeln!(out)?;
        writeln!(out, "| Provider | Visibility | Avg rank | #1 rate |")?;
        writeln!(out, "|----------|------------|----------|---------|")?;
        for p in &m.providers {
            writeln!(
                out,
                "| {} | {} ({}/{}) | {} | {} |",
                p.label,
                pct(p.visibility),
                p.mentioned,
                p.total,
                opt1(p.avg_rank),
                pct(p.top1_rate)
            )?;
        }
    }

    if !overview.share_of_voice.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Share of voice")?;
        writeln!(out)?;
        writeln!(out, "| Brand | Share |")?;
        writeln!(out, "|-------|-------|")?;
        for (brand, share) in &overview.share_of_voice {
            writeln!(out, "| {} | {} |", escape(brand), pct(*share))?;
        }
    }
    Ok(())
}

fn write_issue(out: &mut String, issue: &IssueMetrics) -> std::fmt::Result {
    section(out, &format!("Issue: {}", issue.issue))?;
    writeln!(
        out,
        "**Dominant framing**: {} | **Platform consensus**: {}/10 | **Framed answers**: {} of {}",
        issue.dominant_framing.map_or(DASH, Framing::label),
        issue.platform_consensus,
        issue.framed_results,
        issue.total_results
    )?;
    writeln!(out)?;
    writeln!(out, "| Framing | Answers | Share |")?;
    writeln!(out, "|---------|---------|-------|")?;
    for share in &issue.framing_distribution {
        writeln!(out, "| {} | {} | {} |", share.framing.label(), share.count, pct(share.percentage))?;
    }

    if !issue.provider_framings.is_empty() {
        writeln!(out)?;
        writeln!(out, "### By provider")?;
        writeln!(out)?;
        for (provider, framing) in &issue.provider_framings {
            writeln!(out, "- {provider}: {}", framing.label())?;
        }
    }
    if !issue.related_issues.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Related issues")?;
        writeln!(out)?;
        for related in &issue.related_issues {
            writeln!(
                out,
                "- {} ({} answers, {})",
                related.name,
                related.count,
                pct(related.percentage)
            )?;
        }
    }
    Ok(())
}

fn write_public_figure(out: &mut String, figure: &PublicFigureMetrics) -> std::fmt::Result {
    section(out, &format!("Public figure: {}", figure.figure))?;
    let split = &figure.sentiment_split;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|--------|-------|")?;
    writeln!(
        out,
        "| Portrayal score | {} |",
        figure.portrayal_score.map_or_else(|| DASH.to_string(), |s| format!("{s:+.1}"))
    )?;
    writeln!(
        out,
        "| Positive / neutral / negative | {} / {} / {} |",
        pct(split.positive),
        pct(split.neutral),
        pct(split.negative)
    )?;
    writeln!(out, "| Mention rate | {} |", pct(figure.prominence.figure_rate))?;
    if let (Some(name), Some(rate)) = (
        &figure.prominence.top_competitor,
        figure.prominence.top_competitor_rate,
    ) {
        writeln!(out, "| Most mentioned peer | {} ({}) |", escape(name), pct(rate))?;
    }
    writeln!(out, "| Platform agreement | {}/10 |", figure.platform_agreement)?;

    if !figure.provider_sentiment.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Mean sentiment by provider")?;
        writeln!(out)?;
        for (provider, score) in &figure.provider_sentiment {
            writeln!(out, "- {provider}: {score:.2}")?;
        }
    }
    Ok(())
}

fn write_competitive(out: &mut String, competitive: &CompetitiveSection) -> std::fmt::Result {
    section(out, "Competitive landscape")?;
    writeln!(
        out,
        "| Brand | Visibility | Share of voice | First position | Avg rank | Avg sentiment | Mentions |"
    )?;
    writeln!(
        out,
        "|-------|------------|----------------|----------------|----------|---------------|----------|"
    )?;
    for row in &competitive.breakdown {
        let name = if row.is_subject {
            format!("**{}**", escape(&row.brand))
        } else {
            escape(&row.brand)
        };
        writeln!(
            out,
            "| {name} | {} | {} | {} | {} | {} | {} |",
            pct(row.visibility),
            pct(row.share_of_voice),
            pct(row.first_position_rate),
            opt1(row.avg_rank),
            opt1(row.avg_sentiment),
            row.mentions
        )?;
    }

    if !competitive.insights.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Insights")?;
        writeln!(out)?;
        for insight in &competitive.insights {
            writeln!(out, "- {}", insight.text)?;
        }
    }

    if !competitive.rank_ranges.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Rank ranges")?;
        writeln!(out)?;
        writeln!(out, "| Brand | Best | Worst | Average | Samples |")?;
        writeln!(out, "|-------|------|-------|---------|---------|")?;
        for range in &competitive.rank_ranges {
            writeln!(
                out,
                "| {} | #{} | #{} | {:.1} | {} |",
                escape(&range.brand),
                range.min_rank,
                range.max_rank,
                range.avg_rank,
                range.samples.len()
            )?;
        }
    }

    if let Some(first) = competitive.positions.first() {
        writeln!(out)?;
        writeln!(out, "### Position by platform")?;
        writeln!(out)?;
        let labels: Vec<&str> = first.buckets.iter().map(|b| b.bucket.label()).collect();
        writeln!(out, "| Provider | {} |", labels.join(" | "))?;
        writeln!(out, "|----------|{}", "------|".repeat(labels.len()))?;
        for platform in &competitive.positions {
            let cells: Vec<String> = platform.buckets.iter().map(|b| pct(b.percentage)).collect();
            writeln!(out, "| {} | {} |", platform.label, cells.join(" | "))?;
        }
    }

    if !competitive.cooccurrence.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Mentioned together")?;
        writeln!(out)?;
        for pair in competitive.cooccurrence.iter().take(10) {
            writeln!(out, "- {} + {}: {} answers", pair.brand_a, pair.brand_b, pair.count)?;
        }
    }
    Ok(())
}

fn write_sentiment(out: &mut String, sentiment: &SentimentSection) -> std::fmt::Result {
    section(out, "Sentiment")?;
    writeln!(out, "| Brand | Answers | Avg score | Breakdown |")?;
    writeln!(out, "|-------|---------|-----------|-----------|")?;
    for dist in &sentiment.distribution {
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            escape(&dist.brand),
            dist.total,
            opt1(dist.avg_score),
            breakdown(dist)
        )?;
    }

    if !sentiment.by_provider.is_empty() {
        writeln!(out)?;
        writeln!(out, "### By provider")?;
        writeln!(out)?;
        writeln!(out, "| Provider | Answers | Avg score | Breakdown |")?;
        writeln!(out, "|----------|---------|-----------|-----------|")?;
        for provider in &sentiment.by_provider {
            let dist = &provider.distribution;
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                provider.label,
                dist.total,
                opt1(dist.avg_score),
                breakdown(dist)
            )?;
        }
    }
    Ok(())
}

fn breakdown(dist: &SentimentDistribution) -> String {
    let parts: Vec<String> = dist
        .counts
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| format!("{} {}", c.sentiment, c.count))
        .collect();
    if parts.is_empty() {
        DASH.to_string()
    } else {
        parts.join(", ")
    }
}

fn write_sources(out: &mut String, sources: &SourcesSection) -> std::fmt::Result {
    section(out, "Sources")?;
    if sources.domains.is_empty() {
        writeln!(out, "No cited sources.")?;
        return Ok(());
    }
    writeln!(out, "| Domain | Citations | Providers | Brand mentioned | Avg sentiment | Importance |")?;
    writeln!(out, "|--------|-----------|-----------|-----------------|---------------|------------|")?;
    for domain in &sources.domains {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.0} |",
            domain.domain,
            domain.citations,
            domain.providers.len(),
            pct(domain.brand_mention_rate),
            opt1(domain.avg_sentiment),
            domain.importance
        )?;
    }

    let heatmap = &sources.heatmap;
    if !heatmap.rows.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Citations by provider")?;
        writeln!(out)?;
        writeln!(out, "| Domain | {} | Total |", heatmap.providers.join(" | "))?;
        writeln!(out, "|--------|{}-------|", "------|".repeat(heatmap.providers.len()))?;
        for row in &heatmap.rows {
            let cells: Vec<String> = row.counts.iter().map(ToString::to_string).collect();
            writeln!(out, "| {} | {} | {} |", row.domain, cells.join(" | "), row.total)?;
        }
    }

    if !sources.gaps.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Source gaps")?;
        writeln!(out)?;
        writeln!(out, "| Domain | Citations | Brand | Top competitor | Gap | Opportunity |")?;
        writeln!(out, "|--------|-----------|-------|----------------|-----|-------------|")?;
        for gap in &sources.gaps {
            writeln!(
                out,
                "| {} | {} | {} | {} ({}) | {:.1} pts | {:.1} |",
                gap.domain,
                gap.citations,
                pct(gap.brand_rate),
                escape(&gap.top_competitor),
                pct(gap.competitor_rate),
                gap.gap,
                gap.opportunity_score
            )?;
        }
    }

    if !sources.sentiment_gaps.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Sentiment gaps")?;
        writeln!(out)?;
        writeln!(out, "| Domain | Brand | Top competitor | Delta | Magnitude |")?;
        writeln!(out, "|--------|-------|----------------|-------|-----------|")?;
        for gap in &sources.sentiment_gaps {
            writeln!(
                out,
                "| {} | {:.1} | {} ({:.1}) | {:+.1} | {:?} |",
                gap.domain,
                gap.brand_sentiment,
                escape(&gap.top_competitor),
                gap.competitor_sentiment,
                gap.delta,
                gap.magnitude
            )?;
        }
    }
    Ok(())
}

fn write_reference(out: &mut String, rows: &[ReferenceRow]) -> std::fmt::Result {
    section(out, "Responses")?;
    if rows.is_empty() {
        writeln!(out, "No responses match the current filters.")?;
        return Ok(());
    }
    writeln!(out, "| Prompt | Provider | Mentioned | Rank | Sentiment | Brands | Sources |")?;
    writeln!(out, "|--------|----------|-----------|------|-----------|--------|---------|")?;
    for row in rows {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            escape(&row.prompt),
            row.provider_label,
            if row.mentioned { "yes" } else { "no" },
            row.rank.map_or_else(|| DASH.to_string(), |r| format!("#{r}")),
            row.sentiment.map_or_else(|| DASH.to_string(), |s| s.to_string()),
            escape(&row.brands.join(", ")),
            row.source_count
        )?;
    }
    Ok(())
}

fn write_recommendations(out: &mut String, recommendations: &[Recommendation]) -> std::fmt::Result {
    section(out, "Recommendations")?;
    if recommendations.is_empty() {
        writeln!(out, "Nothing stands out. Keep monitoring.")?;
        return Ok(());
    }
    for rec in recommendations {
        writeln!(out, "- **[{}] {}**: {}", priority_label(rec.priority), rec.title, rec.detail)?;
    }
    Ok(())
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

fn pct(value: f64) -> String {
    format!("{value:.1}%")
}

fn opt1(value: Option<f64>) -> String {
    value.map_or_else(|| DASH.to_string(), |v| format!("{v:.1}"))
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        DASH
    } else {
        s
    }
}

/// Escapes a value for a Markdown table cell.
fn escape(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_table_cells() {
        assert_eq!(escape("a|b\nc"), "a\\|b c");
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(opt1(None), DASH);
        assert_eq!(opt1(Some(2.26)), "2.3");
        assert_eq!(or_dash(""), DASH);
        assert_eq!(pct(42.0), "42.0%");
    }
}

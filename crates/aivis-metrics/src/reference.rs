//! Reference tab: the raw responses behind every chart.

use aivis_core::{SearchType, Sentiment};
use serde::Serialize;

use crate::brand_metrics::sentiment_for;
use crate::dataset::Dataset;
use crate::filters::{provider_label, result_mentions};
use crate::ranking::ResultPositions;
use crate::text::excerpt;

/// Characters of response text kept in a reference row.
pub const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRow {
    pub id: String,
    pub prompt: String,
    pub provider: String,
    pub provider_label: String,
    pub model: Option<String>,
    pub mentioned: bool,
    pub rank: Option<u32>,
    pub sentiment: Option<Sentiment>,
    pub brands: Vec<String>,
    pub source_count: usize,
    pub cost: Option<f64>,
    pub excerpt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub subject: String,
    pub search_type: SearchType,
    pub total_results: usize,
    pub errored_results: usize,
    pub filtered_results: usize,
    pub prompts: usize,
    pub providers: Vec<String>,
    /// The backend's reported cost, else the sum of per-result costs.
    pub total_cost: f64,
}

/// One row per filtered response, seen from the selected brand.
#[must_use]
pub fn compute_reference_rows(ds: &Dataset) -> Vec<ReferenceRow> {
    let subject = ds.subject_brand();
    let brand = ds.selected_brand.as_str();

    ds.filtered()
        .into_iter()
        .map(|result| {
            let mentioned = !brand.is_empty() && result_mentions(result, brand, subject);
            let rank = if mentioned {
                Some(ResultPositions::new(result, subject).rank_of(brand)).filter(|&r| r > 0)
            } else {
                None
            };
            ReferenceRow {
                id: result.id.clone(),
                prompt: result.prompt.clone(),
                provider: result.provider.clone(),
                provider_label: provider_label(&result.provider),
                model: result.model.clone(),
                mentioned,
                rank,
                sentiment: mentioned
                    .then(|| sentiment_for(result, brand, subject))
                    .flatten(),
                brands: result.mention_list().to_vec(),
                source_count: result.sources.len(),
                cost: result.cost,
                excerpt: excerpt(result.text(), EXCERPT_CHARS),
            }
        })
        .collect()
}

#[must_use]
pub fn compute_run_summary(ds: &Dataset) -> RunSummary {
    let errored = ds.results.iter().filter(|r| r.is_errored()).count();
    let total_cost = ds
        .actual_cost
        .unwrap_or_else(|| ds.results.iter().filter_map(|r| r.cost).sum());

    RunSummary {
        subject: ds.subject.clone(),
        search_type: ds.search_type,
        total_results: ds.results.len(),
        errored_results: errored,
        filtered_results: ds.filtered().len(),
        prompts: ds.prompts.len(),
        providers: ds.providers.clone(),
        total_cost,
    }
}

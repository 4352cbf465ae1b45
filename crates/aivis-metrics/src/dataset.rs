//! Prepared input for every metric: a run after normalization, mention
//! correction, and global filtering, together with the dashboard state that
//! shaped it.
//!
//! A `Dataset` is a plain value. Callers rebuild it when the run or the
//! dashboard state changes and reuse it for every tab in between.

use std::collections::HashSet;

use aivis_core::{DashboardState, ExcludedBrands, RunResult, RunStatusResponse, SearchType};

use crate::brand_metrics::collect_brand_stats;
use crate::filters::{
    available_brands, available_prompts, available_providers, corrected_results,
    passes_global_filters, tracked_brands,
};
use crate::normalize::{apply_brand_normalization, build_normalization_map, BrandNormalizationMap};
use crate::text::eq_ignore_case;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub subject: String,
    pub search_type: SearchType,
    /// Every result after normalization and correction, errored ones included.
    pub results: Vec<RunResult>,
    filtered: Vec<usize>,
    pub excluded: ExcludedBrands,
    /// Non-excluded brand universe, subject first for non-category searches.
    pub brands: Vec<String>,
    /// Brand universe before exclusions; share-of-voice denominators use it.
    pub all_brands: Vec<String>,
    pub prompts: Vec<String>,
    pub providers: Vec<String>,
    pub tracked: HashSet<String>,
    pub selected_brand: String,
    pub normalization: BrandNormalizationMap,
    pub actual_cost: Option<f64>,
}

impl Dataset {
    /// Prepare a dataset, or an empty one when no run has loaded yet.
    #[must_use]
    pub fn prepare(run: Option<&RunStatusResponse>, state: &DashboardState) -> Self {
        run.map_or_else(Self::default, |run| Self::from_run(run, state))
    }

    #[must_use]
    pub fn from_run(run: &RunStatusResponse, state: &DashboardState) -> Self {
        let normalization = build_normalization_map(&run.results);

        let mut normalized = run.clone();
        normalized.results = apply_brand_normalization(&run.results, &normalization).into_owned();
        normalized.results = corrected_results(&normalized).into_owned();

        let subject_brand = if run.search_type.is_category() {
            ""
        } else {
            run.brand.as_str()
        };

        let filtered: Vec<usize> = normalized
            .results
            .iter()
            .enumerate()
            .filter(|(_, r)| passes_global_filters(r, &state.filters, subject_brand))
            .map(|(i, _)| i)
            .collect();

        let brands = available_brands(&normalized, &state.excluded_brands);
        let all_brands = available_brands(&normalized, &ExcludedBrands::new());

        let mut dataset = Self {
            subject: run.brand.clone(),
            search_type: run.search_type,
            prompts: available_prompts(&normalized.results),
            providers: available_providers(&normalized.results),
            tracked: tracked_brands(&normalized),
            results: normalized.results,
            filtered,
            excluded: state.excluded_brands.clone(),
            brands,
            all_brands,
            selected_brand: String::new(),
            normalization,
            actual_cost: run.actual_cost,
        };
        dataset.selected_brand = dataset.resolve_selected_brand(state.selected_brand.as_deref());

        tracing::debug!(
            subject = %dataset.subject,
            results = dataset.results.len(),
            filtered = dataset.filtered.len(),
            brands = dataset.brands.len(),
            selected = %dataset.selected_brand,
            "prepared dataset"
        );

        dataset
    }

    /// Results passing the global filters, errored results excluded.
    #[must_use]
    pub fn filtered(&self) -> Vec<&RunResult> {
        self.filtered.iter().map(|&i| &self.results[i]).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// The subject when it is a brand; `""` for category searches.
    #[must_use]
    pub fn subject_brand(&self) -> &str {
        if self.search_type.is_category() {
            ""
        } else {
            &self.subject
        }
    }

    #[must_use]
    pub fn is_subject(&self, brand: &str) -> bool {
        let subject = self.subject_brand();
        !subject.is_empty() && crate::text::fold(brand) == crate::text::fold(subject)
    }

    /// Mention events across every tracked brand in `results`, excluded
    /// brands included.
    #[must_use]
    pub fn total_mention_events(&self, results: &[&RunResult]) -> usize {
        collect_brand_stats(results, &self.all_brands, self.subject_brand())
            .iter()
            .map(|s| s.overall.mentioned)
            .sum()
    }

    /// Non-excluded brands other than the subject.
    #[must_use]
    pub fn competitors(&self) -> Vec<String> {
        self.brands
            .iter()
            .filter(|b| !self.is_subject(b))
            .cloned()
            .collect()
    }

    fn resolve_selected_brand(&self, requested: Option<&str>) -> String {
        if let Some(found) = requested.and_then(|req| {
            let canonical = self.normalization.resolve(req);
            self.brands
                .iter()
                .find(|b| eq_ignore_case(b, req) || b.as_str() == canonical)
        }) {
            return found.clone();
        }

        let subject = self.subject_brand();
        if !subject.is_empty() && !self.excluded.contains(subject) {
            return subject.to_string();
        }

        // Category searches focus on the most-mentioned brand.
        let filtered = self.filtered();
        collect_brand_stats(&filtered, &self.brands, subject)
            .into_iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| {
                a.overall
                    .mentioned
                    .cmp(&b.overall.mentioned)
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(_, stats)| stats.brand)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use aivis_core::GlobalFilters;

    use super::*;

    fn result(provider: &str, text: &str, mentioned: bool, brands: &[&str]) -> RunResult {
        RunResult {
            provider: provider.to_string(),
            prompt: "best shoes".to_string(),
            response_text: Some(text.to_string()),
            brand_mentioned: Some(mentioned),
            competitors_mentioned: brands.iter().map(|b| (*b).to_string()).collect(),
            ..RunResult::default()
        }
    }

    #[test]
    fn missing_run_prepares_empty_dataset() {
        let ds = Dataset::prepare(None, &DashboardState::default());
        assert!(ds.is_empty());
        assert!(ds.brands.is_empty());
        assert_eq!(ds.selected_brand, "");
    }

    #[test]
    fn selected_brand_defaults_to_subject() {
        let run = RunStatusResponse {
            brand: "Nike".to_string(),
            results: vec![result("openai", "Nike and Adidas", true, &["Adidas"])],
            ..RunStatusResponse::default()
        };
        let ds = Dataset::from_run(&run, &DashboardState::default());
        assert_eq!(ds.selected_brand, "Nike");
        assert_eq!(ds.competitors(), vec!["Adidas"]);
    }

    #[test]
    fn category_selects_most_mentioned_brand() {
        let run = RunStatusResponse {
            brand: "running shoes".to_string(),
            search_type: SearchType::Category,
            results: vec![
                result("openai", "Adidas, Nike", false, &["Adidas", "Nike"]),
                result("gemini", "Nike", false, &["Nike"]),
            ],
            ..RunStatusResponse::default()
        };
        let ds = Dataset::from_run(&run, &DashboardState::default());
        assert_eq!(ds.selected_brand, "Nike");
        assert_eq!(ds.subject_brand(), "");
    }

    #[test]
    fn filters_and_exclusions_flow_through() {
        let run = RunStatusResponse {
            brand: "Nike".to_string(),
            results: vec![
                result("openai", "Nike and Adidas", true, &["Adidas", "Puma"]),
                result("gemini", "Adidas", false, &["Adidas"]),
            ],
            ..RunStatusResponse::default()
        };
        let mut state = DashboardState {
            filters: GlobalFilters {
                provider: Some("openai".to_string()),
                ..GlobalFilters::default()
            },
            ..DashboardState::default()
        };
        state.excluded_brands.insert("Puma");
        let ds = Dataset::from_run(&run, &state);
        assert_eq!(ds.filtered().len(), 1);
        assert_eq!(ds.brands, vec!["Nike", "Adidas"]);
        assert_eq!(ds.all_brands, vec!["Nike", "Adidas", "Puma"]);
        assert_eq!(ds.providers, vec!["openai", "gemini"]);
    }

    #[test]
    fn requested_selection_resolves_through_normalization() {
        let run = RunStatusResponse {
            brand: "Nike".to_string(),
            results: vec![
                result("openai", "x", true, &["Condé Nast"]),
                result("openai", "x", true, &["Conde Nast"]),
                result("openai", "x", true, &["Conde Nast"]),
            ],
            ..RunStatusResponse::default()
        };
        let state = DashboardState {
            selected_brand: Some("Condé Nast".to_string()),
            ..DashboardState::default()
        };
        let ds = Dataset::from_run(&run, &state);
        assert_eq!(ds.selected_brand, "Conde Nast");
    }
}

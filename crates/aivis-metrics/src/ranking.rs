//! Rank inference from text position.
//!
//! The backend reports which brands an answer mentions but not in what order.
//! A brand's rank is one plus the number of other candidate brands whose first
//! occurrence in the answer comes earlier. Brands whose names overlap the
//! target (`"Gap"` / `"The Gap"`) are ignored so one mention is not counted
//! twice.
//!
//! This is a heuristic. Brand names that are common words, or that are
//! substrings of each other beyond the overlap guard, can be placed wrongly.

use std::collections::HashSet;

use aivis_core::RunResult;

use crate::filters::result_mentions;
use crate::text::{extract_answer_text, find_lowered};

struct Candidate<'a> {
    name: &'a str,
    lower: String,
    first_index: Option<usize>,
}

/// Positions of every candidate brand within one result's answer text.
///
/// Built once per result and queried for as many brands as needed.
pub struct ResultPositions<'a> {
    result: &'a RunResult,
    subject: &'a str,
    text: String,
    candidates: Vec<Candidate<'a>>,
}

impl<'a> ResultPositions<'a> {
    /// `subject` is the run's subject brand, or `""` when the run has none
    /// (category searches).
    #[must_use]
    pub fn new(result: &'a RunResult, subject: &'a str) -> Self {
        let text = extract_answer_text(&result.provider, result.text()).to_lowercase();

        let mut seen = HashSet::new();
        let candidates = candidate_brands(result, subject)
            .into_iter()
            .filter_map(|name| {
                let lower = name.to_lowercase();
                if !seen.insert(lower.clone()) {
                    return None;
                }
                let first_index = find_lowered(&text, &lower);
                Some(Candidate {
                    name,
                    lower,
                    first_index,
                })
            })
            .collect();

        Self {
            result,
            subject,
            text,
            candidates,
        }
    }

    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.candidates.iter().map(|c| c.name)
    }

    /// Rank of `brand`: 1-based, `0` when the result does not mention it.
    #[must_use]
    pub fn rank_of(&self, brand: &str) -> u32 {
        self.rank_among(brand, |_| true)
    }

    /// Rank of `brand` counting only candidates accepted by `include`.
    ///
    /// Used where excluded brands must not push others down the list.
    #[must_use]
    pub fn rank_among<F>(&self, brand: &str, include: F) -> u32
    where
        F: Fn(&str) -> bool,
    {
        if !result_mentions(self.result, brand, self.subject) {
            return 0;
        }

        let target = brand.to_lowercase();
        let Some(target_index) = find_lowered(&self.text, &target) else {
            // Flagged as mentioned but not locatable: worst-case placement.
            let count = self.candidates.iter().filter(|c| include(c.name)).count();
            return to_rank(count + 1);
        };

        let earlier = self
            .candidates
            .iter()
            .filter(|c| include(c.name))
            .filter(|c| {
                c.lower != target && !c.lower.contains(&target) && !target.contains(&c.lower)
            })
            .filter(|c| c.first_index.is_some_and(|i| i < target_index))
            .count();

        to_rank(earlier + 1)
    }
}

fn to_rank(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Brands competing for position in one result: `all_brands_mentioned` when
/// present, otherwise the legacy `[subject, ...competitors]` list.
#[must_use]
pub fn candidate_brands<'a>(result: &'a RunResult, subject: &'a str) -> Vec<&'a str> {
    match &result.all_brands_mentioned {
        Some(all) if !all.is_empty() => all.iter().map(String::as_str).collect(),
        _ => std::iter::once(subject)
            .filter(|s| !s.trim().is_empty())
            .chain(result.competitors_mentioned.iter().map(String::as_str))
            .collect(),
    }
}

/// Rank of `brand` in `result`; see [`ResultPositions::rank_of`].
#[must_use]
pub fn rank_in_result(result: &RunResult, brand: &str, subject: &str) -> u32 {
    ResultPositions::new(result, subject).rank_of(brand)
}

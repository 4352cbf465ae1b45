//! Run-status payload returned by the backend's `GET /api/v1/run/{id}`.
//!
//! Every field carries a serde default so partially-populated payloads
//! (runs still in progress, legacy result shapes) deserialize cleanly.
//! Explicit `null`s in non-optional fields read as the field's default.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::sentiment::Sentiment;

/// What the run's subject is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    Brand,
    Category,
    Local,
    Issue,
    PublicFigure,
}

impl SearchType {
    /// Category searches have no subject brand; every mentioned name is a peer.
    #[must_use]
    pub fn is_category(self) -> bool {
        self == SearchType::Category
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchType::Brand => write!(f, "brand"),
            SearchType::Category => write!(f, "category"),
            SearchType::Local => write!(f, "local"),
            SearchType::Issue => write!(f, "issue"),
            SearchType::PublicFigure => write!(f, "public_figure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Queued,
    Running,
    Complete,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Terminal runs never change again; polling stops once one is observed.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Complete | RunStatus::Failed | RunStatus::Cancelled
        )
    }
}

/// A URL cited in an AI answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Sentiment toward individual brands within this cited page, when the
    /// backend extracted it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand_sentiments: BTreeMap<String, Sentiment>,
}

/// One (prompt × provider × temperature × repeat) invocation outcome.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunResult {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub repeat_index: Option<u32>,
    pub response_text: Option<String>,
    pub error: Option<String>,
    pub brand_mentioned: Option<bool>,
    /// Competitor names in order of appearance in the answer.
    #[serde(deserialize_with = "null_as_default")]
    pub competitors_mentioned: Vec<String>,
    /// Every brand in order of appearance. `None` on legacy payloads.
    pub all_brands_mentioned: Option<Vec<String>>,
    pub brand_sentiment: Option<Sentiment>,
    #[serde(deserialize_with = "null_as_default")]
    pub competitor_sentiments: BTreeMap<String, Sentiment>,
    #[serde(deserialize_with = "null_as_default")]
    pub sources: Vec<Source>,
    pub cost: Option<f64>,
}

impl RunResult {
    /// `true` when the provider call failed.
    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    #[must_use]
    pub fn is_brand_mentioned(&self) -> bool {
        self.brand_mentioned == Some(true)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.response_text.as_deref().unwrap_or("")
    }

    /// The brand list used for mention and rank checks: `all_brands_mentioned`
    /// when populated, otherwise the competitor list.
    #[must_use]
    pub fn mention_list(&self) -> &[String] {
        match &self.all_brands_mentioned {
            Some(all) if !all.is_empty() => all,
            _ => &self.competitors_mentioned,
        }
    }
}

/// The parent run and every result gathered so far.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStatusResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub run_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: RunStatus,
    /// Subject of the run: brand, category, business, issue, or person.
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub search_type: SearchType,
    #[serde(deserialize_with = "null_as_default")]
    pub total_calls: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub completed_calls: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub failed_calls: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<RunResult>,
    pub actual_cost: Option<f64>,
    pub estimated_cost: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

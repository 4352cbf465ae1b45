//! User-controlled dashboard state: global filters, excluded brands, and the
//! brand currently in focus.
//!
//! The state is an explicit value passed to the metrics pipeline. It is only
//! read from or written to disk through [`load_dashboard_state`] and
//! [`save_dashboard_state`].

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Provider / prompt / brand filters. `None` means "all".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalFilters {
    pub provider: Option<String>,
    pub prompt: Option<String>,
    pub brand: Option<String>,
}

impl GlobalFilters {
    /// Parses a filter value, treating `"all"` (any case) and blanks as no filter.
    #[must_use]
    pub fn parse_selection(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Brands hidden from every brand universe. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExcludedBrands(BTreeSet<String>);

impl ExcludedBrands {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a brand; returns `false` if it was already excluded.
    pub fn insert(&mut self, brand: &str) -> bool {
        self.0.insert(brand.trim().to_lowercase())
    }

    /// Removes a brand; returns `false` if it was not excluded.
    pub fn remove(&mut self, brand: &str) -> bool {
        self.0.remove(&brand.trim().to_lowercase())
    }

    #[must_use]
    pub fn contains(&self, brand: &str) -> bool {
        !self.0.is_empty() && self.0.contains(&brand.trim().to_lowercase())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExcludedBrands {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ExcludedBrands::new();
        for brand in iter {
            set.insert(brand.as_ref());
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardState {
    pub filters: GlobalFilters,
    pub excluded_brands: ExcludedBrands,
    /// Brand the per-brand widgets focus on. Defaults to the run subject.
    pub selected_brand: Option<String>,
}

/// Load dashboard state from a YAML file. A missing file yields the default state.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_dashboard_state(path: &Path) -> Result<DashboardState, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DashboardState::default());
        }
        Err(e) => {
            return Err(ConfigError::StateFileIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(DashboardState::default());
    }

    let state: DashboardState = serde_yaml::from_str(&content)?;
    Ok(state)
}

/// Write dashboard state to a YAML file, creating parent directories as needed.
///
/// # Errors
///
/// Returns `ConfigError` if serialization or the write fails.
pub fn save_dashboard_state(path: &Path, state: &DashboardState) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::StateFileIo {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let yaml = serde_yaml::to_string(state)?;
    std::fs::write(path, yaml).map_err(io_err)
}

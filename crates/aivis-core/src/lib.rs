//! Shared types for the AI visibility toolkit.
//!
//! Holds the run-status data model returned by the backend, the ordinal
//! [`Sentiment`] scale, the persisted [`DashboardState`], and environment
//! configuration loading.

pub mod app_config;
pub mod config;
pub mod run;
pub mod sentiment;
pub mod state;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use run::{RunResult, RunStatus, RunStatusResponse, SearchType, Source};
pub use sentiment::Sentiment;
pub use state::{
    load_dashboard_state, save_dashboard_state, DashboardState, ExcludedBrands, GlobalFilters,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read dashboard state file {path}: {source}")]
    StateFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dashboard state file: {0}")]
    StateFileParse(#[from] serde_yaml::Error),
}

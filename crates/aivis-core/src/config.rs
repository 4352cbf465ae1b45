use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("AIVIS_ENV", "development"))?;

    let api_base_url = or_default("AIVIS_API_BASE_URL", "http://localhost:8000");
    let api_token = optional("AIVIS_API_TOKEN");
    let log_level = or_default("AIVIS_LOG_LEVEL", "info");
    let state_path = PathBuf::from(or_default("AIVIS_STATE_PATH", "./config/dashboard.yaml"));

    let request_timeout_secs = parse_u64("AIVIS_REQUEST_TIMEOUT_SECS", "30")?;
    let poll_interval_ms = parse_u64("AIVIS_POLL_INTERVAL_MS", "2000")?;
    let poll_max_attempts = parse_u32("AIVIS_POLL_MAX_ATTEMPTS", "900")?;

    if poll_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_POLL_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
    let openai_model = or_default("OPENAI_MODEL", "gpt-4o-mini");

    Ok(AppConfig {
        env,
        api_base_url,
        api_token,
        log_level,
        state_path,
        request_timeout_secs,
        poll_interval_ms,
        poll_max_attempts,
        openai_api_key,
        openai_base_url,
        openai_model,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

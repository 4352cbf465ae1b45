use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("unknown").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "AIVIS_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.api_base_url, "http://localhost:8000");
    assert!(cfg.api_token.is_none());
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.state_path,
        std::path::PathBuf::from("./config/dashboard.yaml")
    );
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.poll_interval_ms, 2000);
    assert_eq!(cfg.poll_max_attempts, 900);
    assert!(cfg.openai_api_key.is_none());
    assert_eq!(cfg.openai_base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.openai_model, "gpt-4o-mini");
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("AIVIS_ENV", "production");
    map.insert("AIVIS_API_BASE_URL", "https://api.example.com");
    map.insert("AIVIS_API_TOKEN", "secret-token");
    map.insert("AIVIS_POLL_INTERVAL_MS", "500");
    map.insert("OPENAI_API_KEY", "sk-test");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.api_base_url, "https://api.example.com");
    assert_eq!(cfg.api_token.as_deref(), Some("secret-token"));
    assert_eq!(cfg.poll_interval_ms, 500);
    assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let mut map = HashMap::new();
    map.insert("AIVIS_LOG_LEVEL", "  ");
    map.insert("OPENAI_API_KEY", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.openai_api_key.is_none());
}

#[test]
fn invalid_poll_interval_is_rejected() {
    let mut map = HashMap::new();
    map.insert("AIVIS_POLL_INTERVAL_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AIVIS_POLL_INTERVAL_MS"),
        "expected InvalidEnvVar(AIVIS_POLL_INTERVAL_MS), got: {result:?}"
    );
}

#[test]
fn invalid_request_timeout_is_rejected() {
    let mut map = HashMap::new();
    map.insert("AIVIS_REQUEST_TIMEOUT_SECS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AIVIS_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(AIVIS_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn zero_poll_attempts_is_rejected() {
    let mut map = HashMap::new();
    map.insert("AIVIS_POLL_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AIVIS_POLL_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(AIVIS_POLL_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("AIVIS_API_TOKEN", "secret-token");
    map.insert("OPENAI_API_KEY", "sk-live-123");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("secret-token"));
    assert!(!debug.contains("sk-live-123"));
    assert!(debug.contains("[redacted]"));
}

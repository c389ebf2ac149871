use crate::app_config::{AppConfig, Environment, RelayMode};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
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
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("FEEDLYBD_ENV", "development"));
    let log_level = or_default("FEEDLYBD_LOG_LEVEL", "info");
    let feeds_path = PathBuf::from(or_default("FEEDLYBD_FEEDS_PATH", "./config/feeds.yaml"));

    let relay_url = or_default("FEEDLYBD_RELAY_URL", "https://corsproxy.io/?url=");
    if !(relay_url.starts_with("http://") || relay_url.starts_with("https://")) {
        return Err(invalid(
            "FEEDLYBD_RELAY_URL",
            format!("\"{relay_url}\" is not an http(s) URL"),
        ));
    }
    let relay_mode = parse_relay_mode(&or_default("FEEDLYBD_RELAY_MODE", "xml"))
        .ok_or_else(|| invalid("FEEDLYBD_RELAY_MODE", "expected \"xml\" or \"json\"".into()))?;

    let fetch_timeout_secs = parse_u64("FEEDLYBD_FETCH_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("FEEDLYBD_USER_AGENT", "feedlybd/0.1 (feed-reader)");
    let max_concurrent_feeds = parse_usize("FEEDLYBD_MAX_CONCURRENT_FEEDS", "0")?;

    let title_cleanup = parse_bool("FEEDLYBD_TITLE_CLEANUP", "false")?;
    let title_strip_dash_suffix = parse_bool("FEEDLYBD_TITLE_STRIP_DASH_SUFFIX", "false")?;

    let summary_url = lookup("FEEDLYBD_SUMMARY_URL").ok();
    let summary_api_key = lookup("FEEDLYBD_SUMMARY_API_KEY").ok();
    let summary_min_gap_ms = parse_u64("FEEDLYBD_SUMMARY_MIN_GAP_MS", "5000")?;
    let summary_max_retries = parse_u32("FEEDLYBD_SUMMARY_MAX_RETRIES", "1")?;

    Ok(AppConfig {
        env,
        log_level,
        feeds_path,
        relay_url,
        relay_mode,
        fetch_timeout_secs,
        user_agent,
        max_concurrent_feeds,
        title_cleanup,
        title_strip_dash_suffix,
        summary_url,
        summary_api_key,
        summary_min_gap_ms,
        summary_max_retries,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_relay_mode(s: &str) -> Option<RelayMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "xml" | "raw" => Some(RelayMode::RawXml),
        "json" | "envelope" => Some(RelayMode::JsonEnvelope),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

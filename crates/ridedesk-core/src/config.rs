use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Either `RIDEDESK_API_BASE_URL` or `RIDEDESK_FIXTURE_PATH` must be set;
/// without one of them there is nowhere to load locations from.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let env = parse_environment(&or_default("RIDEDESK_ENV", "development"))?;
    let log_level = or_default("RIDEDESK_LOG_LEVEL", "info");

    let api_base_url = lookup("RIDEDESK_API_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    if let Some(url) = &api_base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidEnvVar {
                var: "RIDEDESK_API_BASE_URL".to_string(),
                reason: format!("expected an http(s) URL, got '{url}'"),
            });
        }
    }
    let api_token = lookup("RIDEDESK_API_TOKEN").ok();
    let fixture_path = lookup("RIDEDESK_FIXTURE_PATH").ok().map(PathBuf::from);

    if api_base_url.is_none() && fixture_path.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "RIDEDESK_API_BASE_URL".to_string(),
        ));
    }

    let request_timeout_secs = parse_u64("RIDEDESK_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("RIDEDESK_USER_AGENT", "ridedesk/0.1 (dashboard)");
    let max_retries = parse_u32("RIDEDESK_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("RIDEDESK_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        api_token,
        fixture_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RIDEDESK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

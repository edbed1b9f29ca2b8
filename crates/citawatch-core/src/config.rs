use crate::app_config::{ApiConfig, AppConfig, PortalConfig, TelegramConfig};
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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
///
/// Each pipeline block is keyed on one variable (`CITAWATCH_API_BASE_URL`,
/// `CITAWATCH_PORTAL_URL`, `CITAWATCH_TELEGRAM_TOKEN`): when the key is absent
/// the block resolves to `None` and the rest of its variables are ignored; when
/// present, the block's remaining required variables must also be set.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<bool>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    // Comma-separated id list, e.g. "15,22,31". Empty entries are rejected so
    // a trailing comma surfaces as a config error rather than a silent skip.
    let require_i64_list = |var: &str| -> Result<Vec<i64>, ConfigError> {
        let raw = require(var)?;
        raw.split(',')
            .map(|part| {
                part.trim()
                    .parse::<i64>()
                    .map_err(|e| ConfigError::InvalidEnvVar {
                        var: var.to_string(),
                        reason: format!("entry \"{part}\": {e}"),
                    })
            })
            .collect()
    };

    let require_string_list = |var: &str| -> Result<Vec<String>, ConfigError> {
        let raw = require(var)?;
        raw.split(',')
            .map(|part| {
                let trimmed = part.trim();
                if trimmed.is_empty() {
                    Err(ConfigError::InvalidEnvVar {
                        var: var.to_string(),
                        reason: "empty list entry".to_string(),
                    })
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .collect()
    };

    let api = match lookup("CITAWATCH_API_BASE_URL") {
        Ok(base_url) => Some(ApiConfig {
            base_url,
            username: require("CITAWATCH_API_USERNAME")?,
            password: require("CITAWATCH_API_PASSWORD")?,
            health_centre_ids: require_i64_list("CITAWATCH_API_HEALTH_CENTRE_IDS")?,
            specialty_ids: require_i64_list("CITAWATCH_API_SPECIALTY_IDS")?,
            agreement_id: parse_i64("CITAWATCH_API_AGREEMENT_ID", "90002")?,
            format_id: parse_i64("CITAWATCH_API_FORMAT_ID", "1")?,
            max_concurrent_jobs: parse_usize("CITAWATCH_API_MAX_CONCURRENT_JOBS", "5")?,
            job_timeout_secs: parse_u64("CITAWATCH_API_JOB_TIMEOUT_SECS", "300")?,
            request_timeout_secs: parse_u64("CITAWATCH_API_REQUEST_TIMEOUT_SECS", "300")?,
        }),
        Err(_) => None,
    };

    let portal = match lookup("CITAWATCH_PORTAL_URL") {
        Ok(url) => Some(PortalConfig {
            url,
            health_centre_ids: require_string_list("CITAWATCH_PORTAL_HEALTH_CENTRE_IDS")?,
            specialty_ids: require_string_list("CITAWATCH_PORTAL_SPECIALTY_IDS")?,
            insurer_id: or_default("CITAWATCH_PORTAL_INSURER_ID", "3"),
            group_id: or_default("CITAWATCH_PORTAL_GROUP_ID", "4"),
            concept_id: or_default("CITAWATCH_PORTAL_CONCEPT_ID", "61"),
            job_timeout_secs: parse_u64("CITAWATCH_PORTAL_JOB_TIMEOUT_SECS", "60")?,
            settle_delay_secs: parse_u64("CITAWATCH_PORTAL_SETTLE_DELAY_SECS", "5")?,
            control_wait_secs: parse_u64("CITAWATCH_PORTAL_CONTROL_WAIT_SECS", "5")?,
            headless: parse_bool("CITAWATCH_PORTAL_HEADLESS", "true")?,
        }),
        Err(_) => None,
    };

    let telegram = match lookup("CITAWATCH_TELEGRAM_TOKEN") {
        Ok(token) => {
            let raw = require("CITAWATCH_TELEGRAM_CHAT_ID")?;
            let chat_id = raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: "CITAWATCH_TELEGRAM_CHAT_ID".to_string(),
                reason: e.to_string(),
            })?;
            Some(TelegramConfig { token, chat_id })
        }
        Err(_) => None,
    };

    let log_level = or_default("CITAWATCH_LOG_LEVEL", "info");

    Ok(AppConfig {
        log_level,
        api,
        portal,
        telegram,
    })
}

//! Environment configuration loader.
//!
//! The environment is read exactly once, at process start, into the
//! immutable [`AppConfig`]; the workflow never performs ambient lookups
//! mid-run. Required variables fail hard before any browser session opens.

use std::str::FromStr;

use presensi_types::config::{AppConfig, CheckType, Credentials, GeoPoint, DEFAULT_PORT};
use presensi_types::error::ConfigError;
use secrecy::SecretString;

/// Environment variable names.
pub const ACCOUNT_EMAIL: &str = "ACCOUNT_EMAIL";
pub const ACCOUNT_PASSWORD: &str = "ACCOUNT_PASSWORD";
pub const GEO_LATITUDE: &str = "GEO_LATITUDE";
pub const GEO_LONGITUDE: &str = "GEO_LONGITUDE";
pub const CHECK_TYPE: &str = "CHECK_TYPE";
pub const HEADLESS_BROWSER: &str = "HEADLESS_BROWSER";
pub const SKIP_CHECK_IN_OUT: &str = "SKIP_CHECK_IN_OUT";
pub const PORT: &str = "PORT";
pub const HOLIDAY_FILE: &str = "HOLIDAY_FILE";

/// Build the process configuration from the ambient environment.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    build(|name| std::env::var(name).ok())
}

/// Path of the holiday calendar file, if one is configured.
pub fn holiday_file_from_env() -> Option<String> {
    std::env::var(HOLIDAY_FILE).ok()
}

fn build<F>(get: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    let email = required(&get, ACCOUNT_EMAIL)?;
    let password = required(&get, ACCOUNT_PASSWORD)?;
    let latitude = parse_f64(&get, GEO_LATITUDE)?;
    let longitude = parse_f64(&get, GEO_LONGITUDE)?;

    // An unrecognized check type means "locate the controls, click nothing",
    // matching the portal workflow's contract; it is not a startup error.
    let check_type = match get(CHECK_TYPE) {
        None => None,
        Some(raw) => match CheckType::from_str(&raw) {
            Ok(ct) => Some(ct),
            Err(reason) => {
                tracing::warn!(%reason, "unrecognized CHECK_TYPE, no action will be clicked");
                None
            }
        },
    };

    let headless = parse_bool(&get, HEADLESS_BROWSER, true)?;
    let skip_action = parse_bool(&get, SKIP_CHECK_IN_OUT, false)?;

    let port = match get(PORT) {
        None => DEFAULT_PORT,
        Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidVar {
            var: PORT,
            reason: e.to_string(),
        })?,
    };

    Ok(AppConfig {
        credentials: Credentials {
            email,
            password: SecretString::from(password),
        },
        geolocation: GeoPoint {
            latitude,
            longitude,
        },
        check_type,
        headless,
        skip_action,
        port,
    })
}

fn required<F>(get: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    match get(var) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

fn parse_f64<F>(get: &F, var: &'static str) -> Result<f64, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    required(get, var)?
        .trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidVar {
            var,
            reason: e.to_string(),
        })
}

fn parse_bool<F>(get: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<bool>()
            .map_err(|_| ConfigError::InvalidVar {
                var,
                reason: format!("expected true or false, got '{raw}'"),
            }),
    }
}

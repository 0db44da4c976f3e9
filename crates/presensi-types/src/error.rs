use thiserror::Error;

/// Errors raised while building the process configuration.
///
/// All of these are fatal at startup, before any browser session opens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    #[error("holiday calendar file {path}: {reason}")]
    HolidayFile { path: String, reason: String },
}

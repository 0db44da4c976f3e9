//! Immutable run configuration.
//!
//! `AppConfig` is constructed exactly once at process start (by
//! `presensi-infra::config::load_from_env`) and passed by reference into the
//! workflow. Nothing reads ambient environment variables after startup.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Default HTTP trigger port.
pub const DEFAULT_PORT: u16 = 8080;

/// Which attendance action a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckType {
    /// Morning clock-in.
    CheckIn,
    /// Evening clock-out.
    CheckOut,
}

impl FromStr for CheckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CHECK_IN" => Ok(CheckType::CheckIn),
            "CHECK_OUT" => Ok(CheckType::CheckOut),
            other => Err(format!("expected CHECK_IN or CHECK_OUT, got '{other}'")),
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckType::CheckIn => write!(f, "CHECK_IN"),
            CheckType::CheckOut => write!(f, "CHECK_OUT"),
        }
    }
}

/// Fixed geolocation reported to the portal.
///
/// The portal validates clock-in location, so the browsing context is created
/// with these coordinates and the geolocation permission pre-granted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Portal account credentials.
///
/// The password never appears in `Debug` output; `SecretString` redacts it.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Process-wide configuration, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Portal account credentials.
    pub credentials: Credentials,
    /// Coordinates granted to the browsing context.
    pub geolocation: GeoPoint,
    /// The action to perform. `None` means locate the controls but click
    /// nothing.
    pub check_type: Option<CheckType>,
    /// Run the browser headless (default) or with a visible window.
    pub headless: bool,
    /// Global override: never click, even on a normal working day.
    pub skip_action: bool,
    /// HTTP trigger port.
    pub port: u16,
}

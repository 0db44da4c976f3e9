//! Holiday calendar loading.
//!
//! The calendar is supplied as a TOML file (`dates = ["25 Dec 2023", ...]`)
//! so the yearly refresh is a data change, not a code change. When no file
//! is configured, a compiled-in default set is used.

use std::path::Path;

use presensi_types::calendar::HolidayCalendar;
use presensi_types::error::ConfigError;

/// Default calendar: Indonesian public holidays and cuti bersama, 2023.
pub const DEFAULT_HOLIDAYS: &[&str] = &[
    "23 Jan 2023", // cuti bersama imlek
    "23 Mar 2023", // nyepi, cuti bersama nyepi
    "7 Apr 2023",  // wafat isa almasih
    "19 Apr 2023", // idul fitri
    "20 Apr 2023", // idul fitri
    "21 Apr 2023", // idul fitri
    "24 Apr 2023", // idul fitri
    "25 Apr 2023", // idul fitri
    "27 Apr 2023", // cuti
    "1 May 2023",  // hari buruh
    "18 May 2023", // kenaikan isa almasih
    "1 Jun 2023",  // hari lahir pancasila
    "2 Jun 2023",  // cuti bersama waisak
    "29 Jun 2023", // idul adha
    "19 Jul 2023", // tahun baru islam
    "17 Aug 2023", // kemerdekaan indonesia
    "28 Sep 2023", // maulid nabi muhammad
    "25 Dec 2023", // natal
    "26 Dec 2023", // cuti bersama natal
];

/// The compiled-in default calendar.
pub fn default_calendar() -> HolidayCalendar {
    HolidayCalendar::from_dates(DEFAULT_HOLIDAYS.iter().copied())
}

/// Load the calendar from `path`, or fall back to the default when `None`.
///
/// A configured file that cannot be read or parsed is a hard error: a
/// silently empty calendar would clock in on holidays.
pub async fn load_calendar(path: Option<&Path>) -> Result<HolidayCalendar, ConfigError> {
    let Some(path) = path else {
        tracing::debug!("no holiday file configured, using built-in calendar");
        return Ok(default_calendar());
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::HolidayFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let calendar: HolidayCalendar =
        toml::from_str(&content).map_err(|e| ConfigError::HolidayFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    tracing::info!(path = %path.display(), dates = calendar.len(), "loaded holiday calendar");
    Ok(calendar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_no_path_uses_default() {
        let calendar = load_calendar(None).await.unwrap();
        assert!(calendar.contains("25 Dec 2023"));
        assert!(calendar.contains("1 May 2023"));
        assert_eq!(calendar.len(), DEFAULT_HOLIDAYS.len());
    }

    #[tokio::test]
    async fn test_file_replaces_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("holidays.toml");
        tokio::fs::write(&path, r#"dates = ["1 Jan 2024", "17 Aug 2024"]"#)
            .await
            .unwrap();

        let calendar = load_calendar(Some(&path)).await.unwrap();
        assert_eq!(calendar.len(), 2);
        assert!(calendar.contains("1 Jan 2024"));
        assert!(!calendar.contains("25 Dec 2023"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.toml");
        let err = load_calendar(Some(&path)).await.unwrap_err();
        assert!(matches!(err, ConfigError::HolidayFile { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("holidays.toml");
        tokio::fs::write(&path, "dates = 25").await.unwrap();
        let err = load_calendar(Some(&path)).await.unwrap_err();
        match err {
            ConfigError::HolidayFile { path: p, .. } => assert!(p.ends_with("holidays.toml")),
            other => panic!("expected HolidayFile, got {other:?}"),
        }
    }
}

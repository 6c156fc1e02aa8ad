use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::settings::ReportSettings;
use crate::engine::error::ReportResult;

pub const CONFIG_PATH_VAR: &str = "NATAL_REPORT_CONFIG";

pub fn settings_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return PathBuf::from(path);
    }

    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("natal_report");
    path.push("settings.json");
    path
}

/// Read settings from `path`, falling back to defaults when the file is
/// missing or cannot be parsed.
pub fn load_settings(path: &Path) -> ReportSettings {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return ReportSettings::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "cannot read settings: {e}");
            return ReportSettings::default();
        }
    };

    match serde_json::from_str(&text) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), "malformed settings, using defaults: {e}");
            ReportSettings::default()
        }
    }
}

/// Settings file plus process environment.
pub fn load_from_env() -> ReportResult<ReportSettings> {
    let mut settings = load_settings(&settings_path());
    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().expect("temp dir");
        let settings = load_settings(&tmp.path().join("absent.json"));
        assert_eq!(settings.subject.birth_date, "1998-11-26");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "subject": { "name": "Test Native" }, "llm": { "min_interval_ms": 0 } }"#,
        )
        .expect("write settings");

        let settings = load_settings(&path);
        assert_eq!(settings.subject.name, "Test Native");
        assert_eq!(settings.subject.birth_time, "07:55");
        assert_eq!(settings.llm.min_interval_ms, 0);
        assert_eq!(settings.llm.model, "google/gemini-2.0-flash-exp:free");
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{ not json").expect("write settings");

        let settings = load_settings(&path);
        assert_eq!(settings.output.document_path, PathBuf::from("astrology_report.pdf"));
    }
}

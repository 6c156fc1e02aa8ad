use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::error::{ReportError, ReportResult};

pub const OPENROUTER_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const EPHEMERIS_KEY_VAR: &str = "FREE_ASTROLOGY_API_KEY";

/// Everything the pipeline needs to know before it starts.
///
/// Loaded from a JSON file, then overlaid with environment variables.
/// API keys only ever come from the environment and are never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub subject: SubjectSettings,
    pub ephemeris: EphemerisSettings,
    pub llm: LlmSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectSettings {
    pub name: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    /// `HH:MM`
    pub birth_time: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Hours east of UTC.
    pub timezone_offset: f64,
    pub observation_point: String,
    pub ayanamsha: String,
    pub chart_style: String,
}

impl Default for SubjectSettings {
    fn default() -> Self {
        Self {
            name: "Aditya Choudhary".into(),
            birth_date: "1998-11-26".into(),
            birth_time: "07:55".into(),
            latitude: 21.216276,
            longitude: 81.323608,
            timezone_offset: 5.5,
            observation_point: "topocentric".into(),
            ayanamsha: "lahiri".into(),
            chart_style: "NORTH_INDIAN".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemerisSettings {
    pub base_url: String,
    pub planets_path: String,
    pub chart_path: String,
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Pause between consecutive ephemeris requests.
    pub request_pause_ms: u64,
    pub timeout_secs: u64,
    /// Bodies skipped on top of the ayanamsa entry, matched case-insensitively.
    pub excluded_bodies: Vec<String>,
}

impl Default for EphemerisSettings {
    fn default() -> Self {
        Self {
            base_url: "https://json.freeastrologyapi.com".into(),
            planets_path: "/planets".into(),
            chart_path: "/horoscope-chart-svg-code".into(),
            api_key: None,
            request_pause_ms: 2_000,
            timeout_secs: 30,
            excluded_bodies: Vec::new(),
        }
    }
}

impl EphemerisSettings {
    pub fn planets_url(&self) -> String {
        join_url(&self.base_url, &self.planets_path)
    }

    pub fn chart_url(&self) -> String {
        join_url(&self.base_url, &self.chart_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Minimum spacing between two completion requests.
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".into(),
            model: "google/gemini-2.0-flash-exp:free".into(),
            temperature: 0.7,
            api_key: None,
            min_interval_ms: 5_000,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub document_path: PathBuf,
    /// Raw HTTP trace file. `None` disables it.
    pub diagnostic_log: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from("astrology_report.pdf"),
            diagnostic_log: Some(PathBuf::from("debug_log.txt")),
        }
    }
}

impl ReportSettings {
    /// Overlay environment variables on top of the file settings.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production and a map in tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ReportResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(OPENROUTER_KEY_VAR) {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = get(EPHEMERIS_KEY_VAR) {
            self.ephemeris.api_key = Some(key);
        }
        if let Some(name) = get("NATAL_REPORT_NAME") {
            self.subject.name = name;
        }
        if let Some(date) = get("NATAL_REPORT_DOB") {
            self.subject.birth_date = date;
        }
        if let Some(time) = get("NATAL_REPORT_TOB") {
            self.subject.birth_time = time;
        }
        if let Some(lat) = get("NATAL_REPORT_LAT") {
            self.subject.latitude = parse_coordinate("latitude", &lat)?;
        }
        if let Some(lon) = get("NATAL_REPORT_LON") {
            self.subject.longitude = parse_coordinate("longitude", &lon)?;
        }
        if let Some(path) = get("NATAL_REPORT_OUTPUT") {
            self.output.document_path = PathBuf::from(path);
        }
        if let Some(path) = get("NATAL_REPORT_DEBUG_LOG") {
            self.output.diagnostic_log = match path.as_str() {
                "off" | "none" => None,
                _ => Some(PathBuf::from(path)),
            };
        }

        Ok(())
    }
}

/// Range is checked by `BirthQuery`, for file and environment values alike.
fn parse_coordinate(field: &'static str, raw: &str) -> ReportResult<f64> {
    raw.trim()
        .parse()
        .map_err(|_| ReportError::invalid(field, raw, "not a number"))
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

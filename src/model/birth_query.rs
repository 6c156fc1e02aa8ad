use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::config::settings::SubjectSettings;
use crate::engine::error::{ReportError, ReportResult};

/// Chart options forwarded verbatim to the ephemeris service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub observation_point: String,
    pub ayanamsha: String,
    pub chart_style: String,
}

/// Validated birth moment and place. Built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthQuery {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone_offset: f64,
    pub chart: ChartConfig,
}

impl BirthQuery {
    /// Parse `YYYY-MM-DD` and `HH:MM`. Any malformed component is an
    /// `InvalidInput` error.
    pub fn parse(
        date: &str,
        time: &str,
        latitude: f64,
        longitude: f64,
        timezone_offset: f64,
        chart: ChartConfig,
    ) -> ReportResult<Self> {
        let [year, month, day] = parse_fields::<3>("birth date", date, '-', "expected YYYY-MM-DD")?;
        let [hour, minute] = parse_fields::<2>("birth time", time, ':', "expected HH:MM")?;

        if year == 0 || month == 0 || day == 0 {
            return Err(ReportError::invalid(
                "birth date",
                date,
                "year, month and day must be positive",
            ));
        }
        let year = i32::try_from(year)
            .map_err(|_| ReportError::invalid("birth date", date, "year out of range"))?;
        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(ReportError::invalid("birth date", date, "no such calendar day"));
        }
        if NaiveTime::from_hms_opt(hour, minute, 0).is_none() {
            return Err(ReportError::invalid("birth time", time, "hour or minute out of range"));
        }
        check_coordinate("latitude", latitude, 90.0)?;
        check_coordinate("longitude", longitude, 180.0)?;

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            latitude,
            longitude,
            timezone_offset,
            chart,
        })
    }

    pub fn from_settings(subject: &SubjectSettings) -> ReportResult<Self> {
        Self::parse(
            &subject.birth_date,
            &subject.birth_time,
            subject.latitude,
            subject.longitude,
            subject.timezone_offset,
            ChartConfig {
                observation_point: subject.observation_point.clone(),
                ayanamsha: subject.ayanamsha.clone(),
                chart_style: subject.chart_style.clone(),
            },
        )
    }

    /// `26 Nov 1998`
    pub fn display_date(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .map(|d| d.format("%-d %b %Y").to_string())
            .unwrap_or_else(|| format!("{:04}-{:02}-{:02}", self.year, self.month, self.day))
    }

    pub fn display_time(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Coordinates from the settings file and the environment both land here.
fn check_coordinate(field: &'static str, value: f64, limit: f64) -> ReportResult<()> {
    if value.is_finite() && value.abs() <= limit {
        return Ok(());
    }
    Err(ReportError::invalid(
        field,
        value.to_string(),
        format!("must be within ±{}", limit),
    ))
}

fn parse_fields<const N: usize>(
    field: &'static str,
    raw: &str,
    sep: char,
    shape: &str,
) -> ReportResult<[u32; N]> {
    let parts: Vec<&str> = raw.trim().split(sep).collect();
    if parts.len() != N {
        return Err(ReportError::invalid(field, raw, shape));
    }

    let mut out = [0u32; N];
    for (slot, part) in out.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReportError::invalid(field, raw, shape));
        }
        *slot = part
            .parse()
            .map_err(|_| ReportError::invalid(field, raw, shape))?;
    }
    Ok(out)
}

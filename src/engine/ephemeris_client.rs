use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};

use crate::config::settings::EphemerisSettings;
use crate::engine::error::{ReportError, ReportResult};
use crate::model::birth_query::BirthQuery;
use crate::model::chart_set::ChartKind;

/// Status code and body of one ephemeris call, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// The network edge of the ephemeris service.
pub trait EphemerisTransport {
    /// POST `body` as JSON. Only connection-level failures are errors; any
    /// HTTP status comes back as a `RawResponse`.
    fn post_json(&self, url: &str, body: &Value) -> ReportResult<RawResponse>;
}

pub struct HttpEphemeris {
    client: Client,
    api_key: Option<String>,
}

impl HttpEphemeris {
    pub fn new(settings: &EphemerisSettings) -> ReportResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ReportError::Transport {
                resource: "ephemeris client".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
        })
    }
}

impl EphemerisTransport for HttpEphemeris {
    fn post_json(&self, url: &str, body: &Value) -> ReportResult<RawResponse> {
        let transport_err = |e: reqwest::Error| ReportError::Transport {
            resource: url.to_string(),
            reason: e.to_string(),
        };

        let mut req = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }

        let resp = req.send().map_err(transport_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(transport_err)?;

        Ok(RawResponse { status, body })
    }
}

/// Request body shared by both endpoints. Chart requests add `chart_code`.
pub fn request_payload(query: &BirthQuery, chart: Option<ChartKind>) -> Value {
    let mut payload = json!({
        "year": query.year,
        "month": query.month,
        "date": query.day,
        "hours": query.hour,
        "minutes": query.minute,
        "seconds": 0,
        "latitude": query.latitude,
        "longitude": query.longitude,
        "timezone": query.timezone_offset,
        "config": query.chart,
    });

    if let (Some(kind), Value::Object(map)) = (chart, &mut payload) {
        map.insert("chart_code".into(), Value::from(kind.code()));
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::birth_query::ChartConfig;

    fn query() -> BirthQuery {
        BirthQuery::parse(
            "1998-11-26",
            "07:55",
            21.216276,
            81.323608,
            5.5,
            ChartConfig {
                observation_point: "topocentric".into(),
                ayanamsha: "lahiri".into(),
                chart_style: "NORTH_INDIAN".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn planets_payload_uses_service_field_names() {
        let payload = request_payload(&query(), None);
        assert_eq!(payload["year"], 1998);
        assert_eq!(payload["month"], 11);
        assert_eq!(payload["date"], 26);
        assert_eq!(payload["hours"], 7);
        assert_eq!(payload["minutes"], 55);
        assert_eq!(payload["seconds"], 0);
        assert_eq!(payload["timezone"], 5.5);
        assert_eq!(payload["config"]["ayanamsha"], "lahiri");
        assert_eq!(payload["config"]["chart_style"], "NORTH_INDIAN");
        assert!(payload.get("chart_code").is_none());
    }

    #[test]
    fn chart_payload_carries_chart_code() {
        let payload = request_payload(&query(), Some(ChartKind::Navamsa));
        assert_eq!(payload["chart_code"], "Navamsa");
        assert_eq!(payload["latitude"], 21.216276);
    }
}

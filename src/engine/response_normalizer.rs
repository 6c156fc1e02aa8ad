use std::rc::Rc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::config::settings::EphemerisSettings;
use crate::engine::diagnostics::DiagnosticLog;
use crate::engine::ephemeris_client::{request_payload, EphemerisTransport};
use crate::engine::error::{ReportError, ReportResult};
use crate::engine::pacing::{Clock, Pacer};
use crate::model::birth_query::BirthQuery;
use crate::model::chart_set::{ChartKind, ChartSet};
use crate::model::placement::{Placement, PlacementList, AYANAMSA};

/// Envelope keys tried, in order, before falling back to the raw body.
const PLACEMENT_ENVELOPES: [&str; 2] = ["output", "data"];
const CHART_ENVELOPES: [&str; 3] = ["output", "svg_code", "data"];

const SIGN_KEYS: [&str; 2] = ["current_sign", "sign"];
const HOUSE_KEYS: [&str; 2] = ["house_number", "house"];

/// Fetches placements and chart diagrams and turns whatever the service
/// sends back into `PlacementList` and `ChartSet`.
///
/// Nothing in here fails the run: transport and shape problems are logged
/// and the affected resource comes back empty.
pub struct ResponseNormalizer<T: EphemerisTransport> {
    transport: T,
    planets_url: String,
    chart_url: String,
    excluded: Vec<String>,
    pacer: Pacer,
}

impl<T: EphemerisTransport> ResponseNormalizer<T> {
    pub fn new(transport: T, settings: &EphemerisSettings, clock: Rc<dyn Clock>) -> Self {
        Self {
            transport,
            planets_url: settings.planets_url(),
            chart_url: settings.chart_url(),
            excluded: settings
                .excluded_bodies
                .iter()
                .map(|b| b.trim().to_lowercase())
                .collect(),
            pacer: Pacer::new(Duration::from_millis(settings.request_pause_ms), clock),
        }
    }

    pub fn normalize(&mut self, query: &BirthQuery, log: &mut DiagnosticLog) -> (PlacementList, ChartSet) {
        let placements = self.fetch_placements(query, log);
        let charts = self.fetch_charts(query, log);
        (placements, charts)
    }

    fn fetch_placements(&mut self, query: &BirthQuery, log: &mut DiagnosticLog) -> PlacementList {
        tracing::info!("requesting planetary positions");
        self.pacer.wait();

        let payload = request_payload(query, None);
        log.record(format!("POST {}", self.planets_url));
        log.record(format!("Planets Request: {}", payload));

        let resp = match self.transport.post_json(&self.planets_url, &payload) {
            Ok(resp) => resp,
            Err(e) => {
                log.record(format!("Exception fetching planets: {e}"));
                tracing::warn!("planets request failed: {e}");
                return Vec::new();
            }
        };

        log.record(format!("Planets Response Code: {}", resp.status));
        log.record(format!("Planets Response: {}", resp.body));

        if !resp.is_success() {
            log.record("Failed to fetch planets.");
            tracing::warn!(status = resp.status, "planets request rejected");
            return Vec::new();
        }

        match decode_placements(&resp.body, &self.excluded) {
            Ok(placements) => {
                log.record(format!("Parsed {} placements", placements.len()));
                tracing::info!(count = placements.len(), "planets data received");
                placements
            }
            Err(e) => {
                log.record(format!("Planets schema mismatch: {e}"));
                tracing::warn!("{e}");
                Vec::new()
            }
        }
    }

    fn fetch_charts(&mut self, query: &BirthQuery, log: &mut DiagnosticLog) -> ChartSet {
        let mut charts = ChartSet::new();

        for kind in ChartKind::ALL {
            tracing::info!(chart = %kind, "requesting chart");
            self.pacer.wait();

            let markup = match self.fetch_chart(kind, query, log) {
                Ok(markup) => markup,
                Err(e) => {
                    log.record(format!("Failed to fetch {kind}: {e}"));
                    tracing::warn!(chart = %kind, "chart omitted: {e}");
                    continue;
                }
            };

            let len = markup.len();
            if charts.insert(kind, markup) {
                log.record(format!("{kind} content found (len={len})"));
                tracing::debug!(chart = %kind, len, "chart markup accepted");
            } else {
                log.record(format!("{kind} content is not SVG markup"));
                tracing::warn!(chart = %kind, "chart omitted: no <svg> root");
            }
        }

        charts
    }

    fn fetch_chart(&self, kind: ChartKind, query: &BirthQuery, log: &mut DiagnosticLog) -> ReportResult<String> {
        let payload = request_payload(query, Some(kind));
        log.record(format!("POST {} ({kind})", self.chart_url));

        let resp = self.transport.post_json(&self.chart_url, &payload)?;
        log.record(format!("{kind} Chart Status: {}", resp.status));

        if !resp.is_success() {
            log.record(format!("{kind} Response: {}", resp.body));
            return Err(ReportError::Transport {
                resource: kind.code().to_string(),
                reason: format!("HTTP {}", resp.status),
            });
        }

        extract_chart_markup(kind, &resp.body)
    }
}

/// Decode a placements body of unknown shape.
///
/// Accepts the record list under `output`, `data` or at the root, either flat
/// or nested one level under numeric keys.
pub fn decode_placements(body: &str, excluded: &[String]) -> ReportResult<PlacementList> {
    let value: Value = serde_json::from_str(body).map_err(|e| ReportError::Schema {
        resource: "planets".into(),
        reason: format!("body is not JSON: {e}"),
    })?;

    let root = probe(&value, &PLACEMENT_ENVELOPES);
    let records = collect_records(root);
    if records.is_empty() {
        return Err(ReportError::Schema {
            resource: "planets".into(),
            reason: format!("no named records in {}", shape_of(root)),
        });
    }

    Ok(records
        .into_iter()
        .filter_map(to_placement)
        .filter(|p| !is_excluded(&p.body, excluded))
        .collect())
}

/// Pull SVG markup out of a chart body that may or may not be JSON.
pub fn extract_chart_markup(kind: ChartKind, body: &str) -> ReportResult<String> {
    let schema_err = |reason: String| ReportError::Schema {
        resource: kind.code().to_string(),
        reason,
    };

    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(markup)) => Ok(markup),
        Ok(Value::Object(map)) => CHART_ENVELOPES
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str).filter(|m| !m.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                schema_err(format!("no markup under keys {keys:?}"))
            }),
        Ok(other) => Err(schema_err(format!("unexpected {}", shape_of(&other)))),
        // Not JSON at all: the body is the markup.
        Err(_) => Ok(body.to_string()),
    }
}

fn probe<'v>(value: &'v Value, envelopes: &[&str]) -> &'v Value {
    envelopes
        .iter()
        .find_map(|key| value.get(*key).filter(|inner| !inner.is_null()))
        .unwrap_or(value)
}

fn collect_records(root: &Value) -> Vec<&Map<String, Value>> {
    let mut records = Vec::new();

    match root {
        Value::Array(items) => {
            for item in items {
                if let Value::Object(map) = item {
                    push_record_or_children(map, &mut records);
                }
            }
        }
        Value::Object(map) => push_record_or_children(map, &mut records),
        _ => {}
    }

    records
}

/// A map with a `name` is a record; otherwise its object values are.
fn push_record_or_children<'v>(map: &'v Map<String, Value>, out: &mut Vec<&'v Map<String, Value>>) {
    if map.contains_key("name") {
        out.push(map);
        return;
    }

    let mut children: Vec<(&String, &Map<String, Value>)> = map
        .iter()
        .filter_map(|(key, value)| value.as_object().map(|child| (key, child)))
        .filter(|(_, child)| child.contains_key("name"))
        .collect();

    // "10" must follow "9"; non-numeric keys keep their original order after.
    children.sort_by_key(|(key, _)| match key.trim().parse::<u64>() {
        Ok(n) => (0, n),
        Err(_) => (1, 0),
    });

    out.extend(children.into_iter().map(|(_, child)| child));
}

fn to_placement(record: &Map<String, Value>) -> Option<Placement> {
    let body = record
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())?;

    Some(Placement {
        body: body.to_string(),
        sign: first_present(record, &SIGN_KEYS).and_then(label_of),
        house: first_present(record, &HOUSE_KEYS).and_then(house_of),
    })
}

fn first_present<'v>(record: &'v Map<String, Value>, keys: &[&str]) -> Option<&'v Value> {
    keys.iter()
        .find_map(|key| record.get(*key).filter(|v| !v.is_null()))
}

fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn house_of(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|h| u32::try_from(h).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_excluded(body: &str, excluded: &[String]) -> bool {
    let body = body.to_lowercase();
    body == AYANAMSA || excluded.iter().any(|b| *b == body)
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

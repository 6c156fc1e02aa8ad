#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::anyhow;
use natal_report::config::settings::ReportSettings;
use natal_report::engine::ephemeris_client::{EphemerisTransport, RawResponse};
use natal_report::engine::error::{ReportError, ReportResult};
use natal_report::engine::llm_client::ChatService;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

pub const SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"100\" viewBox=\"0 0 100 100\"><rect x=\"10\" y=\"10\" width=\"80\" height=\"80\" fill=\"none\" stroke=\"black\"/></svg>";

pub const NINE_BODIES: [&str; 9] = [
    "Ascendant", "Sun", "Moon", "Mars", "Mercury", "Jupiter", "Venus", "Saturn", "Ayanamsa",
];

/// Planets body shaped like the live service: one object keyed by ordinal.
pub fn planets_body(bodies: &[&str]) -> String {
    let mut nested = Map::new();
    for (i, name) in bodies.iter().enumerate() {
        nested.insert(
            i.to_string(),
            json!({
                "name": name,
                "current_sign": (i % 12) + 1,
                "house_number": ((i + 3) % 12) + 1,
                "isRetro": "false"
            }),
        );
    }
    json!({ "statusCode": 200, "output": [Value::Object(nested)] }).to_string()
}

/// Scripted ephemeris service. Clones share the call log.
#[derive(Clone, Default)]
pub struct FakeEphemeris {
    pub planets: Option<RawResponse>,
    /// Chart replies by `chart_code`; `Err` is a connection failure.
    pub charts: HashMap<String, Result<RawResponse, String>>,
    pub calls: Rc<RefCell<Vec<Value>>>,
}

impl FakeEphemeris {
    pub fn new(planets: RawResponse) -> Self {
        Self {
            planets: Some(planets),
            ..Self::default()
        }
    }

    pub fn chart(mut self, code: &str, reply: Result<RawResponse, String>) -> Self {
        self.charts.insert(code.to_string(), reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl EphemerisTransport for FakeEphemeris {
    fn post_json(&self, url: &str, body: &Value) -> ReportResult<RawResponse> {
        self.calls.borrow_mut().push(body.clone());

        let unreachable = || ReportError::Transport {
            resource: url.to_string(),
            reason: "connection refused".into(),
        };

        match body.get("chart_code").and_then(Value::as_str) {
            None => self.planets.clone().ok_or_else(unreachable),
            Some(code) => match self.charts.get(code) {
                Some(Ok(resp)) => Ok(resp.clone()),
                Some(Err(reason)) => Err(ReportError::Transport {
                    resource: code.to_string(),
                    reason: reason.clone(),
                }),
                None => Err(unreachable()),
            },
        }
    }
}

/// Chat service that answers every prompt, failing for chosen bodies.
#[derive(Clone, Default)]
pub struct FakeChat {
    pub failing: HashSet<String>,
    pub reply: String,
    pub prompts: Rc<RefCell<Vec<String>>>,
}

impl FakeChat {
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn failing_for(mut self, body: &str) -> Self {
        self.failing.insert(body.to_string());
        self
    }
}

impl ChatService for FakeChat {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let failing = self
            .failing
            .iter()
            .any(|body| prompt.contains(&format!("has {body} in")));
        if failing {
            return Err(anyhow!("503 Service Unavailable"));
        }
        Ok(self.reply.clone())
    }
}

/// Settings pointing every output into a temp dir.
pub struct TestEnv {
    _tmp: TempDir,
    pub dir: PathBuf,
    pub settings: ReportSettings,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let dir = tmp.path().to_path_buf();

        let mut settings = ReportSettings::default();
        settings.output.document_path = dir.join("astrology_report.pdf");
        settings.output.diagnostic_log = Some(dir.join("debug_log.txt"));

        Self {
            _tmp: tmp,
            dir,
            settings,
        }
    }

    pub fn document(&self) -> &Path {
        &self.settings.output.document_path
    }

    pub fn diagnostic_log(&self) -> PathBuf {
        self.dir.join("debug_log.txt")
    }
}

/// One line of a `RecordingCanvas` listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedOp {
    pub page: usize,
    pub y: f32,
    pub text: String,
}

pub fn read_listing(path: &Path) -> Vec<ListedOp> {
    let raw = std::fs::read_to_string(path).expect("read listing");
    raw.lines()
        .map(|line| {
            let (page, rest) = line
                .strip_prefix('[')
                .and_then(|l| l.split_once("] "))
                .expect("page prefix");
            let rest = rest.trim_start();
            let (y, text) = rest.split_once(' ').expect("y column");
            ListedOp {
                page: page.parse().expect("page number"),
                y: y.parse().expect("y value"),
                text: text.to_string(),
            }
        })
        .collect()
}

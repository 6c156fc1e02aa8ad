mod common;

use std::rc::Rc;

use common::{planets_body, FakeChat, FakeEphemeris, TestEnv, SVG};
use natal_report::document::layout::PageGeometry;
use natal_report::document::pdf_canvas::PdfCanvas;
use natal_report::engine::ephemeris_client::RawResponse;
use natal_report::engine::llm_client::ChatService;
use natal_report::engine::pacing::ManualClock;
use natal_report::engine::pipeline::{ReportPipeline, REPORT_TITLE};

#[test]
fn writes_a_pdf_file() {
    let env = TestEnv::new();
    let service = FakeEphemeris::new(RawResponse::ok(planets_body(&["Ascendant", "Sun", "Moon"])))
        .chart("Lagna", Ok(RawResponse::ok(SVG)))
        .chart("Navamsa", Ok(RawResponse::ok(serde_json::json!({ "svg_code": SVG }).to_string())));
    let llm = FakeChat::answering("Surya\u{2019}s light favours leadership \u{2013} and patience.");

    let geometry = PageGeometry::A4;
    let canvas = PdfCanvas::new(REPORT_TITLE, geometry.width, geometry.height).expect("canvas");

    let summary = ReportPipeline::new(
        env.settings.clone(),
        service,
        Some(Box::new(llm) as Box<dyn ChatService>),
        Rc::new(ManualClock::new()),
    )
    .run(canvas)
    .expect("report");

    assert_eq!(summary.pages, 3);
    assert_eq!(summary.sections, 3);

    let bytes = std::fs::read(env.document()).expect("pdf written");
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.len() > 1000);
}

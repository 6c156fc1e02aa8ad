use std::rc::Rc;

use natal_report::config::settings_io;
use natal_report::document::layout::PageGeometry;
use natal_report::document::pdf_canvas::PdfCanvas;
use natal_report::engine::ephemeris_client::HttpEphemeris;
use natal_report::engine::llm_client::{ChatService, OpenAiCompatClient};
use natal_report::engine::pacing::SystemClock;
use natal_report::engine::pipeline::{ReportPipeline, REPORT_TITLE};
use natal_report::telemetry;

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    tracing::info!("--- Vedic Astrology Report Generator ---");

    let settings = settings_io::load_from_env()?;

    let transport = HttpEphemeris::new(&settings.ephemeris)?;
    let chat = OpenAiCompatClient::from_settings(&settings.llm)?
        .map(|client| Box::new(client) as Box<dyn ChatService>);

    let geometry = PageGeometry::A4;
    let canvas = PdfCanvas::new(REPORT_TITLE, geometry.width, geometry.height)?;

    let mut pipeline = ReportPipeline::new(settings, transport, chat, Rc::new(SystemClock))
        .with_geometry(geometry);

    let summary = pipeline.run(canvas)?;
    tracing::info!(
        pages = summary.pages,
        charts = summary.charts,
        sections = summary.sections,
        fallbacks = summary.fallbacks,
        "done, saved to {}",
        summary.document.display()
    );

    Ok(())
}

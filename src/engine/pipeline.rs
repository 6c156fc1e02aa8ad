use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use chrono::{Datelike, Local};
use rand::Rng;

use crate::config::settings::ReportSettings;
use crate::document::canvas::PageCanvas;
use crate::document::layout::{DocumentBuilder, PageGeometry, TitleBlock};
use crate::engine::diagnostics::DiagnosticLog;
use crate::engine::ephemeris_client::EphemerisTransport;
use crate::engine::error::{ReportError, ReportResult};
use crate::engine::interpretation::InterpretationGenerator;
use crate::engine::llm_client::ChatService;
use crate::engine::pacing::{Clock, Pacer};
use crate::engine::response_normalizer::ResponseNormalizer;
use crate::model::birth_query::BirthQuery;
use crate::model::chart_set::{ChartKind, ChartSet};

pub const REPORT_TITLE: &str = "Vedic Astrology Report";
pub const INTERPRETATIONS_HEADING: &str = "Planetary Interpretations";

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub document: PathBuf,
    pub pages: usize,
    pub charts: usize,
    pub sections: usize,
    pub fallbacks: usize,
}

/// Runs normalize → title → charts → interpretations → finalize, in that
/// order, on the calling thread.
pub struct ReportPipeline<T: EphemerisTransport> {
    settings: ReportSettings,
    normalizer: ResponseNormalizer<T>,
    generator: InterpretationGenerator,
    geometry: PageGeometry,
}

impl<T: EphemerisTransport> ReportPipeline<T> {
    pub fn new(
        settings: ReportSettings,
        transport: T,
        chat: Option<Box<dyn ChatService>>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let normalizer = ResponseNormalizer::new(transport, &settings.ephemeris, clock.clone());
        let pacer = Pacer::new(Duration::from_millis(settings.llm.min_interval_ms), clock);

        Self {
            normalizer,
            generator: InterpretationGenerator::new(chat, pacer),
            geometry: PageGeometry::A4,
            settings,
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Produce the report on `canvas` and write it to the configured path.
    ///
    /// Fails without writing anything on malformed birth data or when no
    /// placement could be retrieved. Every other problem is absorbed.
    pub fn run<C: PageCanvas>(&mut self, canvas: C) -> ReportResult<ReportSummary> {
        let query = BirthQuery::from_settings(&self.settings.subject)?;
        tracing::info!(
            name = %self.settings.subject.name,
            date = %query.display_date(),
            time = %query.display_time(),
            lat = query.latitude,
            lon = query.longitude,
            "fetching astrology data"
        );

        let (placements, charts) = {
            let mut log = DiagnosticLog::open_or_disabled(self.settings.output.diagnostic_log.as_deref());
            self.normalizer.normalize(&query, &mut log)
        };

        if placements.is_empty() {
            return Err(ReportError::NoPlacements);
        }
        tracing::info!(placements = placements.len(), charts = charts.len(), "building document");

        let mut doc = DocumentBuilder::new(canvas, self.geometry);
        doc.draw_title_block(&self.title_block(&query));

        let charts_drawn = draw_charts(&mut doc, &charts);

        doc.page_break();
        doc.draw_heading(INTERPRETATIONS_HEADING);

        if !self.generator.is_configured() {
            tracing::warn!("no language-model key configured, interpretations will be placeholders");
        }

        let mut fallbacks = 0;
        for (i, placement) in placements.iter().enumerate() {
            tracing::info!(body = %placement.body, "interpreting {}/{}", i + 1, placements.len());
            let insight = self.generator.interpret(placement);
            if insight.fallback {
                fallbacks += 1;
            }
            doc.append_section(&insight.placement.header(), &insight.text);
        }

        let document = self.settings.output.document_path.clone();
        let pages = doc.finish(&document)?;

        Ok(ReportSummary {
            document,
            pages,
            charts: charts_drawn,
            sections: placements.len(),
            fallbacks,
        })
    }

    fn title_block(&self, query: &BirthQuery) -> TitleBlock {
        let today = Local::now().date_naive();
        let reference = report_reference(today.year(), &mut rand::thread_rng());

        TitleBlock {
            title: REPORT_TITLE.to_string(),
            subject: self.settings.subject.name.clone(),
            details: vec![
                ("Date".into(), query.display_date()),
                ("Time".into(), query.display_time()),
                ("Latitude".into(), format!("{:.2}", query.latitude)),
                ("Longitude".into(), format!("{:.2}", query.longitude)),
                ("Report Ref".into(), reference),
                ("Generated".into(), today.format("%-d %b %Y").to_string()),
            ],
        }
    }
}

/// Converts every chart first and opens the chart page only if at least
/// one survived. Charts keep fixed slots so a missing one never moves the
/// other.
fn draw_charts<C: PageCanvas>(doc: &mut DocumentBuilder<C>, charts: &ChartSet) -> usize {
    let prepared: Vec<(usize, ChartKind, C::Vector)> = ChartKind::ALL
        .into_iter()
        .enumerate()
        .filter_map(|(slot, kind)| {
            let markup = charts.get(kind)?;
            match doc.prepare_chart(kind.title(), markup) {
                Ok(vector) => Some((slot, kind, vector)),
                Err(e) => {
                    tracing::warn!("chart skipped: {e}");
                    None
                }
            }
        })
        .collect();

    if prepared.is_empty() {
        return 0;
    }

    doc.page_break();
    let drawn = prepared.len();
    for (slot, kind, vector) in prepared {
        let anchor = doc.chart_anchor(slot);
        doc.place_chart(kind.title(), vector, anchor);
    }
    drawn
}

/// `AST-2026-042`
fn report_reference(year: i32, rng: &mut impl Rng) -> String {
    format!("AST-{}-{:03}", year, rng.gen_range(0..1000))
}

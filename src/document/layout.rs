use std::path::Path;

use crate::document::canvas::{PageCanvas, TextStyle};
use crate::engine::error::{ReportError, ReportResult};
use crate::model::chart_set::looks_like_svg;

/// Average glyph advance, in em, used for wrapping. Wide
/// enough for Helvetica that wrapped lines stay inside the right margin.
const WRAP_GLYPH_EM: f32 = 0.6;
/// Average glyph advance used to centre headings.
const CENTER_GLYPH_EM: f32 = 0.5;

/// Page size and spacing, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    /// Distance from the top edge where a fresh page's cursor starts.
    pub top_margin: f32,
    /// A text line never starts below this.
    pub min_y: f32,
    /// A section header needs at least this much height left, or it moves
    /// to the next page with its text.
    pub section_min_y: f32,
    pub line_height: f32,
    pub header_gap: f32,
    pub section_gap: f32,
    pub chart_scale: f32,
    /// Vertical distance from a chart's label to its drawing origin.
    pub chart_drop: f32,
    /// Distance between two chart slots on the chart page.
    pub chart_pitch: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
        margin_left: 50.0,
        top_margin: 60.0,
        min_y: 60.0,
        section_min_y: 150.0,
        line_height: 14.0,
        header_gap: 20.0,
        section_gap: 20.0,
        chart_scale: 0.6,
        chart_drop: 350.0,
        chart_pitch: 370.0,
    };

    pub fn page_top(&self) -> f32 {
        self.height - self.top_margin
    }

    /// Characters per body line.
    pub fn wrap_width(&self, style: TextStyle) -> usize {
        let usable = self.width - 2.0 * self.margin_left;
        ((usable / (style.size * WRAP_GLYPH_EM)).floor() as usize).max(1)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Title page content.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    pub title: String,
    pub subject: String,
    pub details: Vec<(String, String)>,
}

/// Owns the page state of one document.
///
/// `cursor_y` only moves down on the current page; `page_break` is the only
/// thing that moves it back to the top.
pub struct DocumentBuilder<C: PageCanvas> {
    canvas: C,
    geometry: PageGeometry,
    cursor_y: f32,
    pages: usize,
}

impl<C: PageCanvas> DocumentBuilder<C> {
    pub fn new(canvas: C, geometry: PageGeometry) -> Self {
        Self {
            canvas,
            cursor_y: geometry.page_top(),
            geometry,
            pages: 1,
        }
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn page_break(&mut self) {
        self.canvas.start_page();
        self.pages += 1;
        self.cursor_y = self.geometry.page_top();
    }

    pub fn draw_title_block(&mut self, block: &TitleBlock) {
        let h = self.geometry.height;
        self.draw_centered(&block.title, h - 100.0, TextStyle::TITLE);
        self.draw_centered(&format!("For: {}", block.subject), h - 130.0, TextStyle::SUBTITLE);

        self.draw_at("Birth Details:", 100.0, h - 200.0, TextStyle::LABEL);
        let mut y = h - 230.0;
        for (label, value) in &block.details {
            self.draw_at(&format!("{label}: {value}"), 100.0, y, TextStyle::DETAIL);
            y -= 20.0;
        }
    }

    /// Heading centred at the cursor.
    pub fn draw_heading(&mut self, text: &str) {
        let y = self.cursor_y;
        self.draw_centered(text, y, TextStyle::HEADING);
        self.advance(2.0 * TextStyle::HEADING.size);
    }

    /// Anchor for the `slot`-th chart on a chart page.
    pub fn chart_anchor(&self, slot: usize) -> f32 {
        self.geometry.height - 50.0 - slot as f32 * self.geometry.chart_pitch
    }

    /// Convert chart markup ahead of layout. Nothing is drawn, so a chart
    /// that fails here leaves the document untouched.
    pub fn prepare_chart(&self, label: &str, markup: &str) -> ReportResult<C::Vector> {
        let render_err = |reason: String| ReportError::Render {
            chart: label.to_string(),
            reason,
        };

        if !looks_like_svg(markup) {
            return Err(render_err("markup has no <svg> root".into()));
        }
        self.canvas.prepare_vector(markup).map_err(render_err)
    }

    /// Draw a prepared chart with its label at `anchor_y`.
    pub fn place_chart(&mut self, label: &str, vector: C::Vector, anchor_y: f32) {
        let origin_y = anchor_y - self.geometry.chart_drop;
        self.canvas
            .draw_vector(vector, self.geometry.margin_left, origin_y, self.geometry.chart_scale);
        self.draw_at(label, 100.0, anchor_y, TextStyle::CHART_LABEL);
    }

    /// Header line followed by wrapped body text, breaking pages as needed.
    pub fn append_section(&mut self, header: &str, body: &str) {
        if self.cursor_y < self.geometry.section_min_y {
            self.page_break();
        }

        let x = self.geometry.margin_left;
        let y = self.cursor_y;
        self.draw_at(header, x, y, TextStyle::SECTION_HEADER);
        self.advance(self.geometry.header_gap);

        for line in wrap_text(body, self.geometry.wrap_width(TextStyle::BODY)) {
            if self.cursor_y < self.geometry.min_y {
                self.page_break();
            }
            let y = self.cursor_y;
            if !line.is_empty() {
                self.draw_at(&line, x, y, TextStyle::BODY);
            }
            self.advance(self.geometry.line_height);
        }

        self.advance(self.geometry.section_gap);
    }

    /// Write the document to `path`. Returns the page count.
    pub fn finish(self, path: &Path) -> ReportResult<usize> {
        let pages = self.pages;
        self.canvas.save(path)?;
        Ok(pages)
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    fn draw_at(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.canvas.draw_text(text, x, y, style);
        self.cursor_y = self.cursor_y.min(y);
    }

    fn draw_centered(&mut self, text: &str, y: f32, style: TextStyle) {
        let approx_width = text.chars().count() as f32 * style.size * CENTER_GLYPH_EM;
        let x = ((self.geometry.width - approx_width) / 2.0).max(self.geometry.margin_left);
        self.draw_at(text, x, y, style);
    }

    fn advance(&mut self, by: f32) {
        self.cursor_y -= by;
    }
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Newlines start a new line; words longer than `width` are split so no
/// text is ever dropped.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.trim().lines() {
        let mut line = String::new();
        let mut line_len = 0usize;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                let piece_len = piece.len();
                let needed = if line_len == 0 { piece_len } else { line_len + 1 + piece_len };
                if needed > width {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.extend(piece);
                line_len += piece_len;
            }
        }

        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::canvas::{DrawOp, RecordingCanvas};
    use proptest::prelude::*;

    const SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>";

    fn small_page() -> PageGeometry {
        PageGeometry {
            width: 200.0,
            height: 200.0,
            margin_left: 10.0,
            top_margin: 20.0,
            min_y: 20.0,
            section_min_y: 50.0,
            line_height: 10.0,
            header_gap: 15.0,
            section_gap: 5.0,
            ..PageGeometry::A4
        }
    }

    #[test]
    fn a4_wraps_body_text_at_82_characters() {
        assert_eq!(PageGeometry::A4.wrap_width(TextStyle::BODY), 82);
    }

    #[test]
    fn wrap_respects_width_and_paragraphs() {
        let lines = wrap_text("the quick brown fox\njumps", 10);
        assert_eq!(lines, ["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_text("abcdefghijkl xy", 5);
        assert_eq!(lines, ["abcde", "fghij", "kl xy"]);
    }

    #[test]
    fn wrap_of_empty_text_is_empty() {
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn fresh_builder_starts_at_page_top() {
        let builder = DocumentBuilder::new(RecordingCanvas::new(), small_page());
        assert_eq!(builder.page_count(), 1);
        assert_eq!(builder.cursor_y(), 180.0);
    }

    #[test]
    fn long_section_continues_on_following_pages() {
        let geometry = small_page();
        let mut builder = DocumentBuilder::new(RecordingCanvas::new(), geometry);
        // small_page wraps at 30 chars; each word fills a line on its own.
        let width = geometry.wrap_width(TextStyle::BODY);
        assert_eq!(width, 30);
        let words: Vec<String> = (0..40).map(|i| format!("{:0>30}", i)).collect();

        builder.append_section("Sun in Sign 8 (House 1)", &words.join(" "));

        // Page 1: header at 180, lines at 165..=25 (15 lines).
        // Page 2: lines at 180..=20 (17 lines). Page 3: the remaining 8.
        let canvas = builder.canvas();
        assert_eq!(canvas.texts_on(0).len(), 1 + 15);
        assert_eq!(canvas.texts_on(1).len(), 17);
        assert_eq!(canvas.texts_on(2).len(), 8);
        assert_eq!(builder.page_count(), 3);

        let drawn: Vec<&str> = (0..3).flat_map(|p| canvas.texts_on(p)).skip(1).collect();
        assert_eq!(drawn, words.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn no_text_below_threshold_and_no_overlap() {
        let geometry = small_page();
        let mut builder = DocumentBuilder::new(RecordingCanvas::new(), geometry);
        let body = "lorem ipsum dolor sit amet ".repeat(30);
        for i in 0..6 {
            builder.append_section(&format!("Body {i}"), &body);
        }

        let canvas = builder.into_canvas();
        let mut last: Option<(usize, f32)> = None;
        for op in canvas.ops() {
            let DrawOp::Text { page, y, .. } = op else { continue };
            assert!(*y >= geometry.min_y, "text at {y} below threshold");
            if let Some((last_page, last_y)) = last {
                if last_page == *page {
                    assert!(*y < last_y, "overlap on page {page} at {y}");
                } else {
                    assert_eq!(*page, last_page + 1);
                }
            }
            last = Some((*page, *y));
        }
    }

    #[test]
    fn header_moves_to_next_page_when_too_low() {
        let geometry = small_page();
        let mut builder = DocumentBuilder::new(RecordingCanvas::new(), geometry);
        // Leaves the cursor at 180 - 15 - 10*12 - 5 = 40, under section_min_y.
        builder.append_section("First", &vec!["word"; 12].join("\n"));
        assert!(builder.cursor_y() < geometry.section_min_y);

        builder.append_section("Second", "short");
        let canvas = builder.canvas();
        assert_eq!(canvas.texts_on(1), ["Second", "short"]);
    }

    #[test]
    fn explicit_page_break_resets_cursor() {
        let mut builder = DocumentBuilder::new(RecordingCanvas::new(), small_page());
        builder.append_section("Moon", "calm");
        assert!(builder.cursor_y() < 180.0);
        builder.page_break();
        assert_eq!(builder.cursor_y(), 180.0);
        assert_eq!(builder.page_count(), 2);
    }

    #[test]
    fn chart_without_svg_root_is_rejected() {
        let builder = DocumentBuilder::new(RecordingCanvas::new(), PageGeometry::A4);
        let err = builder
            .prepare_chart("Lagna Chart (Birth Chart)", "<html></html>")
            .unwrap_err();
        assert!(matches!(err, ReportError::Render { .. }));
        assert!(builder.prepare_chart("Navamsa Chart (D9)", SVG).is_ok());
        assert!(builder.canvas().ops().is_empty());
    }

    #[test]
    fn conversion_failure_leaves_page_untouched() {
        let builder = DocumentBuilder::new(RecordingCanvas::rejecting_vectors(), PageGeometry::A4);
        let before = builder.cursor_y();
        let err = builder
            .prepare_chart("Lagna Chart (Birth Chart)", SVG)
            .unwrap_err();
        assert!(err.to_string().contains("vector conversion rejected"));
        assert!(builder.canvas().ops().is_empty());
        assert_eq!(builder.cursor_y(), before);
    }

    #[test]
    fn chart_is_scaled_and_anchored() {
        let mut builder = DocumentBuilder::new(RecordingCanvas::new(), PageGeometry::A4);
        let anchor = builder.chart_anchor(1);
        let vector = builder.prepare_chart("Navamsa Chart (D9)", SVG).expect("prepared");
        builder.place_chart("Navamsa Chart (D9)", vector, anchor);

        let ops = builder.canvas().ops();
        let Some(DrawOp::Vector { x, y, scale, .. }) = ops.first().cloned() else {
            panic!("no vector drawn");
        };
        assert_eq!(x, 50.0);
        assert!((y - (841.89 - 420.0 - 350.0)).abs() < 1e-3);
        assert_eq!(scale, 0.6);
        assert_eq!(builder.canvas().texts_on(0), ["Navamsa Chart (D9)"]);
    }

    #[test]
    fn title_block_lists_details() {
        let mut builder = DocumentBuilder::new(RecordingCanvas::new(), PageGeometry::A4);
        builder.draw_title_block(&TitleBlock {
            title: "Vedic Astrology Report".into(),
            subject: "Aditya Choudhary".into(),
            details: vec![("Date".into(), "26 Nov 1998".into()), ("Time".into(), "07:55".into())],
        });

        assert_eq!(
            builder.canvas().texts_on(0),
            [
                "Vedic Astrology Report",
                "For: Aditya Choudhary",
                "Birth Details:",
                "Date: 26 Nov 1998",
                "Time: 07:55",
            ]
        );
        assert_eq!(builder.page_count(), 1);
    }

    proptest! {
        #[test]
        fn wrap_never_exceeds_width_or_loses_text(
            words in prop::collection::vec("[a-zA-Z]{1,40}", 0..60),
            width in 1usize..90,
        ) {
            let text = words.join(" ");
            let lines = wrap_text(&text, width);

            for line in &lines {
                prop_assert!(line.chars().count() <= width);
            }
            let rejoined: String = lines.concat().split_whitespace().collect();
            let original: String = words.concat();
            prop_assert_eq!(rejoined, original);
        }
    }
}

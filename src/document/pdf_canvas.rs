use std::path::Path;

use printpdf::*;

use crate::document::canvas::{PageCanvas, TextStyle};
use crate::engine::error::{ReportError, ReportResult};

const LAYER_NAME: &str = "Content";
/// One SVG user unit per point.
const CHART_DPI: f32 = 72.0;

/// `PageCanvas` backed by a printpdf document using the built-in Helvetica
/// faces. Chart markup goes through printpdf's SVG converter in memory.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    width: f32,
    height: f32,
}

impl PdfCanvas {
    pub fn new(title: &str, width: f32, height: f32) -> ReportResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, to_mm(width), to_mm(height), LAYER_NAME);

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Document(format!("cannot load Helvetica: {e:?}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Document(format!("cannot load Helvetica-Bold: {e:?}")))?;

        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            width,
            height,
        })
    }
}

impl PageCanvas for PdfCanvas {
    type Vector = Svg;

    fn start_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(to_mm(self.width), to_mm(self.height), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        let font = if style.bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(winansi_safe(text), style.size, to_mm(x), to_mm(y), font);
    }

    fn prepare_vector(&self, markup: &str) -> Result<Svg, String> {
        Svg::parse(markup).map_err(|e| format!("{e:?}"))
    }

    fn draw_vector(&mut self, svg: Svg, x: f32, y: f32, scale: f32) {
        let (width, height) = placed_size(&svg, scale);
        tracing::debug!(width, height, "placing chart");
        svg.add_to_layer(&self.layer, chart_transform(x, y, scale));
    }

    fn save(self, path: &Path) -> ReportResult<()> {
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| ReportError::Document(format!("cannot serialize PDF: {e:?}")))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn chart_transform(x: f32, y: f32, scale: f32) -> SvgTransform {
    SvgTransform {
        translate_x: Some(Pt(x)),
        translate_y: Some(Pt(y)),
        scale_x: Some(scale),
        scale_y: Some(scale),
        dpi: Some(CHART_DPI),
        ..Default::default()
    }
}

/// Size in points of `svg` once placed with `scale`.
fn placed_size(svg: &Svg, scale: f32) -> (f32, f32) {
    (
        svg.width.into_pt(CHART_DPI).0 * scale,
        svg.height.into_pt(CHART_DPI).0 * scale,
    )
}

fn to_mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

/// The built-in fonts only cover WinAnsi; fold common typography to ASCII.
fn winansi_safe(text: &str) -> String {
    text.replace('\u{2026}', "...")
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{00A0}' => ' ',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}
